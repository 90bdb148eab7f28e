//! In-memory namespace and alarm nodes
//!
//! Reference implementations of [`Namespace`] and [`AlarmNode`] that keep all
//! attributes in plain fields. Useful for:
//! - Unit and integration testing
//! - Embedding the engine without a full address space
//! - Replaying recorded input values
//!
//! ## Example
//!
//! ```rust
//! use limitguard_core::memory::MemoryNamespace;
//! use limitguard_core::{
//!     AlarmNode, AlarmType, InstantiateOptions, MemberFlags, Namespace, TypeRegistry,
//! };
//!
//! let registry = vec![AlarmType::new("NonExclusiveLimitAlarmType").with_optionals(MemberFlags::all())];
//! let mut namespace = MemoryNamespace::new(1, registry);
//!
//! let alarm_type = namespace.registry().resolve("NonExclusiveLimitAlarmType")?;
//! let node = namespace.instantiate_limit_alarm(&alarm_type, &InstantiateOptions {
//!     browse_name: "TankLevel".into(),
//!     ..Default::default()
//! })?;
//! assert_eq!(node.browse_name(), "TankLevel");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::{
    errors::{AlarmError, AlarmResult},
    members::{Member, MemberFlags},
    threshold::{SubState, ThresholdConfig, ThresholdName, TwoStateLabels},
    traits::{AlarmNode, AlarmType, InstantiateOptions, Namespace, TypeRegistry},
};

/// First numeric node id handed out by a namespace
const FIRST_NODE_ID: u32 = 1000;

/// Namespace keeping its nodes in memory
#[derive(Debug, Clone)]
pub struct MemoryNamespace<R> {
    index: u16,
    registry: R,
    next_id: u32,
}

impl<R: TypeRegistry> MemoryNamespace<R> {
    pub fn new(index: u16, registry: R) -> Self {
        Self {
            index,
            registry,
            next_id: FIRST_NODE_ID,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }
}

impl<R: TypeRegistry> Namespace for MemoryNamespace<R> {
    type Node = MemoryAlarmNode;

    fn registry(&self) -> &dyn TypeRegistry {
        &self.registry
    }

    fn instantiate_limit_alarm(
        &mut self,
        alarm_type: &AlarmType,
        options: &InstantiateOptions,
    ) -> AlarmResult<MemoryAlarmNode> {
        let node_id = format!("ns={};i={}", self.index, self.next_id);
        self.next_id += 1;

        let members = options.optionals.intersection(alarm_type.optionals);
        let mut limits = ThresholdConfig::new();
        for name in ThresholdName::ALL {
            if members.contains(Member::Limit(name)) {
                limits.set_limit(name, options.limits.limit(name));
            }
        }

        Ok(MemoryAlarmNode {
            node_id,
            browse_name: options.browse_name.clone(),
            type_name: alarm_type.browse_name.clone(),
            members,
            limits,
            states: [false; 4],
            labels: [None; 4],
            active: false,
            input_value: options.input_value,
            read_only: MemberFlags::empty(),
        })
    }
}

/// Alarm node with in-memory attributes
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryAlarmNode {
    node_id: String,
    browse_name: String,
    type_name: String,
    members: MemberFlags,
    limits: ThresholdConfig,
    states: [bool; 4],
    labels: [Option<TwoStateLabels>; 4],
    active: bool,
    input_value: Option<f64>,
    read_only: MemberFlags,
}

impl MemoryAlarmNode {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn members(&self) -> MemberFlags {
        self.members
    }

    /// Labels installed on a sub-state variable
    pub fn labels(&self, name: ThresholdName) -> Option<TwoStateLabels> {
        self.labels[name.index()]
    }

    /// Display text of a sub-state, e.g. `"High active"`
    pub fn state_text(&self, name: ThresholdName) -> Option<&'static str> {
        let active = self.sub_state(name).as_bool()?;
        self.labels(name).map(|labels| labels.for_value(active))
    }

    /// Simulate a new value on the monitored input
    pub fn set_input_value(&mut self, value: Option<f64>) {
        self.input_value = value;
    }

    /// Make writes to `member` fail with [`AlarmError::StoreWrite`]
    pub fn set_read_only(&mut self, member: Member, read_only: bool) {
        if read_only {
            self.read_only.insert(member);
        } else {
            self.read_only.remove(member);
        }
    }

    fn check_writable(&self, member: Member) -> AlarmResult<()> {
        if !self.members.contains(member) {
            return Err(AlarmError::StoreWrite {
                member: member.to_string(),
                reason: format!("{} has no such member", self.node_id),
            });
        }
        if self.read_only.contains(member) {
            return Err(AlarmError::StoreWrite {
                member: member.to_string(),
                reason: "member is read-only".to_string(),
            });
        }
        Ok(())
    }
}

impl AlarmNode for MemoryAlarmNode {
    fn browse_name(&self) -> &str {
        &self.browse_name
    }

    fn has_member(&self, member: Member) -> bool {
        self.members.contains(member)
    }

    fn limit(&self, name: ThresholdName) -> Option<f64> {
        self.limits.limit(name)
    }

    fn write_limit(&mut self, name: ThresholdName, limit: f64) -> AlarmResult<()> {
        self.check_writable(Member::Limit(name))?;
        self.limits.set_limit(name, Some(limit));
        Ok(())
    }

    fn sub_state(&self, name: ThresholdName) -> SubState {
        if self.members.contains(Member::State(name)) {
            SubState::from_bool(self.states[name.index()])
        } else {
            SubState::Unset
        }
    }

    fn write_sub_state(&mut self, name: ThresholdName, active: bool) -> AlarmResult<()> {
        self.check_writable(Member::State(name))?;
        self.states[name.index()] = active;
        Ok(())
    }

    fn install_two_state_labels(
        &mut self,
        name: ThresholdName,
        labels: TwoStateLabels,
    ) -> AlarmResult<()> {
        self.check_writable(Member::State(name))?;
        self.labels[name.index()] = Some(labels);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn write_active_state(&mut self, active: bool) -> AlarmResult<()> {
        self.active = active;
        Ok(())
    }

    fn input_value(&self) -> Option<f64> {
        self.input_value
    }
}
