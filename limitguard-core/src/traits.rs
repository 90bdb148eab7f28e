//! Collaborator traits for limit alarms
//!
//! The engine owns evaluation and signaling policy. Everything around it is
//! injected through these traits:
//!
//! - [`TypeRegistry`] resolves alarm types by browse name
//! - [`Namespace`] performs the base instantiation of an alarm node
//! - [`AlarmNode`] stores limits, sub-states, labels and the active state
//! - [`ConditionSink`] delivers condition events to subscribers
//! - [`LimitAlarm`] is the behavior shared by limit alarm kinds
//!
//! In-memory implementations live in [`crate::memory`].

use thiserror::Error;

use crate::{
    condition::ConditionInfo,
    errors::{AlarmError, AlarmResult},
    members::{Member, MemberFlags},
    signal::ConditionEvent,
    threshold::{SubState, SubStates, ThresholdConfig, ThresholdName, TwoStateLabels},
};

/// Upper bound on sub-type chains walked by [`TypeRegistry::is_subtype_of`]
pub const MAX_TYPE_DEPTH: usize = 32;

/// Alarm type as known to a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmType {
    /// Browse name, e.g. `NonExclusiveLevelAlarmType`
    pub browse_name: String,
    /// Browse name of the parent type
    pub sub_type_of: Option<String>,
    /// Optional members instances of this type can carry
    pub optionals: MemberFlags,
}

impl AlarmType {
    pub fn new(browse_name: impl Into<String>) -> Self {
        Self {
            browse_name: browse_name.into(),
            sub_type_of: None,
            optionals: MemberFlags::empty(),
        }
    }

    pub fn sub_type_of(mut self, parent: impl Into<String>) -> Self {
        self.sub_type_of = Some(parent.into());
        self
    }

    pub fn with_optionals(mut self, optionals: MemberFlags) -> Self {
        self.optionals = optionals;
        self
    }
}

/// Lookup failure of a [`TypeRegistry`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type {0} not found")]
pub struct TypeNotFound(pub String);

impl From<TypeNotFound> for AlarmError {
    fn from(err: TypeNotFound) -> Self {
        AlarmError::TypeResolution { type_name: err.0 }
    }
}

/// Resolves alarm types by browse name
pub trait TypeRegistry {
    /// Look up a type
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound>;

    /// Walk the parent chain of `name` looking for `base`.
    ///
    /// A type counts as a sub-type of itself. Unknown types and chains deeper
    /// than [`MAX_TYPE_DEPTH`] answer `false`.
    fn is_subtype_of(&self, name: &str, base: &str) -> bool {
        let mut current = name.to_string();
        for _ in 0..MAX_TYPE_DEPTH {
            if current == base {
                return true;
            }
            match self.resolve(&current).ok().and_then(|ty| ty.sub_type_of) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

impl TypeRegistry for [AlarmType] {
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound> {
        self.iter()
            .find(|ty| ty.browse_name == name)
            .cloned()
            .ok_or_else(|| TypeNotFound(name.to_string()))
    }
}

impl TypeRegistry for Vec<AlarmType> {
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound> {
        self.as_slice().resolve(name)
    }
}

impl<R: TypeRegistry + ?Sized> TypeRegistry for &R {
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound> {
        (**self).resolve(name)
    }
}

/// One registry can back several namespaces
impl<R: TypeRegistry + ?Sized> TypeRegistry for std::sync::Arc<R> {
    fn resolve(&self, name: &str) -> Result<AlarmType, TypeNotFound> {
        (**self).resolve(name)
    }
}

/// Parameters of a base limit-alarm instantiation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstantiateOptions {
    /// Browse name of the new node
    pub browse_name: String,
    /// Initial limit values
    pub limits: ThresholdConfig,
    /// Optional members to create
    pub optionals: MemberFlags,
    /// Current value of the monitored input, if known
    pub input_value: Option<f64>,
}

/// Owner of alarm nodes and of the type registry used to build them
pub trait Namespace {
    type Node: AlarmNode;

    fn registry(&self) -> &dyn TypeRegistry;

    /// Base instantiation of a limit alarm node.
    ///
    /// Requested optionals the type does not declare are left out of the node.
    fn instantiate_limit_alarm(
        &mut self,
        alarm_type: &AlarmType,
        options: &InstantiateOptions,
    ) -> AlarmResult<Self::Node>;
}

/// Attribute store of one alarm instance
pub trait AlarmNode {
    fn browse_name(&self) -> &str;

    fn has_member(&self, member: Member) -> bool;

    /// Current limit, `None` when the limit member is missing or empty
    fn limit(&self, name: ThresholdName) -> Option<f64>;

    fn write_limit(&mut self, name: ThresholdName, limit: f64) -> AlarmResult<()>;

    /// Stored sub-state, [`SubState::Unset`] when the state member is missing
    fn sub_state(&self, name: ThresholdName) -> SubState;

    fn write_sub_state(&mut self, name: ThresholdName, active: bool) -> AlarmResult<()>;

    /// Equip a sub-state variable with its true/false display labels
    fn install_two_state_labels(
        &mut self,
        name: ThresholdName,
        labels: TwoStateLabels,
    ) -> AlarmResult<()>;

    fn is_active(&self) -> bool;

    fn write_active_state(&mut self, active: bool) -> AlarmResult<()>;

    /// Current value of the monitored input
    fn input_value(&self) -> Option<f64>;

    /// Limits of every threshold whose limit member holds a value
    fn limits(&self) -> ThresholdConfig {
        let mut config = ThresholdConfig::new();
        for name in ThresholdName::ALL {
            config.set_limit(name, self.limit(name));
        }
        config
    }
}

/// Delivery of condition events to subscribers
pub trait ConditionSink {
    fn signal(&mut self, event: &ConditionEvent) -> AlarmResult<()>;
}

/// Collects every event, handy for tests and replay
impl ConditionSink for Vec<ConditionEvent> {
    fn signal(&mut self, event: &ConditionEvent) -> AlarmResult<()> {
        self.push(event.clone());
        Ok(())
    }
}

impl<S: ConditionSink + ?Sized> ConditionSink for &mut S {
    fn signal(&mut self, event: &ConditionEvent) -> AlarmResult<()> {
        (**self).signal(event)
    }
}

impl<S: ConditionSink + ?Sized> ConditionSink for Box<S> {
    fn signal(&mut self, event: &ConditionEvent) -> AlarmResult<()> {
        (**self).signal(event)
    }
}

/// Behavior shared by limit alarm kinds
pub trait LimitAlarm {
    /// Current value of the monitored input
    fn input_value(&self) -> Option<f64>;

    /// Evaluate `value` and signal a new condition when a sub-state changed.
    ///
    /// Returns the number of sub-states that changed.
    fn set_state_based_on_input_value(&mut self, value: f64) -> AlarmResult<usize>;

    fn calculate_condition_info(&self, states: &SubStates, active: bool, value: f64) -> ConditionInfo;

    fn signal_new_condition(&mut self, states: &SubStates, active: bool, value: f64) -> AlarmResult<()>;

    /// Re-evaluate against the input's current value.
    ///
    /// Inputs without a usable value are skipped.
    fn update_state(&mut self) -> AlarmResult<usize> {
        match self.input_value() {
            Some(value) if value.is_finite() => self.set_state_based_on_input_value(value),
            other => {
                log_debug!("skipping state update, input has no usable value ({:?})", other);
                Ok(0)
            }
        }
    }
}
