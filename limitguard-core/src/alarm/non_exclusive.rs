//! Non-exclusive limit alarm
//!
//! Tracks lowLow, low, high and highHigh independently. Any subset of the
//! configured thresholds can be active at once, and a condition is signaled
//! only when at least one of them flips.
//!
//! ## Construction
//!
//! 1. Resolve the requested type and `NonExclusiveLimitAlarmType`
//! 2. Request the limit and state members of every configured threshold
//! 3. Base-instantiate the node through the namespace
//! 4. Check every state member has its limit, install labels, reset to inactive
//! 5. Clear the active state and evaluate the input's current value once
//!
//! ## Example
//!
//! ```rust
//! use limitguard_core::memory::MemoryNamespace;
//! use limitguard_core::{
//!     AlarmOptions, AlarmType, ConditionEvent, MemberFlags, NonExclusiveLimitAlarm,
//!     ThresholdConfig, ThresholdName,
//! };
//!
//! let registry = vec![
//!     AlarmType::new("NonExclusiveLimitAlarmType").with_optionals(MemberFlags::all()),
//! ];
//! let mut namespace = MemoryNamespace::new(1, registry);
//!
//! let limits = ThresholdConfig::new().with_limit(ThresholdName::High, 10.0);
//! let mut alarm = NonExclusiveLimitAlarm::instantiate(
//!     &mut namespace,
//!     "NonExclusiveLimitAlarmType",
//!     AlarmOptions::new("BoilerTemperature", limits),
//!     Vec::<ConditionEvent>::new(),
//! )?;
//!
//! assert_eq!(alarm.on_value_changed(12.0)?, 1);
//! assert_eq!(alarm.on_value_changed(12.5)?, 0);
//! assert_eq!(alarm.sink().len(), 1);
//! assert_eq!(alarm.sink()[0].info.severity, 150);
//! # Ok::<(), limitguard_core::AlarmError>(())
//! ```

use crate::{
    condition::ConditionInfo,
    errors::{AlarmError, AlarmResult},
    evaluator::evaluate,
    members::{Member, MemberFlags},
    signal,
    threshold::{SubState, SubStates, ThresholdConfig, ThresholdName},
    time::{SystemTime, TimeSource},
    traits::{AlarmNode, ConditionSink, InstantiateOptions, LimitAlarm, Namespace},
};

use super::BaseLimitAlarm;

/// Base type every non-exclusive limit alarm type derives from
pub const NON_EXCLUSIVE_LIMIT_ALARM_TYPE: &str = "NonExclusiveLimitAlarmType";

/// Configuration of a new alarm instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmOptions {
    pub browse_name: String,
    /// Presence of a limit enables the matching sub-state
    pub limits: ThresholdConfig,
    /// Extra optional members to request from the base instantiation
    pub optionals: MemberFlags,
    /// Current value of the monitored input
    pub input_value: Option<f64>,
}

impl AlarmOptions {
    pub fn new(browse_name: impl Into<String>, limits: ThresholdConfig) -> Self {
        Self {
            browse_name: browse_name.into(),
            limits,
            optionals: MemberFlags::empty(),
            input_value: None,
        }
    }

    pub fn with_input_value(mut self, value: f64) -> Self {
        self.input_value = Some(value);
        self
    }

    pub fn with_optionals(mut self, optionals: MemberFlags) -> Self {
        self.optionals = optionals;
        self
    }

    /// Requested optionals plus the members of every configured threshold
    fn requested_members(&self) -> MemberFlags {
        self.limits.enabled().fold(self.optionals, |flags, name| {
            flags.union(MemberFlags::for_threshold(name))
        })
    }
}

/// Evaluation state owned by one alarm instance
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmState {
    /// Last value that was evaluated successfully
    pub last_value: Option<f64>,
    pub sub_states: SubStates,
    pub active: bool,
    /// Condition of the last emission
    pub last_condition: Option<ConditionInfo>,
}

impl AlarmState {
    fn new(sub_states: SubStates) -> Self {
        Self {
            last_value: None,
            sub_states,
            active: false,
            last_condition: None,
        }
    }
}

/// Limit alarm with four independent thresholds
pub struct NonExclusiveLimitAlarm<N, S> {
    base: BaseLimitAlarm<N, S>,
    state: AlarmState,
}

impl<N: AlarmNode, S: ConditionSink> NonExclusiveLimitAlarm<N, S> {
    /// Build an alarm stamped with the system clock
    pub fn instantiate<NS>(
        namespace: &mut NS,
        type_name: &str,
        options: AlarmOptions,
        sink: S,
    ) -> AlarmResult<Self>
    where
        NS: Namespace<Node = N>,
    {
        Self::instantiate_with_clock(namespace, type_name, options, sink, Box::new(SystemTime))
    }

    pub fn instantiate_with_clock<NS>(
        namespace: &mut NS,
        type_name: &str,
        options: AlarmOptions,
        sink: S,
        clock: Box<dyn TimeSource>,
    ) -> AlarmResult<Self>
    where
        NS: Namespace<Node = N>,
    {
        let registry = namespace.registry();
        let alarm_type = registry.resolve(type_name)?;
        registry.resolve(NON_EXCLUSIVE_LIMIT_ALARM_TYPE)?;
        if !registry.is_subtype_of(type_name, NON_EXCLUSIVE_LIMIT_ALARM_TYPE) {
            log_warn!(
                "{} is not a sub-type of {}",
                type_name,
                NON_EXCLUSIVE_LIMIT_ALARM_TYPE
            );
        }

        let request = InstantiateOptions {
            optionals: options.requested_members(),
            browse_name: options.browse_name,
            limits: options.limits,
            input_value: options.input_value,
        };
        let mut node = namespace.instantiate_limit_alarm(&alarm_type, &request)?;

        let sub_states = install_sub_states(&mut node)?;
        node.write_active_state(false)?;

        let mut alarm = Self {
            base: BaseLimitAlarm::new(node, sink, clock),
            state: AlarmState::new(sub_states),
        };
        alarm.update_state()?;
        Ok(alarm)
    }

    pub fn name(&self) -> &str {
        self.base.node().browse_name()
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    /// Limits currently stored on the node
    pub fn limits(&self) -> ThresholdConfig {
        self.base.node().limits()
    }

    pub fn node(&self) -> &N {
        self.base.node()
    }

    pub fn node_mut(&mut self) -> &mut N {
        self.base.node_mut()
    }

    pub fn sink(&self) -> &S {
        self.base.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.base.sink_mut()
    }

    pub fn into_parts(self) -> (N, S) {
        self.base.into_parts()
    }

    /// Entry point for value-changed notifications.
    ///
    /// Returns the number of sub-states that changed. Rejected values leave
    /// the alarm untouched.
    pub fn on_value_changed(&mut self, value: f64) -> AlarmResult<usize> {
        let result = self.set_state_based_on_input_value(value);
        if let Err(AlarmError::PreconditionViolation { value }) = &result {
            log_warn!("{}: rejected value {}", self.name(), value);
        }
        result
    }

    /// Change a configured limit and re-evaluate.
    ///
    /// Re-evaluates against the last evaluated value, or the input's current
    /// value when nothing was evaluated yet.
    pub fn set_limit(&mut self, name: ThresholdName, limit: f64) -> AlarmResult<usize> {
        if !limit.is_finite() {
            return Err(AlarmError::InvalidLimit {
                threshold: name,
                limit,
            });
        }
        if !self.state.sub_states[name].is_set() {
            return Err(AlarmError::ThresholdDisabled { threshold: name });
        }

        self.base.node_mut().write_limit(name, limit)?;

        match self.state.last_value {
            Some(value) => self.set_state_based_on_input_value(value),
            None => self.update_state(),
        }
    }
}

impl<N: AlarmNode, S: ConditionSink> LimitAlarm for NonExclusiveLimitAlarm<N, S> {
    fn input_value(&self) -> Option<f64> {
        self.base.node().input_value()
    }

    fn set_state_based_on_input_value(&mut self, value: f64) -> AlarmResult<usize> {
        let limits = self.limits();
        let eval = evaluate(&limits, &self.state.sub_states, value)?;

        if eval.has_changes() {
            self.signal_new_condition(&eval.states, eval.active, value)?;
        }

        self.state.last_value = Some(value);
        Ok(eval.changed)
    }

    fn calculate_condition_info(&self, states: &SubStates, active: bool, value: f64) -> ConditionInfo {
        ConditionInfo::build(active, states, value)
    }

    fn signal_new_condition(&mut self, states: &SubStates, active: bool, value: f64) -> AlarmResult<()> {
        let info = self.calculate_condition_info(states, active, value);
        let event = match signal::apply(&mut self.base, states, active, value, info) {
            Ok(event) => event,
            Err(err) => {
                self.restore_node();
                return Err(err);
            }
        };

        // commit only once the event went out
        self.state.sub_states = *states;
        self.state.active = active;
        self.state.last_condition = Some(event.info);
        Ok(())
    }
}

impl<N: AlarmNode, S: ConditionSink> NonExclusiveLimitAlarm<N, S> {
    /// Put the committed sub-states and active state back on the node after
    /// a failed signal left some of the new values behind.
    fn restore_node(&mut self) {
        let node = self.base.node_mut();
        for (name, active) in self.state.sub_states.enabled() {
            if node.sub_state(name).as_bool() == Some(active) {
                continue;
            }
            if let Err(err) = node.write_sub_state(name, active) {
                log_warn!("{}: cannot restore {}State: {}", node.browse_name(), name, err);
            }
        }
        if node.is_active() != self.state.active {
            if let Err(err) = node.write_active_state(self.state.active) {
                log_warn!("{}: cannot restore active state: {}", node.browse_name(), err);
            }
        }
    }
}

/// Validate, label and reset every sub-state the node carries
fn install_sub_states<N: AlarmNode>(node: &mut N) -> AlarmResult<SubStates> {
    let mut states = SubStates::unset();

    for name in ThresholdName::ALL {
        if !node.has_member(Member::State(name)) {
            continue;
        }
        if !node.has_member(Member::Limit(name)) {
            return Err(AlarmError::ConsistencyViolation { threshold: name });
        }

        node.install_two_state_labels(name, name.labels())?;
        node.write_sub_state(name, false)?;
        states.set(name, SubState::Inactive);
    }

    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAlarmNode, MemoryNamespace};
    use crate::signal::ConditionEvent;
    use crate::time::FixedTime;
    use crate::traits::AlarmType;

    type TestAlarm = NonExclusiveLimitAlarm<MemoryAlarmNode, Vec<ConditionEvent>>;

    #[derive(Default)]
    struct FlakySink {
        events: Vec<ConditionEvent>,
        refuse: bool,
    }

    impl ConditionSink for FlakySink {
        fn signal(&mut self, event: &ConditionEvent) -> AlarmResult<()> {
            if self.refuse {
                return Err(AlarmError::Delivery {
                    reason: "subscriber unavailable".into(),
                });
            }
            self.events.push(event.clone());
            Ok(())
        }
    }

    fn namespace() -> MemoryNamespace<Vec<AlarmType>> {
        MemoryNamespace::new(
            1,
            vec![AlarmType::new(NON_EXCLUSIVE_LIMIT_ALARM_TYPE).with_optionals(MemberFlags::all())],
        )
    }

    fn build(options: AlarmOptions) -> AlarmResult<TestAlarm> {
        NonExclusiveLimitAlarm::instantiate_with_clock(
            &mut namespace(),
            NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
            options,
            Vec::new(),
            Box::new(FixedTime::new(42)),
        )
    }

    fn low_pair() -> ThresholdConfig {
        ThresholdConfig::new()
            .with_limit(ThresholdName::Low, 0.0)
            .with_limit(ThresholdName::LowLow, -10.0)
    }

    #[test]
    fn installs_labels_and_resets_states() {
        let alarm = build(AlarmOptions::new("Level", low_pair())).unwrap();
        let node = alarm.node();

        assert_eq!(node.labels(ThresholdName::LowLow), Some(ThresholdName::LowLow.labels()));
        assert_eq!(node.labels(ThresholdName::High), None);
        assert_eq!(node.state_text(ThresholdName::Low), Some("Low inactive"));
        assert!(!node.is_active());
        assert_eq!(alarm.state().sub_states[ThresholdName::High], SubState::Unset);
        assert!(alarm.sink().is_empty());
    }

    #[test]
    fn initial_evaluation_uses_input_value() {
        let alarm = build(AlarmOptions::new("Level", low_pair()).with_input_value(-20.0)).unwrap();

        assert_eq!(alarm.sink().len(), 1);
        let event = &alarm.sink()[0];
        assert_eq!(event.timestamp, 42);
        assert_eq!(event.source, "Level");
        assert_eq!(event.states.active_count(), 2);
        assert!(alarm.node().is_active());
        assert_eq!(alarm.node().state_text(ThresholdName::LowLow), Some("LowLow active"));
        assert_eq!(alarm.state().last_value, Some(-20.0));
    }

    #[test]
    fn unusable_input_skips_initial_evaluation() {
        let alarm = build(AlarmOptions::new("Level", low_pair()).with_input_value(f64::NAN)).unwrap();

        assert!(alarm.sink().is_empty());
        assert_eq!(alarm.state().last_value, None);
    }

    #[test]
    fn rejected_value_leaves_state_untouched() {
        let mut alarm = build(AlarmOptions::new("Level", low_pair())).unwrap();
        alarm.on_value_changed(-5.0).unwrap();
        let before = alarm.state().clone();

        let err = alarm.on_value_changed(f64::INFINITY).unwrap_err();
        assert!(matches!(err, AlarmError::PreconditionViolation { .. }));
        assert_eq!(alarm.state(), &before);
        assert_eq!(alarm.sink().len(), 1);
    }

    #[test]
    fn set_limit_reevaluates() {
        let mut alarm = build(AlarmOptions::new("Level", low_pair())).unwrap();
        assert_eq!(alarm.on_value_changed(-5.0).unwrap(), 1);

        // moving low below the value clears it
        assert_eq!(alarm.set_limit(ThresholdName::Low, -6.0).unwrap(), 1);
        assert_eq!(alarm.limits().limit(ThresholdName::Low), Some(-6.0));
        assert!(!alarm.state().active);
        assert_eq!(alarm.sink().last().unwrap().info, ConditionInfo::back_to_normal());
    }

    #[test]
    fn set_limit_on_disabled_threshold() {
        let mut alarm = build(AlarmOptions::new("Level", low_pair())).unwrap();

        assert_eq!(
            alarm.set_limit(ThresholdName::High, 5.0),
            Err(AlarmError::ThresholdDisabled { threshold: ThresholdName::High })
        );
        assert!(matches!(
            alarm.set_limit(ThresholdName::Low, f64::NAN),
            Err(AlarmError::InvalidLimit { threshold: ThresholdName::Low, .. })
        ));
        assert_eq!(alarm.limits().limit(ThresholdName::Low), Some(0.0));
    }

    #[test]
    fn store_failure_propagates_without_commit() {
        let mut alarm = build(AlarmOptions::new("Level", low_pair())).unwrap();
        alarm
            .node_mut()
            .set_read_only(Member::State(ThresholdName::Low), true);

        let err = alarm.on_value_changed(-5.0).unwrap_err();
        assert!(matches!(err, AlarmError::StoreWrite { .. }));
        assert_eq!(alarm.state().sub_states[ThresholdName::Low], SubState::Inactive);
        assert!(alarm.sink().is_empty());

        // the same value goes through once the store accepts writes again
        alarm
            .node_mut()
            .set_read_only(Member::State(ThresholdName::Low), false);
        assert_eq!(alarm.on_value_changed(-5.0).unwrap(), 1);
    }

    #[test]
    fn partial_store_write_is_rolled_back() {
        let limits = ThresholdConfig::new()
            .with_limit(ThresholdName::High, 10.0)
            .with_limit(ThresholdName::HighHigh, 20.0);
        let mut alarm = build(AlarmOptions::new("Level", limits)).unwrap();
        alarm
            .node_mut()
            .set_read_only(Member::State(ThresholdName::HighHigh), true);

        // high is written before highHigh refuses
        assert!(matches!(
            alarm.on_value_changed(25.0),
            Err(AlarmError::StoreWrite { .. })
        ));
        assert_eq!(alarm.node().sub_state(ThresholdName::High), SubState::Inactive);
        assert!(!alarm.node().is_active());

        alarm
            .node_mut()
            .set_read_only(Member::State(ThresholdName::HighHigh), false);
        assert_eq!(alarm.on_value_changed(5.0).unwrap(), 0);
        assert_eq!(alarm.node().sub_state(ThresholdName::High), SubState::Inactive);
        assert_eq!(alarm.node().state_text(ThresholdName::High), Some("High inactive"));
        assert!(!alarm.state().active);
    }

    #[test]
    fn failed_delivery_is_rolled_back() {
        let mut alarm = NonExclusiveLimitAlarm::instantiate_with_clock(
            &mut namespace(),
            NON_EXCLUSIVE_LIMIT_ALARM_TYPE,
            AlarmOptions::new("Level", low_pair()),
            FlakySink::default(),
            Box::new(FixedTime::new(42)),
        )
        .unwrap();
        alarm.sink_mut().refuse = true;

        assert!(matches!(
            alarm.on_value_changed(-20.0),
            Err(AlarmError::Delivery { .. })
        ));
        assert!(!alarm.node().is_active());
        assert_eq!(alarm.node().sub_state(ThresholdName::Low), SubState::Inactive);
        assert_eq!(alarm.node().sub_state(ThresholdName::LowLow), SubState::Inactive);

        alarm.sink_mut().refuse = false;
        assert_eq!(alarm.on_value_changed(-20.0).unwrap(), 2);
        assert!(alarm.node().is_active());
        assert_eq!(alarm.sink().events.len(), 1);
    }

    #[test]
    fn extra_optionals_without_limit_value_stay_quiet() {
        let options = AlarmOptions::new("Level", ThresholdConfig::new())
            .with_optionals(MemberFlags::for_threshold(ThresholdName::High));
        let mut alarm = build(options).unwrap();

        assert_eq!(alarm.state().sub_states[ThresholdName::High], SubState::Inactive);
        assert_eq!(alarm.on_value_changed(1e12).unwrap(), 0);
    }
}
