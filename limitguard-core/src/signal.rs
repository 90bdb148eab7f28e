//! Condition signaling
//!
//! Runs only after an evaluation reported changed sub-states:
//!
//! ```text
//! changed states ──▶ node sub-state attributes     (one write per set threshold)
//!               └──▶ ConditionInfo ──▶ base alarm ──▶ active state, timestamp
//!                                                  └──▶ ConditionSink
//! ```
//!
//! Nothing here retries. A failing store write or delivery is returned to
//! the caller as produced by the collaborator.

use serde::Serialize;

use crate::{
    alarm::BaseLimitAlarm,
    condition::ConditionInfo,
    errors::AlarmResult,
    threshold::SubStates,
    time::Timestamp,
    traits::{AlarmNode, ConditionSink},
};

/// Event delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionEvent {
    /// Browse name of the alarm
    pub source: String,
    pub timestamp: Timestamp,
    pub states: SubStates,
    pub active: bool,
    pub value: f64,
    pub info: ConditionInfo,
}

/// Write every set sub-state into the node store
pub fn write_sub_states<N: AlarmNode + ?Sized>(node: &mut N, states: &SubStates) -> AlarmResult<()> {
    for (name, active) in states.enabled() {
        node.write_sub_state(name, active)?;
    }
    Ok(())
}

/// Persist changed sub-states and forward the condition to the base alarm
pub fn apply<N, S>(
    base: &mut BaseLimitAlarm<N, S>,
    states: &SubStates,
    active: bool,
    value: f64,
    info: ConditionInfo,
) -> AlarmResult<ConditionEvent>
where
    N: AlarmNode,
    S: ConditionSink,
{
    write_sub_states(base.node_mut(), states)?;
    base.signal_new_condition(states, active, value, info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AlarmError;
    use crate::memory::{MemoryAlarmNode, MemoryNamespace};
    use crate::members::MemberFlags;
    use crate::threshold::{SubState, ThresholdConfig, ThresholdName};
    use crate::time::FixedTime;
    use crate::traits::{AlarmType, InstantiateOptions, Namespace, TypeRegistry};

    struct RefusingSink;

    impl ConditionSink for RefusingSink {
        fn signal(&mut self, _event: &ConditionEvent) -> AlarmResult<()> {
            Err(AlarmError::Delivery {
                reason: "subscriber gone".into(),
            })
        }
    }

    fn node() -> MemoryAlarmNode {
        let mut ns = MemoryNamespace::new(
            1,
            vec![AlarmType::new("NonExclusiveLimitAlarmType").with_optionals(MemberFlags::all())],
        );
        let ty = ns.registry().resolve("NonExclusiveLimitAlarmType").unwrap();
        let options = InstantiateOptions {
            browse_name: "Flow".into(),
            limits: ThresholdConfig::new().with_limit(ThresholdName::High, 1.0),
            optionals: MemberFlags::for_threshold(ThresholdName::High),
            input_value: None,
        };
        ns.instantiate_limit_alarm(&ty, &options).unwrap()
    }

    fn high_active() -> SubStates {
        SubStates::unset().with(ThresholdName::High, SubState::Active)
    }

    #[test]
    fn apply_writes_states_and_delivers() {
        let mut base = BaseLimitAlarm::new(node(), Vec::new(), Box::new(FixedTime::new(7)));
        let states = high_active();
        let info = ConditionInfo::build(true, &states, 2.0);

        let event = apply(&mut base, &states, true, 2.0, info.clone()).unwrap();

        assert_eq!(event.timestamp, 7);
        assert_eq!(event.info, info);
        assert_eq!(base.node().sub_state(ThresholdName::High), SubState::Active);
        assert!(base.node().is_active());
        assert_eq!(base.sink(), &vec![event]);
    }

    #[test]
    fn delivery_errors_pass_through() {
        let mut base = BaseLimitAlarm::new(node(), RefusingSink, Box::new(FixedTime::new(0)));
        let states = high_active();
        let info = ConditionInfo::build(true, &states, 2.0);

        let err = apply(&mut base, &states, true, 2.0, info).unwrap_err();
        assert_eq!(
            err,
            AlarmError::Delivery {
                reason: "subscriber gone".into()
            }
        );
    }

    #[test]
    fn event_serializes_canonical_states() {
        let states = high_active();
        let event = ConditionEvent {
            source: "Flow".into(),
            timestamp: 1,
            states,
            active: true,
            value: 2.0,
            info: ConditionInfo::build(true, &states, 2.0),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["states"]["high"], true);
        assert_eq!(json["states"]["low"], "unset");
        assert_eq!(json["info"]["severity"], 150);
        assert_eq!(json["info"]["quality"], "Good");
    }
}
