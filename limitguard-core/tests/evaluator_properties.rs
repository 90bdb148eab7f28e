//! Property tests for threshold evaluation and emission policy

mod common;

use common::*;
use limitguard_core::{
    evaluate, ConditionInfo, SubState, ThresholdConfig, ThresholdName, SEVERITY_ACTIVE,
};
use proptest::prelude::*;

fn limit() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(-1_000.0f64..1_000.0)
}

fn config() -> impl Strategy<Value = ThresholdConfig> {
    (limit(), limit(), limit(), limit()).prop_map(|(low_low, low, high, high_high)| ThresholdConfig {
        low_low_limit: low_low,
        low_limit: low,
        high_limit: high,
        high_high_limit: high_high,
    })
}

fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-2_000.0f64..2_000.0, 1..40)
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(config in config(), value in -2_000.0f64..2_000.0) {
        let prior = config.initial_states();
        let first = evaluate(&config, &prior, value).unwrap();
        let second = evaluate(&config, &prior, value).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn same_value_twice_changes_nothing(config in config(), value in -2_000.0f64..2_000.0) {
        let first = evaluate(&config, &config.initial_states(), value).unwrap();
        let second = evaluate(&config, &first.states, value).unwrap();
        prop_assert_eq!(second.changed, 0);
        prop_assert_eq!(second.states, first.states);
    }

    #[test]
    fn unset_thresholds_stay_unset(config in config(), values in values()) {
        let mut states = config.initial_states();
        for value in values {
            states = evaluate(&config, &states, value).unwrap().states;
            for name in ThresholdName::ALL {
                if !config.is_enabled(name) {
                    prop_assert_eq!(states[name], SubState::Unset);
                }
            }
        }
    }

    #[test]
    fn active_matches_any_violation(config in config(), value in -2_000.0f64..2_000.0) {
        let eval = evaluate(&config, &config.initial_states(), value).unwrap();
        let expected = config
            .enabled()
            .any(|name| config.limit(name).is_some_and(|limit| name.is_violated(value, limit)));
        prop_assert_eq!(eval.active, expected);
        prop_assert_eq!(eval.active, eval.states.any_active());
    }

    #[test]
    fn emissions_have_binary_severity(config in config(), values in values()) {
        let mut alarm = build_alarm(config).unwrap();
        replay(&mut alarm, &values);

        for event in alarm.sink() {
            if event.active {
                prop_assert_eq!(event.info.severity, SEVERITY_ACTIVE);
            } else {
                prop_assert_eq!(&event.info, &ConditionInfo::back_to_normal());
            }
        }
    }

    #[test]
    fn consecutive_emissions_differ(config in config(), values in values()) {
        let mut alarm = build_alarm(config).unwrap();
        replay(&mut alarm, &values);

        for pair in alarm.sink().windows(2) {
            prop_assert_ne!(pair[0].states, pair[1].states);
        }
    }

    #[test]
    fn in_range_value_returns_to_normal(values in values()) {
        let config = ThresholdConfig::new()
            .with_limit(ThresholdName::LowLow, -1_500.0)
            .with_limit(ThresholdName::Low, -500.0)
            .with_limit(ThresholdName::High, 500.0)
            .with_limit(ThresholdName::HighHigh, 1_500.0);
        let mut alarm = build_alarm(config).unwrap();
        replay(&mut alarm, &values);
        let was_active = alarm.state().active;

        let last = replay(&mut alarm, &[0.0]).pop().flatten();
        prop_assert!(!alarm.state().active);
        prop_assert_eq!(last.is_some(), was_active);
    }
}
