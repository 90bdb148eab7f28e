//! Sub-state evaluation for non-exclusive limit alarms
//!
//! ## Overview
//!
//! The evaluator is a pure function of `(config, prior states, value)`. It
//! never touches the alarm instance, which keeps it trivially testable and
//! makes repeated calls with the same inputs produce the same output.
//!
//! ## Rules
//!
//! For every configured threshold (prior sub-state not unset):
//!
//! ```text
//! highHigh, high : active when value > limit
//! low, lowLow    : active when value < limit
//! ```
//!
//! - `active` is the OR of all computed sub-states
//! - `changed` counts sub-states whose value flipped
//! - unset thresholds are skipped entirely
//!
//! Callers emit a condition only when `changed > 0`. Feeding the returned
//! states back in with the same value always yields `changed == 0`, which is
//! what collapses repeated notifications into a single emission.
//!
//! ## Example
//!
//! ```rust
//! use limitguard_core::{evaluate, ThresholdConfig, ThresholdName, SubState};
//!
//! let config = ThresholdConfig::new().with_limit(ThresholdName::High, 10.0);
//! let prior = config.initial_states();
//!
//! let eval = evaluate(&config, &prior, 12.0)?;
//! assert!(eval.active);
//! assert_eq!(eval.changed, 1);
//! assert_eq!(eval.states[ThresholdName::High], SubState::Active);
//!
//! let again = evaluate(&config, &eval.states, 12.0)?;
//! assert_eq!(again.changed, 0);
//! # Ok::<(), limitguard_core::AlarmError>(())
//! ```

use crate::{
    errors::{AlarmError, AlarmResult},
    threshold::{SubState, SubStates, ThresholdConfig},
};

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Sub-states after applying the value
    pub states: SubStates,
    /// At least one configured threshold is violated
    pub active: bool,
    /// Number of sub-states that flipped
    pub changed: usize,
}

impl Evaluation {
    /// True when the caller has to signal a new condition
    pub fn has_changes(&self) -> bool {
        self.changed > 0
    }
}

/// Evaluate `value` against the configured thresholds.
///
/// Fails with [`AlarmError::PreconditionViolation`] for NaN or infinite
/// values. A slot that is set in `prior` but has no limit in `config` is left
/// as is and does not contribute to `active`.
pub fn evaluate(config: &ThresholdConfig, prior: &SubStates, value: f64) -> AlarmResult<Evaluation> {
    if !value.is_finite() {
        return Err(AlarmError::PreconditionViolation { value });
    }

    let mut states = *prior;
    let mut active = false;
    let mut changed = 0;

    for (name, was_active) in prior.enabled() {
        let Some(limit) = config.limit(name) else {
            continue;
        };

        let is_active = name.is_violated(value, limit);
        active |= is_active;

        if is_active != was_active {
            states.set(name, SubState::from_bool(is_active));
            changed += 1;
        }
    }

    Ok(Evaluation {
        states,
        active,
        changed,
    })
}
