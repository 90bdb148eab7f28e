//! Condition info: severity, message, quality and retain flag
//!
//! Severity is binary. Any active threshold yields [`SEVERITY_ACTIVE`], no
//! matter which or how many fired, and returning to normal always yields
//! [`SEVERITY_NORMAL`] with the fixed [`BACK_TO_NORMAL`] message.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::threshold::SubStates;

/// Severity reported while no threshold is violated
pub const SEVERITY_NORMAL: u16 = 0;

/// Severity reported while at least one threshold is violated
pub const SEVERITY_ACTIVE: u16 = 150;

/// Message of the return-to-normal condition
pub const BACK_TO_NORMAL: &str = "Back to normal";

/// Quality of the reported condition. Limit alarms always report `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    Good,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Good => f.write_str("Good"),
        }
    }
}

/// Number rendering used in condition messages.
///
/// Plain decimal between `1e-6` and `1e21`, exponent with an explicit sign
/// outside of it (`1e+21`, `1.5e-7`). Negative zero renders as `0`.
fn display_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !value.is_finite() || (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let rendered = format!("{value:e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => rendered,
    }
}

/// Snapshot handed to the base condition behavior on every emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub severity: u16,
    pub message: String,
    pub quality: Quality,
    pub retain: bool,
}

impl ConditionInfo {
    /// Build the condition info for an evaluation result.
    ///
    /// ```rust
    /// use limitguard_core::{ConditionInfo, SubStates, SubState, ThresholdName};
    ///
    /// let states = SubStates::unset().with(ThresholdName::High, SubState::Active);
    /// let info = ConditionInfo::build(true, &states, 12.0);
    ///
    /// assert_eq!(info.severity, 150);
    /// assert_eq!(
    ///     info.message,
    ///     r#"Condition value is 12 and state is {"highHigh":"unset","high":true,"low":"unset","lowLow":"unset"}"#
    /// );
    /// ```
    pub fn build(active: bool, states: &SubStates, value: f64) -> Self {
        if !active {
            return Self::back_to_normal();
        }

        Self {
            severity: SEVERITY_ACTIVE,
            message: format!(
                "Condition value is {} and state is {}",
                display_value(value),
                states
            ),
            quality: Quality::Good,
            retain: true,
        }
    }

    /// The single return-to-normal encoding
    pub fn back_to_normal() -> Self {
        Self {
            severity: SEVERITY_NORMAL,
            message: BACK_TO_NORMAL.to_string(),
            quality: Quality::Good,
            retain: true,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.severity == SEVERITY_NORMAL
    }
}
