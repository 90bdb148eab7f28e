//! Core evaluation engine for LimitGuard
//!
//! Evaluates a monitored value against up to four independent limits
//! (lowLow, low, high, highHigh) and signals a condition only when a
//! sub-state actually changes.
//!
//! Key properties:
//! - Unconfigured thresholds never flip and never count towards "active"
//! - Severity is binary: 150 while active, 0 with "Back to normal"
//! - Repeating a value never emits twice
//!
//! ```no_run
//! use limitguard_core::{evaluate, ThresholdConfig, ThresholdName};
//!
//! let config = ThresholdConfig::new()
//!     .with_limit(ThresholdName::High, 10.0)
//!     .with_limit(ThresholdName::HighHigh, 20.0);
//!
//! let mut states = config.initial_states();
//! for value in [5.0, 12.0, 25.0] {
//!     match evaluate(&config, &states, value) {
//!         Ok(eval) if eval.has_changes() => states = eval.states, // signal a new condition
//!         Ok(_) => {}, // nothing changed, stay quiet
//!         Err(e) => {}, // reject the reading
//!     }
//! }
//! ```

#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod alarm;
pub mod condition;
pub mod errors;
pub mod evaluator;
pub mod members;
pub mod memory;
pub mod signal;
pub mod threshold;
pub mod time;
pub mod traits;

// Public API
pub use alarm::{AlarmOptions, AlarmState, BaseLimitAlarm, NonExclusiveLimitAlarm, NON_EXCLUSIVE_LIMIT_ALARM_TYPE};
pub use condition::{ConditionInfo, Quality, BACK_TO_NORMAL, SEVERITY_ACTIVE, SEVERITY_NORMAL};
pub use errors::{AlarmError, AlarmResult};
pub use evaluator::{evaluate, Evaluation};
pub use members::{Member, MemberFlags};
pub use signal::ConditionEvent;
pub use threshold::{SubState, SubStates, ThresholdConfig, ThresholdName, TwoStateLabels};
pub use time::{FixedTime, SystemTime, TickingTime, TimeSource, Timestamp};
pub use traits::{
    AlarmNode, AlarmType, ConditionSink, InstantiateOptions, LimitAlarm, Namespace, TypeNotFound,
    TypeRegistry,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
