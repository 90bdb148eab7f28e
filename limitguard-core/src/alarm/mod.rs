//! Limit alarm instances
//!
//! ## Structure
//!
//! ```text
//! NonExclusiveLimitAlarm ── implements ──▶ LimitAlarm
//!   ├── AlarmState          (sub-states, active, last value, last condition)
//!   └── BaseLimitAlarm      (node, sink, clock)
//!         ├── AlarmNode     (limits, sub-state attributes, labels, active state)
//!         └── ConditionSink (event delivery)
//! ```
//!
//! The non-exclusive alarm adds sub-state handling on top of the base
//! behavior by delegation. Nothing is swapped at runtime.

mod base;
mod non_exclusive;

pub use base::BaseLimitAlarm;
pub use non_exclusive::{AlarmOptions, AlarmState, NonExclusiveLimitAlarm, NON_EXCLUSIVE_LIMIT_ALARM_TYPE};
