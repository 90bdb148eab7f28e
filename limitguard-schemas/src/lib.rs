//! Alarm type definitions and configuration records for LimitGuard
//!
//! ## Overview
//!
//! The core engine resolves alarm types through an injected
//! [`TypeRegistry`](limitguard_core::TypeRegistry). This crate provides the
//! registry used outside of tests, plus the JSON records that configure one
//! alarm instance.
//!
//! ## Type definitions
//!
//! Types are described as JSON documents:
//!
//! ```json
//! {
//!   "browseName": "NonExclusiveLevelAlarmType",
//!   "subTypeOf": "NonExclusiveLimitAlarmType",
//!   "optionals": ["HighLimit", "HighState", "LowLimit", "LowState"]
//! }
//! ```
//!
//! `optionals` lists the members an instance of the type may carry. A state
//! member declared without its limit is legal here; the engine rejects such
//! an instance when it is built.
//!
//! ## Alarm definitions
//!
//! ```json
//! {
//!   "name": "BoilerTemperature",
//!   "type": "NonExclusiveLevelAlarmType",
//!   "highLimit": 90.0,
//!   "highHighLimit": 110.0
//! }
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use limitguard_core::{memory::MemoryNamespace, ConditionEvent};
//! use limitguard_schemas::{AlarmDefinition, AlarmTypeRegistry};
//!
//! let registry = AlarmTypeRegistry::with_defaults()?;
//! let mut namespace = MemoryNamespace::new(2, registry);
//!
//! let definition = AlarmDefinition::from_json_str(
//!     r#"{"name": "BoilerTemperature", "highLimit": 90.0}"#,
//! )?;
//! let mut alarm = definition.instantiate(&mut namespace, Vec::<ConditionEvent>::new())?;
//!
//! alarm.on_value_changed(95.0)?;
//! assert_eq!(alarm.sink().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod definition;
pub mod registry;
pub mod types;

pub use definition::{AlarmDefinition, DEFAULT_ALARM_TYPE};
pub use registry::AlarmTypeRegistry;
pub use types::TypeDefinition;

/// Schema-related errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse definition: {0}")]
    ParseError(String),

    #[error("Type not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to read definition: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::ParseError(err.to_string())
    }
}
