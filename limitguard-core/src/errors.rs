//! Error Types for Limit Alarm Evaluation and Construction
//!
//! ## Error Categories
//!
//! Every failure in the engine is structural or a configuration problem. There
//! is no transient class and nothing is retried internally.
//!
//! ### Evaluation
//! - `PreconditionViolation`: the monitored value is NaN or infinite. The alarm
//!   keeps its last-known state and nothing is emitted.
//! - `InvalidLimit`: a limit change carried NaN or an infinite value. The
//!   stored limit is left as it was.
//! - `ThresholdDisabled`: a limit change was requested for a threshold the
//!   alarm was not configured with.
//!
//! ### Construction
//! - `TypeResolution`: the requested alarm type or the required base type is
//!   not known to the registry. No instance is produced.
//! - `ConsistencyViolation`: an enabled sub-state has no paired limit attribute
//!   after base instantiation. This points at a schema mismatch between the
//!   configuration and the alarm type.
//!
//! ### Collaborators
//! - `StoreWrite`: the node attribute store refused a write.
//! - `Delivery`: the condition sink could not deliver an event.
//!
//! Collaborator errors are returned by the collaborator itself and pass through
//! the engine unchanged.
//!
//! ## Handling Strategy
//!
//! ```rust
//! use limitguard_core::AlarmError;
//!
//! fn describe(err: &AlarmError) -> &'static str {
//!     match err {
//!         AlarmError::PreconditionViolation { .. } => "reading rejected",
//!         AlarmError::TypeResolution { .. } | AlarmError::ConsistencyViolation { .. } => {
//!             "alarm definition does not match the type system"
//!         }
//!         _ => "collaborator failure",
//!     }
//! }
//!
//! let err = AlarmError::PreconditionViolation { value: f64::NAN };
//! assert_eq!(describe(&err), "reading rejected");
//! ```

use thiserror::Error;

use crate::threshold::ThresholdName;

/// Result type for alarm operations
pub type AlarmResult<T> = Result<T, AlarmError>;

/// Errors raised while constructing or evaluating a limit alarm
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlarmError {
    /// Value handed to the evaluator is not a finite number
    #[error("precondition violated: expected a finite value, got {value}")]
    PreconditionViolation {
        /// The rejected value
        value: f64,
    },

    /// Requested alarm type, or the base type it must derive from, is unknown
    #[error("cannot resolve alarm type {type_name}")]
    TypeResolution {
        /// Browse name that failed to resolve
        type_name: String,
    },

    /// An enabled sub-state has no paired limit attribute on the instance
    #[error("sub-state {threshold}State is enabled but the instance has no {threshold}Limit")]
    ConsistencyViolation {
        /// Threshold whose limit attribute is missing
        threshold: ThresholdName,
    },

    /// New limit for a threshold is not a finite number
    #[error("limit for {threshold} must be a finite number, got {limit}")]
    InvalidLimit {
        /// Threshold whose limit was being changed
        threshold: ThresholdName,
        /// The rejected limit
        limit: f64,
    },

    /// Threshold was not configured on this alarm
    #[error("threshold {threshold} is not enabled on this alarm")]
    ThresholdDisabled {
        /// Threshold that was addressed
        threshold: ThresholdName,
    },

    /// Attribute store rejected a write
    #[error("failed to write {member}: {reason}")]
    StoreWrite {
        /// Member that was being written
        member: String,
        /// Store-specific reason
        reason: String,
    },

    /// Condition event could not be delivered
    #[error("condition delivery failed: {reason}")]
    Delivery {
        /// Sink-specific reason
        reason: String,
    },
}

impl AlarmError {
    /// True for failures that prevent an alarm from being constructed
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::TypeResolution { .. } | Self::ConsistencyViolation { .. }
        )
    }
}
