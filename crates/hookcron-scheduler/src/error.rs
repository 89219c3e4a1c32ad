//! Error types for the scheduler.

use hookcron_protocols::JobHandle;
use thiserror::Error;

/// Errors raised by the trigger factory and the scheduler bridge.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Expression does not match the grammar of its trigger type.
    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// Trigger type is not one of cron, interval, once.
    #[error("Unsupported trigger type: {0}")]
    UnsupportedTriggerType(String),

    /// No live schedule with this handle.
    #[error("Schedule not found: {0}")]
    NotFound(JobHandle),

    /// The key already owns a live schedule.
    #[error("Key '{key}' already has live schedule {handle}")]
    Conflict { key: String, handle: JobHandle },

    /// The bridge has been stopped.
    #[error("Scheduler is stopped")]
    Stopped,
}

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Failure reported by one firing of an action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A precondition of the firing (such as a status write) failed.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The action target could not be used.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// The outbound call failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),
}
