//! Error types for job lifecycle operations.

use hookcron_protocols::{JobHandle, StoreError};
use hookcron_scheduler::SchedulerError;
use thiserror::Error;

/// Errors surfaced by [`JobReconciler`](crate::JobReconciler) operations.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Unsupported trigger type: {0}")]
    UnsupportedTriggerType(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    /// The job already owns a live schedule. Indicates a broken invariant.
    #[error("Job '{job_id}' already has live schedule {handle}")]
    ScheduleConflict { job_id: String, handle: JobHandle },

    #[error("Storage failure: {0}")]
    StorageFailure(#[source] StoreError),

    /// The outbound HTTP path could not be set up. Failures of individual
    /// firings are logged, never returned.
    #[error("Dispatch failure: {0}")]
    DispatchFailure(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl JobError {
    /// Whether the caller, not the system, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            JobError::InvalidExpression { .. }
                | JobError::UnsupportedTriggerType(_)
                | JobError::NotFound(_)
                | JobError::Validation(_)
        )
    }
}

impl From<SchedulerError> for JobError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidExpression { expression, reason } => {
                JobError::InvalidExpression { expression, reason }
            }
            SchedulerError::UnsupportedTriggerType(t) => JobError::UnsupportedTriggerType(t),
            SchedulerError::Conflict { key, handle } => JobError::ScheduleConflict {
                job_id: key,
                handle,
            },
            other => JobError::Scheduler(other.to_string()),
        }
    }
}

impl From<StoreError> for JobError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => JobError::NotFound(id),
            other => JobError::StorageFailure(other),
        }
    }
}

/// Result type for job lifecycle operations.
pub type JobResult<T> = Result<T, JobError>;
