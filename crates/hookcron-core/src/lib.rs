//! # hookcron Core
//!
//! Binds durable job records to live schedules.
//!
//! - [`HttpDispatchAction`]: the work a schedule runs, one HTTP request per firing
//! - [`JobReconciler`]: create/replace/delete/clear, keeping each record's
//!   live handle in step with the scheduler bridge
//! - [`JobReconciler::recover`]: rebuilds live schedules after a restart
//! - [`MemoryJobStore`]: non-durable [`JobStore`](hookcron_protocols::JobStore)

pub mod dispatch;
pub mod error;
pub mod memory_store;
pub mod reconciler;
pub mod recovery;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{ActionFactory, DispatchConfig, HttpActionFactory, HttpDispatchAction};
pub use error::{JobError, JobResult};
pub use memory_store::MemoryJobStore;
pub use reconciler::{JobPage, JobReconciler, JobUpdate};
pub use recovery::RecoveryReport;
