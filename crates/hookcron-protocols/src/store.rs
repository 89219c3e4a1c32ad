//! Durable job storage protocol.
//!
//! Every method is a single independent statement against the backing
//! store; callers must not assume cross-call atomicity.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::{JobDefinition, JobHandle};

/// Trait for durable job storage backends.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new record.
    async fn insert(&self, job: &JobDefinition) -> Result<(), StoreError>;

    /// Overwrite every mutable field of an existing record.
    ///
    /// Returns [`StoreError::NotFound`] if no record has this ID.
    async fn update(&self, job: &JobDefinition) -> Result<(), StoreError>;

    /// Delete a record. Returns [`StoreError::NotFound`] if absent.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Load a record by ID.
    async fn get(&self, id: &str) -> Result<Option<JobDefinition>, StoreError>;

    /// List records in insertion order, skipping `from` and returning at
    /// most `size` (`None` for no limit).
    async fn list(&self, from: usize, size: Option<usize>) -> Result<Vec<JobDefinition>, StoreError>;

    /// Count all records.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Remove every record.
    async fn truncate(&self) -> Result<(), StoreError>;

    /// Mark a record done and clear its live handle in one statement.
    async fn mark_done(&self, id: &str) -> Result<(), StoreError>;

    /// Overwrite only the live handle of a record.
    async fn set_live_handle(&self, id: &str, handle: Option<JobHandle>) -> Result<(), StoreError>;

    /// List every record.
    async fn list_all(&self) -> Result<Vec<JobDefinition>, StoreError> {
        self.list(0, None).await
    }
}

/// Mock [`JobStore`] for the test suites of dependent crates.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;

    mockall::mock! {
        pub Store {}

        #[async_trait]
        impl JobStore for Store {
            async fn insert(&self, job: &JobDefinition) -> Result<(), StoreError>;
            async fn update(&self, job: &JobDefinition) -> Result<(), StoreError>;
            async fn delete(&self, id: &str) -> Result<(), StoreError>;
            async fn get(&self, id: &str) -> Result<Option<JobDefinition>, StoreError>;
            async fn list(&self, from: usize, size: Option<usize>) -> Result<Vec<JobDefinition>, StoreError>;
            async fn count(&self) -> Result<usize, StoreError>;
            async fn truncate(&self) -> Result<(), StoreError>;
            async fn mark_done(&self, id: &str) -> Result<(), StoreError>;
            async fn set_live_handle(&self, id: &str, handle: Option<JobHandle>) -> Result<(), StoreError>;
        }
    }
}
