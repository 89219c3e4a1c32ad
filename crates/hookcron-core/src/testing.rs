//! Test doubles shared by the unit test suites.

use std::sync::Arc;

use async_trait::async_trait;
use hookcron_protocols::{JobDefinition, JobHandle, JobStore, StoreError};
use hookcron_scheduler::{Action, ActionResult, SchedulerBridge};
use parking_lot::Mutex;

use crate::dispatch::ActionFactory;
use crate::memory_store::MemoryJobStore;

pub use hookcron_protocols::store::mock::MockStore;

/// Action that only counts its firings.
pub struct CountingAction {
    key: String,
    fired: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Action for CountingAction {
    fn key(&self) -> &str {
        &self.key
    }

    async fn execute(&self) -> ActionResult {
        self.fired.lock().push(self.key.clone());
        Ok(200)
    }
}

/// Factory recording the job ID of every firing of the actions it built.
#[derive(Default)]
pub struct CountingFactory {
    pub fired: Arc<Mutex<Vec<String>>>,
}

impl CountingFactory {
    pub fn fired_for(&self, job_id: &str) -> usize {
        self.fired.lock().iter().filter(|id| id.as_str() == job_id).count()
    }
}

impl ActionFactory for CountingFactory {
    fn build(&self, job: &JobDefinition) -> Arc<dyn Action> {
        Arc::new(CountingAction {
            key: job.id.clone(),
            fired: self.fired.clone(),
        })
    }
}

/// Store that lets a delete-all land in the middle of a write.
///
/// Before an insert the bridge is cleared and the records truncated, so the
/// insert is the only write the clear missed. Before an update or a handle
/// write only the bridge is cleared; the truncate has not run yet.
pub struct ClearingStore {
    pub inner: MemoryJobStore,
    bridge: SchedulerBridge,
}

impl ClearingStore {
    pub fn new(inner: MemoryJobStore, bridge: SchedulerBridge) -> Self {
        Self { inner, bridge }
    }
}

#[async_trait]
impl JobStore for ClearingStore {
    async fn insert(&self, job: &JobDefinition) -> Result<(), StoreError> {
        self.bridge.clear();
        self.inner.truncate().await?;
        self.inner.insert(job).await
    }

    async fn update(&self, job: &JobDefinition) -> Result<(), StoreError> {
        self.bridge.clear();
        self.inner.update(job).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn get(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        self.inner.get(id).await
    }

    async fn list(&self, from: usize, size: Option<usize>) -> Result<Vec<JobDefinition>, StoreError> {
        self.inner.list(from, size).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        self.inner.truncate().await
    }

    async fn mark_done(&self, id: &str) -> Result<(), StoreError> {
        self.inner.mark_done(id).await
    }

    async fn set_live_handle(&self, id: &str, handle: Option<JobHandle>) -> Result<(), StoreError> {
        if handle.is_some() {
            self.bridge.clear();
        }
        self.inner.set_live_handle(id, handle).await
    }
}
