//! In-memory job store.

use async_trait::async_trait;
use hookcron_protocols::{JobDefinition, JobHandle, JobStatus, JobStore, StoreError};
use tokio::sync::RwLock;

/// Non-durable [`JobStore`] keeping records in insertion order.
///
/// Used by tests and by the `memory` storage backend.
pub struct MemoryJobStore {
    jobs: RwLock<Vec<JobDefinition>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn position(jobs: &[JobDefinition], id: &str) -> Result<usize, StoreError> {
    jobs.iter()
        .position(|j| j.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.iter().any(|j| j.id == job.id) {
            return Err(StoreError::Database(format!("Duplicate job id: {}", job.id)));
        }
        jobs.push(job.clone());
        Ok(())
    }

    async fn update(&self, job: &JobDefinition) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let idx = position(&jobs, &job.id)?;
        jobs[idx] = job.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let idx = position(&jobs, id)?;
        jobs.remove(idx);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<JobDefinition>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list(&self, from: usize, size: Option<usize>) -> Result<Vec<JobDefinition>, StoreError> {
        let jobs = self.jobs.read().await;
        let page = jobs.iter().skip(from);
        Ok(match size {
            Some(size) => page.take(size).cloned().collect(),
            None => page.cloned().collect(),
        })
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.jobs.read().await.len())
    }

    async fn truncate(&self) -> Result<(), StoreError> {
        self.jobs.write().await.clear();
        Ok(())
    }

    async fn mark_done(&self, id: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let idx = position(&jobs, id)?;
        let job = &mut jobs[idx];
        job.status = JobStatus::Done;
        job.live_handle = None;
        job.touch();
        Ok(())
    }

    async fn set_live_handle(&self, id: &str, handle: Option<JobHandle>) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let idx = position(&jobs, id)?;
        jobs[idx].live_handle = handle;
        Ok(())
    }
}
