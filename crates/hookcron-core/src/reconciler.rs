//! Lifecycle reconciler - keeps durable job records and live schedules
//! consistent across create, replace, delete and clear.
//!
//! Every operation is a sequence of independent store statements and bridge
//! calls; none of them is transactional across the two. The step order is
//! chosen so that a failing step leaves no durable trace wherever possible.
//!
//! New schedules are registered paused and only released once the record
//! carrying their handle has been written, so an action never observes its
//! own job before that write. If a concurrent clear removes the held
//! schedule in between, the write is undone so no record keeps a handle
//! with no live schedule behind it.

use std::sync::Arc;

use hookcron_protocols::{JobDefinition, JobHandle, JobSpec, JobStatus, JobStore, StoreError};
use hookcron_scheduler::{SchedulerBridge, SchedulerError, TriggerPolicy};
use tracing::{debug, info, warn};

use crate::dispatch::ActionFactory;
use crate::error::{JobError, JobResult};

/// Desired state of an existing job.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub spec: JobSpec,
}

/// One page of a job listing.
#[derive(Debug, Clone)]
pub struct JobPage {
    pub jobs: Vec<JobDefinition>,
    pub from: usize,
    pub size: Option<usize>,
    /// Total number of records, regardless of paging.
    pub total: usize,
}

/// Coordinates a [`JobStore`] with the [`SchedulerBridge`].
#[derive(Clone)]
pub struct JobReconciler {
    pub(crate) store: Arc<dyn JobStore>,
    pub(crate) bridge: SchedulerBridge,
    pub(crate) actions: Arc<dyn ActionFactory>,
}

impl JobReconciler {
    pub fn new(
        store: Arc<dyn JobStore>,
        bridge: SchedulerBridge,
        actions: Arc<dyn ActionFactory>,
    ) -> Self {
        Self {
            store,
            bridge,
            actions,
        }
    }

    pub fn bridge(&self) -> &SchedulerBridge {
        &self.bridge
    }

    /// Create an enabled job and its live schedule.
    pub async fn create_job(&self, spec: JobSpec) -> JobResult<JobDefinition> {
        let mut job = JobDefinition::new(spec, None);

        let trigger = build_trigger(&job)?;
        let handle = self.register(&job, trigger)?;
        job.live_handle = Some(handle);

        if let Err(e) = self.store.insert(&job).await {
            self.release(handle);
            return Err(e.into());
        }
        if let Err(e) = self.bridge.resume(handle) {
            warn!(
                job_id = %job.id,
                handle = %handle,
                error = %e,
                "Schedule cleared before release, undoing insert"
            );
            ignore_missing(self.store.delete(&job.id).await)?;
            return Err(e.into());
        }

        info!(
            job_id = %job.id,
            name = %job.name,
            handle = %handle,
            trigger_type = %job.trigger_type,
            expression = %job.expression,
            "Job created"
        );
        Ok(job)
    }

    pub async fn get_job(&self, id: &str) -> JobResult<JobDefinition> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// List jobs in creation order. `size = None` means no limit.
    pub async fn list_jobs(&self, from: usize, size: Option<usize>) -> JobResult<JobPage> {
        let jobs = self.store.list(from, size).await?;
        let total = self.store.count().await?;
        Ok(JobPage {
            jobs,
            from,
            size,
            total,
        })
    }

    /// Replace every caller-visible field and the status of a job.
    ///
    /// The new trigger is validated before the old schedule is touched, so an
    /// invalid expression leaves the job as it was.
    pub async fn replace_job(&self, id: &str, update: JobUpdate) -> JobResult<JobDefinition> {
        let current = self.get_job(id).await?;

        let mut job = current.clone();
        job.apply_spec(update.spec);
        job.status = update.status;
        job.live_handle = None;

        let trigger = if job.is_enabled() {
            Some(build_trigger(&job)?)
        } else {
            None
        };

        if let Some(old) = current.live_handle {
            self.release(old);
        }

        let handle = match trigger {
            Some(trigger) => Some(self.register(&job, trigger)?),
            None => None,
        };
        job.live_handle = handle;
        job.touch();

        if let Err(e) = self.store.update(&job).await {
            if let Some(handle) = handle {
                self.release(handle);
            }
            return Err(e.into());
        }
        if let Some(handle) = handle {
            if let Err(e) = self.bridge.resume(handle) {
                warn!(
                    job_id = %job.id,
                    handle = %handle,
                    error = %e,
                    "Schedule cleared before release, dropping handle"
                );
                ignore_missing(self.store.set_live_handle(&job.id, None).await)?;
                return Err(e.into());
            }
        }

        info!(
            job_id = %job.id,
            name = %job.name,
            status = %job.status,
            old_handle = ?current.live_handle.map(JobHandle::get),
            new_handle = ?handle.map(JobHandle::get),
            "Job replaced"
        );
        Ok(job)
    }

    pub async fn delete_job(&self, id: &str) -> JobResult<()> {
        let job = self.get_job(id).await?;
        if let Some(handle) = job.live_handle {
            self.release(handle);
        }
        self.store.delete(id).await?;

        info!(job_id = %id, name = %job.name, "Job deleted");
        Ok(())
    }

    /// Remove every live schedule, then every record.
    ///
    /// Not atomic: a crash between the two steps leaves records whose
    /// schedules are gone until the next startup recovery.
    pub async fn delete_all_jobs(&self) -> JobResult<usize> {
        let unscheduled = self.bridge.clear();
        self.store.truncate().await?;

        info!(unscheduled, "All jobs deleted");
        Ok(unscheduled)
    }

    /// Register a held schedule for `job`. Callers resume it once the handle
    /// is persisted.
    pub(crate) fn register(&self, job: &JobDefinition, trigger: TriggerPolicy) -> JobResult<JobHandle> {
        let handle = self
            .bridge
            .schedule_paused(trigger, self.actions.build(job))?;
        debug!(job_id = %job.id, handle = %handle, "Schedule registered");
        Ok(handle)
    }

    /// Unschedule, treating an already-gone handle (a fired one-shot job) as
    /// success.
    pub(crate) fn release(&self, handle: JobHandle) {
        match self.bridge.unschedule(handle) {
            Ok(()) => debug!(handle = %handle, "Schedule released"),
            Err(SchedulerError::NotFound(_)) => {
                debug!(handle = %handle, "Schedule already gone")
            }
            Err(e) => warn!(handle = %handle, error = %e, "Failed to release schedule"),
        }
    }
}

/// Treat a record that is already gone as success.
pub(crate) fn ignore_missing(result: Result<(), StoreError>) -> JobResult<()> {
    match result {
        Err(e) if !e.is_not_found() => Err(e.into()),
        _ => Ok(()),
    }
}

pub(crate) fn build_trigger(job: &JobDefinition) -> JobResult<TriggerPolicy> {
    Ok(TriggerPolicy::parse(&job.trigger_type, &job.expression)?)
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
