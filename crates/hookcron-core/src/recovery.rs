//! Startup recovery - rebuilds live schedules from durable records.
//!
//! Live handles do not survive a restart. Every enabled record gets a fresh
//! schedule and its stored handle is rewritten; records that are not enabled
//! have any leftover handle cleared.

use tracing::{error, info, warn};

use crate::error::JobResult;
use crate::reconciler::{build_trigger, ignore_missing, JobReconciler};

/// Outcome of a recovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Enabled records that received a new live schedule.
    pub restored: usize,
    /// Disabled or done records whose stale handle was cleared.
    pub repaired: usize,
    /// Records left untouched.
    pub skipped: usize,
}

impl JobReconciler {
    /// Re-create the live schedule of every enabled record.
    ///
    /// Must run after the bridge has started. Stops at the first record
    /// whose trigger cannot be rebuilt; records after it are not processed.
    pub async fn recover(&self) -> JobResult<RecoveryReport> {
        let jobs = self.store.list_all().await?;
        let mut report = RecoveryReport::default();

        for job in jobs {
            if !job.is_enabled() {
                if let Some(stale) = job.live_handle {
                    self.store.set_live_handle(&job.id, None).await?;
                    warn!(
                        job_id = %job.id,
                        status = %job.status,
                        stale_handle = %stale,
                        "Cleared stale handle"
                    );
                    report.repaired += 1;
                } else {
                    report.skipped += 1;
                }
                continue;
            }

            let trigger = build_trigger(&job).map_err(|e| {
                error!(
                    job_id = %job.id,
                    name = %job.name,
                    trigger_type = %job.trigger_type,
                    expression = %job.expression,
                    error = %e,
                    "Cannot rebuild trigger, recovery aborted"
                );
                e
            })?;

            let handle = self.register(&job, trigger)?;
            if let Err(e) = self.store.set_live_handle(&job.id, Some(handle)).await {
                self.release(handle);
                return Err(e.into());
            }
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

            info!(
                job_id = %job.id,
                name = %job.name,
                handle = %handle,
                stale_handle = ?job.live_handle.map(|h| h.get()),
                "Job restored"
            );
            report.restored += 1;
        }

        info!(
            restored = report.restored,
            repaired = report.repaired,
            skipped = report.skipped,
            "Startup recovery complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
