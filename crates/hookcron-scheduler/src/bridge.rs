//! SchedulerBridge - the single live scheduler of a hookcron process.
//!
//! The bridge is an arena of live schedules. A [`JobHandle`] is an index into
//! that arena and means nothing once the process exits; startup recovery
//! rebuilds the arena from storage.
//!
//! Firings run on tasks owned by the bridge's [`TaskTracker`]. A recurring
//! schedule is put back on the fire queue only after its current firing
//! finishes, so two firings of the same handle never overlap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hookcron_protocols::JobHandle;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::error::{SchedulerError, SchedulerResult};
use crate::queue::FireQueue;
use crate::trigger::{Due, TriggerPolicy};

/// Snapshot of a live schedule.
#[derive(Debug, Clone)]
pub struct LiveSchedule {
    pub handle: JobHandle,
    /// Key of the owning action.
    pub key: String,
    pub trigger: TriggerPolicy,
    /// Number of firings dispatched so far.
    pub fire_count: u64,
    /// Whether a firing is currently running.
    pub in_flight: bool,
    /// Registered but held until resumed.
    pub paused: bool,
    /// Next fire time, `None` while in flight or when the trigger is spent.
    pub next_fire: Option<DateTime<Utc>>,
}

impl LiveSchedule {
    /// Time until the next firing, if one is queued.
    pub fn next_fire_in(&self) -> Option<Duration> {
        self.next_fire
            .map(|at| (at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }
}

struct ScheduleEntry {
    key: String,
    trigger: TriggerPolicy,
    action: Arc<dyn Action>,
    fire_count: u64,
    in_flight: bool,
    paused: bool,
    next_due: Option<Due>,
}

#[derive(Default)]
struct Table {
    schedules: HashMap<JobHandle, ScheduleEntry>,
    keys: HashMap<String, JobHandle>,
    queue: FireQueue,
}

impl Table {
    fn remove(&mut self, handle: JobHandle) -> Option<ScheduleEntry> {
        let entry = self.schedules.remove(&handle)?;
        if self.keys.get(&entry.key) == Some(&handle) {
            self.keys.remove(&entry.key);
        }
        self.queue.remove(handle);
        Some(entry)
    }
}

/// One firing taken off the queue.
struct Firing {
    handle: JobHandle,
    key: String,
    action: Arc<dyn Action>,
    trigger: TriggerPolicy,
    due: Due,
    fired_at: Instant,
}

/// Issues handles that are unique within a process and, because the upper
/// half encodes the process start second, distinct from earlier processes.
struct HandleAllocator {
    base: u64,
    next: AtomicU64,
}

impl HandleAllocator {
    fn new() -> Self {
        let epoch = (Utc::now().timestamp().max(0) as u64) & 0x7FFF_FFFF;
        Self {
            base: epoch << 32,
            next: AtomicU64::new(1),
        }
    }

    fn allocate(&self) -> JobHandle {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) & 0xFFFF_FFFF;
        JobHandle::new(self.base | seq)
    }
}

struct Inner {
    table: Mutex<Table>,
    wakeup: Notify,
    tracker: TaskTracker,
    cancel: CancellationToken,
    handles: HandleAllocator,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

/// The process-wide live scheduler.
///
/// Cheap to clone; all clones share one arena.
#[derive(Clone)]
pub struct SchedulerBridge {
    inner: Arc<Inner>,
}

impl SchedulerBridge {
    /// Create a stopped bridge. Call [`start`](Self::start) to begin firing.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                table: Mutex::new(Table::default()),
                wakeup: Notify::new(),
                tracker: TaskTracker::new(),
                cancel: CancellationToken::new(),
                handles: HandleAllocator::new(),
                dispatcher: Mutex::new(None),
            }),
        }
    }

    /// Start the dispatch loop. Calling it again is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.inner.cancel.is_cancelled() {
            warn!("Scheduler bridge already stopped, not restarting");
            return;
        }

        let mut dispatcher = self.inner.dispatcher.lock();
        if dispatcher.is_some() {
            debug!("Scheduler bridge already started");
            return;
        }

        let inner = self.inner.clone();
        *dispatcher = Some(tokio::spawn(async move { inner.run().await }));
        info!("Scheduler bridge started");
    }

    /// Whether the dispatch loop is running.
    pub fn is_running(&self) -> bool {
        self.inner.dispatcher.lock().is_some() && !self.inner.cancel.is_cancelled()
    }

    /// Register an action against a trigger and return its fresh handle.
    ///
    /// Never waits for the action to run.
    pub fn schedule(
        &self,
        trigger: TriggerPolicy,
        action: Arc<dyn Action>,
    ) -> SchedulerResult<JobHandle> {
        self.register(trigger, action, false)
    }

    /// Register like [`schedule`](Self::schedule) but hold the first firing
    /// until [`resume`](Self::resume) is called.
    ///
    /// The fire time is still computed at registration, so a schedule that
    /// came due while held fires as soon as it is resumed. Callers use this to
    /// persist the handle before the action can observe its own record.
    pub fn schedule_paused(
        &self,
        trigger: TriggerPolicy,
        action: Arc<dyn Action>,
    ) -> SchedulerResult<JobHandle> {
        self.register(trigger, action, true)
    }

    /// Release a schedule registered with
    /// [`schedule_paused`](Self::schedule_paused). Resuming a running
    /// schedule is a no-op.
    pub fn resume(&self, handle: JobHandle) -> SchedulerResult<()> {
        {
            let mut table = self.inner.table.lock();
            let schedule = table
                .schedules
                .get_mut(&handle)
                .ok_or(SchedulerError::NotFound(handle))?;
            if !schedule.paused {
                return Ok(());
            }
            schedule.paused = false;
            let first = schedule.next_due;
            if let Some(due) = first {
                table.queue.push(handle, due);
            }
        }

        self.inner.wakeup.notify_one();
        Ok(())
    }

    fn register(
        &self,
        trigger: TriggerPolicy,
        action: Arc<dyn Action>,
        paused: bool,
    ) -> SchedulerResult<JobHandle> {
        if self.inner.cancel.is_cancelled() {
            return Err(SchedulerError::Stopped);
        }

        let key = action.key().to_string();
        let first = trigger.first_due();

        let handle = {
            let mut table = self.inner.table.lock();
            if let Some(existing) = table.keys.get(&key) {
                return Err(SchedulerError::Conflict {
                    key,
                    handle: *existing,
                });
            }

            let handle = self.inner.handles.allocate();
            if let Some(due) = first.filter(|_| !paused) {
                table.queue.push(handle, due);
            }
            table.keys.insert(key.clone(), handle);
            table.schedules.insert(
                handle,
                ScheduleEntry {
                    key: key.clone(),
                    trigger: trigger.clone(),
                    action,
                    fire_count: 0,
                    in_flight: false,
                    paused,
                    next_due: first,
                },
            );
            handle
        };

        match first {
            Some(due) => debug!(
                handle = %handle,
                key = %key,
                trigger = %trigger,
                paused,
                next_fire = %due.wall.to_rfc3339(),
                "Schedule registered"
            ),
            None => warn!(
                handle = %handle,
                key = %key,
                trigger = %trigger,
                "Schedule registered but its trigger has no upcoming fire time"
            ),
        }

        if !paused {
            self.inner.wakeup.notify_one();
        }
        Ok(handle)
    }

    /// Snapshot of a live schedule.
    pub fn lookup(&self, handle: JobHandle) -> SchedulerResult<LiveSchedule> {
        let table = self.inner.table.lock();
        table
            .schedules
            .get(&handle)
            .map(|entry| LiveSchedule {
                handle,
                key: entry.key.clone(),
                trigger: entry.trigger.clone(),
                fire_count: entry.fire_count,
                in_flight: entry.in_flight,
                paused: entry.paused,
                next_fire: entry.next_due.map(|d| d.wall),
            })
            .ok_or(SchedulerError::NotFound(handle))
    }

    /// Remove a schedule. A firing already in progress runs to completion
    /// but nothing fires afterwards.
    pub fn unschedule(&self, handle: JobHandle) -> SchedulerResult<()> {
        let removed = self.inner.table.lock().remove(handle);
        match removed {
            Some(entry) => {
                debug!(handle = %handle, key = %entry.key, "Schedule removed");
                self.inner.wakeup.notify_one();
                Ok(())
            }
            None => Err(SchedulerError::NotFound(handle)),
        }
    }

    /// Remove every schedule and return how many were removed.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut table = self.inner.table.lock();
            let removed = table.schedules.len();
            table.schedules.clear();
            table.keys.clear();
            table.queue.clear();
            removed
        };
        self.inner.wakeup.notify_one();
        info!(removed, "Scheduler bridge cleared");
        removed
    }

    /// Number of live schedules.
    pub fn len(&self) -> usize {
        self.inner.table.lock().schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop firing and wait for in-flight firings to finish.
    ///
    /// Stopping is terminal: later `schedule` calls fail with
    /// [`SchedulerError::Stopped`].
    pub async fn stop(&self) {
        self.inner.cancel.cancel();

        let dispatcher = self.inner.dispatcher.lock().take();
        if let Some(dispatcher) = dispatcher {
            if let Err(e) = dispatcher.await {
                warn!("Scheduler dispatch loop ended abnormally: {}", e);
            }
        }

        self.inner.tracker.close();
        let in_flight = self.inner.tracker.len();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight firings to finish");
        }
        self.inner.tracker.wait().await;
        info!("Scheduler bridge stopped");
    }
}

impl Default for SchedulerBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Dispatch loop: sleep until the earliest fire time, fire everything
    /// due, repeat.
    async fn run(self: Arc<Self>) {
        loop {
            let next = self.table.lock().queue.next_fire_time();

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = self.wakeup.notified() => continue,
                _ = sleep_until_next(next) => {}
            }

            self.fire_due(Instant::now());
        }
        debug!("Scheduler dispatch loop exited");
    }

    fn fire_due(self: &Arc<Self>, now: Instant) {
        let mut firings = Vec::new();
        {
            let mut table = self.table.lock();
            while let Some(entry) = table.queue.pop_due(now) {
                let Some(schedule) = table.schedules.get_mut(&entry.handle) else {
                    continue;
                };

                schedule.fire_count += 1;
                schedule.in_flight = true;
                schedule.next_due = None;
                firings.push(Firing {
                    handle: entry.handle,
                    key: schedule.key.clone(),
                    action: schedule.action.clone(),
                    trigger: schedule.trigger.clone(),
                    due: entry.due,
                    fired_at: now,
                });

                if schedule.trigger.is_one_shot() {
                    table.remove(entry.handle);
                }
            }
        }

        for firing in firings {
            self.spawn_firing(firing);
        }
    }

    fn spawn_firing(self: &Arc<Self>, firing: Firing) {
        let inner = self.clone();
        self.tracker.spawn(async move {
            debug!(handle = %firing.handle, key = %firing.key, "Firing");

            match firing.action.execute().await {
                Ok(code) => debug!(
                    handle = %firing.handle,
                    key = %firing.key,
                    code,
                    "Firing completed"
                ),
                Err(e) => warn!(
                    handle = %firing.handle,
                    key = %firing.key,
                    error = %e,
                    "Firing failed"
                ),
            }

            if !firing.trigger.is_one_shot() {
                inner.reschedule(&firing);
            }
        });
    }

    /// Queue the next firing of a recurring schedule, if it is still live.
    fn reschedule(&self, firing: &Firing) {
        let next = firing.trigger.next_due(&firing.due, firing.fired_at);

        let mut table = self.table.lock();
        let Some(schedule) = table.schedules.get_mut(&firing.handle) else {
            return;
        };
        schedule.in_flight = false;
        schedule.next_due = next;

        match next {
            Some(due) => {
                table.queue.push(firing.handle, due);
                drop(table);
                self.wakeup.notify_one();
            }
            None => {
                table.remove(firing.handle);
                drop(table);
                info!(
                    handle = %firing.handle,
                    key = %firing.key,
                    "Trigger has no further fire time, schedule removed"
                );
            }
        }
    }
}

async fn sleep_until_next(next: Option<Instant>) {
    match next {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
