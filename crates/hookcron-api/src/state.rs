//! Application state.

use std::time::{Duration, Instant};

use hookcron_core::JobReconciler;
use hookcron_scheduler::SchedulerBridge;

/// State shared across handlers.
pub struct AppState {
    pub reconciler: JobReconciler,
    start_time: Instant,
}

impl AppState {
    pub fn new(reconciler: JobReconciler) -> Self {
        Self {
            reconciler,
            start_time: Instant::now(),
        }
    }

    pub fn bridge(&self) -> &SchedulerBridge {
        self.reconciler.bridge()
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
