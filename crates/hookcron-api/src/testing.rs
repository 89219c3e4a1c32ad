//! Test doubles shared by the unit test suites.

use std::sync::Arc;

use async_trait::async_trait;
use hookcron_core::{ActionFactory, JobReconciler, MemoryJobStore};
use hookcron_protocols::{JobDefinition, JobStore};
use hookcron_scheduler::{Action, ActionResult, SchedulerBridge};

use crate::state::AppState;

pub use hookcron_protocols::store::mock::MockStore;

pub struct NoopAction {
    key: String,
}

#[async_trait]
impl Action for NoopAction {
    fn key(&self) -> &str {
        &self.key
    }

    async fn execute(&self) -> ActionResult {
        Ok(204)
    }
}

/// Builds actions that never touch the network.
pub struct NoopFactory;

impl ActionFactory for NoopFactory {
    fn build(&self, job: &JobDefinition) -> Arc<dyn Action> {
        Arc::new(NoopAction {
            key: job.id.clone(),
        })
    }
}

pub fn state_with_store(store: Arc<dyn JobStore>) -> Arc<AppState> {
    let reconciler = JobReconciler::new(store, SchedulerBridge::new(), Arc::new(NoopFactory));
    Arc::new(AppState::new(reconciler))
}

pub fn test_state() -> Arc<AppState> {
    state_with_store(Arc::new(MemoryJobStore::new()))
}
