//! The unit of work a schedule runs when its trigger fires.

use async_trait::async_trait;

use crate::error::ActionError;

/// Outcome of one firing: a status code reported by the action, or the
/// reason the firing failed.
pub type ActionResult = Result<u16, ActionError>;

/// Work bound to a trigger.
///
/// The bridge calls [`execute`](Action::execute) once per firing on a task it
/// owns, never on the caller of `schedule`.
#[async_trait]
pub trait Action: Send + Sync {
    /// Identifies the owner of the schedule. At most one live schedule may
    /// exist per key.
    fn key(&self) -> &str;

    /// Run the action once.
    async fn execute(&self) -> ActionResult;
}
