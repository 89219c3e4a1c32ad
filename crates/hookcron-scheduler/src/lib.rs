//! # hookcron Scheduler
//!
//! The live half of hookcron: parsing trigger expressions into policies and
//! running registered actions when their triggers come due.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SchedulerBridge                         │
//! │                                                              │
//! │  schedule/unschedule/lookup/clear ──► table (handle → entry) │
//! │                                         │                    │
//! │                                         ▼                    │
//! │  dispatch loop ◄──── FireQueue (next fire time, handle)      │
//! │       │                                                      │
//! │       └──► TaskTracker::spawn(action.execute())              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table is the only shared mutable state and is guarded by a single
//! mutex. Trigger computation and action execution happen outside it.

pub mod action;
pub mod bridge;
pub mod error;
pub mod queue;
pub mod trigger;

pub use action::{Action, ActionResult};
pub use bridge::{LiveSchedule, SchedulerBridge};
pub use error::{ActionError, SchedulerError, SchedulerResult};
pub use trigger::{Due, TriggerPolicy, TriggerType};
