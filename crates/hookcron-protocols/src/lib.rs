//! # hookcron Protocols
//!
//! Domain types and storage protocol shared by every hookcron crate.
//! Contains only definitions - no scheduling or transport logic.
//!
//! ## Core Items
//!
//! - [`JobDefinition`] - The durable record of one timed HTTP job
//! - [`JobSpec`] - Caller-supplied fields for create/replace
//! - [`JobHandle`] - Process-lifetime identifier of a live schedule
//! - [`JobStore`] - Trait for durable job storage

pub mod error;
pub mod job;
pub mod store;

pub use error::StoreError;
pub use job::{JobDefinition, JobHandle, JobSpec, JobStatus};
pub use store::JobStore;
