//! # hookcron API
//!
//! HTTP transport for the job lifecycle:
//!
//! - `POST   /api/v1/jobs`          - create a job
//! - `GET    /api/v1/jobs`          - list jobs (`from`, `size`)
//! - `DELETE /api/v1/jobs`          - delete every job
//! - `GET    /api/v1/jobs/{jobID}`  - get a job
//! - `PUT    /api/v1/jobs/{jobID}`  - replace a job
//! - `DELETE /api/v1/jobs/{jobID}`  - delete a job
//! - `GET    /healthz`              - liveness
//!
//! Field validation happens here. Everything past it is delegated to
//! [`JobReconciler`](hookcron_core::JobReconciler).

pub mod error;
pub mod job;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiServer, ListenConfig};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod testing;
