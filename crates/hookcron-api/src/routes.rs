//! HTTP route definitions.
//!
//! ```text
//! /api/v1/jobs
//!   POST   /api/v1/jobs          - Create job
//!   GET    /api/v1/jobs          - List jobs
//!   DELETE /api/v1/jobs          - Delete all jobs
//!   GET    /api/v1/jobs/{jobID}  - Get job
//!   PUT    /api/v1/jobs/{jobID}  - Replace job
//!   DELETE /api/v1/jobs/{jobID}  - Delete job
//!
//! /healthz
//!   GET    /healthz              - Liveness and live schedule count
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::job::handlers::{
    create_job, delete_all_jobs, delete_job, get_job, list_jobs, replace_job,
};
use crate::state::AppState;

/// Build the router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route(
            "/api/v1/jobs",
            get(list_jobs).post(create_job).delete(delete_all_jobs),
        )
        .route(
            "/api/v1/jobs/{job_id}",
            get(get_job).put(replace_job).delete(delete_job),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "liveSchedules": state.bridge().len(),
        "uptimeSeconds": state.uptime().as_secs(),
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
