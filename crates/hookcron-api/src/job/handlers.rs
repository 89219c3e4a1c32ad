//! Job route handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::debug;

use super::model::{ApiResponse, CreateJobRequest, JobView, Meta, ReplaceJobRequest};
use super::validation::{validate_create, validate_job_id, validate_replace};
use crate::error::ApiError;
use crate::state::AppState;

type JobResponse = Json<ApiResponse<JobView>>;

/// POST /api/v1/jobs
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<JobResponse, ApiError> {
    let Json(request) = body?;
    let spec = validate_create(request.data)?;

    let job = state.reconciler.create_job(spec).await?;
    Ok(Json(ApiResponse::data(JobView::from(&job))))
}

/// GET /api/v1/jobs?from=&size=
///
/// Unparseable paging values fall back to their defaults; `size` 0 means
/// no limit. Without a limit every job is returned and `from` is only
/// echoed back in `meta`.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<JobView>>>, ApiError> {
    let from = paging_value(&query, "from");
    let size = Some(paging_value(&query, "size")).filter(|s| *s > 0);
    debug!(from, size = ?size, "Listing jobs");

    let offset = if size.is_some() { from } else { 0 };
    let page = state.reconciler.list_jobs(offset, size).await?;
    let views: Vec<JobView> = page.jobs.iter().map(JobView::from).collect();
    let meta = Meta {
        from,
        size: views.len(),
        total: page.total,
    };
    Ok(Json(ApiResponse::page(views, meta)))
}

/// GET /api/v1/jobs/{jobID}
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<JobResponse, ApiError> {
    validate_job_id(&job_id)?;

    let job = state.reconciler.get_job(&job_id).await?;
    Ok(Json(ApiResponse::data(JobView::from(&job))))
}

/// PUT /api/v1/jobs/{jobID}
pub async fn replace_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    body: Result<Json<ReplaceJobRequest>, JsonRejection>,
) -> Result<JobResponse, ApiError> {
    let Json(request) = body?;
    validate_job_id(&job_id)?;
    let update = validate_replace(request.desire)?;

    let job = state.reconciler.replace_job(&job_id, update).await?;
    Ok(Json(ApiResponse::data(JobView::from(&job))))
}

/// DELETE /api/v1/jobs/{jobID}
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_job_id(&job_id)?;

    state.reconciler.delete_job(&job_id).await?;
    Ok(Json(ApiResponse::empty()))
}

/// DELETE /api/v1/jobs
pub async fn delete_all_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.reconciler.delete_all_jobs().await?;
    Ok(Json(ApiResponse::empty()))
}

fn paging_value(query: &HashMap<String, String>, key: &str) -> usize {
    query
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
