//! Wire model for `/api/v1/jobs`.
//!
//! Requests wrap their fields in `data` (create) or `desire` (replace).
//! Every response is an [`ApiResponse`] envelope whose absent members are
//! omitted.

use axum::http::StatusCode;
use hookcron_protocols::{JobDefinition, JobSpec};
use serde::{Deserialize, Serialize};

/// Timestamp format of `creationTime` / `updateTime` (UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Job fields shared by create and replace requests.
///
/// Missing members deserialize as empty strings and are then rejected by
/// validation, so a missing field and an empty one produce the same error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobFields {
    pub name: String,
    pub trigger_type: String,
    pub expression: String,
    pub http_method: String,
    pub http_target_url: String,
    pub http_request_body: String,
    pub json_web_token: String,
}

impl From<JobFields> for JobSpec {
    fn from(fields: JobFields) -> Self {
        JobSpec::new(
            fields.name,
            fields.trigger_type,
            fields.expression,
            fields.http_method,
            fields.http_target_url,
        )
        .with_body(fields.http_request_body)
        .with_token(fields.json_web_token)
    }
}

/// Body of `POST /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub data: JobFields,
}

/// Desired state carried by `PUT /api/v1/jobs/{jobID}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DesiredJob {
    /// 1 (enable) or 2 (disable).
    #[serde(default)]
    pub status: i64,

    #[serde(flatten)]
    pub fields: JobFields,
}

/// Body of `PUT /api/v1/jobs/{jobID}`.
#[derive(Debug, Deserialize)]
pub struct ReplaceJobRequest {
    pub desire: DesiredJob,
}

/// Paging metadata of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub from: usize,
    /// Number of jobs in this page.
    pub size: usize,
    /// Number of jobs overall.
    pub total: usize,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub status: u16,
    pub detail: String,
}

/// Response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            errors: Vec::new(),
        }
    }

    pub fn page(data: T, meta: Meta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            errors: Vec::new(),
        }
    }

    /// An envelope with no members, `{}`.
    pub fn empty() -> Self {
        Self {
            data: None,
            meta: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: None,
            errors: vec![ErrorObject {
                status: status.as_u16(),
                detail: detail.into(),
            }],
        }
    }
}

/// Caller-facing view of a job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_key: Option<u64>,
    pub status: u8,
    pub name: String,
    pub trigger_type: String,
    pub expression: String,
    pub http_method: String,
    pub http_target_url: String,
    pub http_request_body: String,
    pub json_web_token: String,
    pub creation_time: String,
    pub update_time: String,
}

impl From<&JobDefinition> for JobView {
    fn from(job: &JobDefinition) -> Self {
        Self {
            job_id: job.id.clone(),
            job_key: job.live_handle.map(|h| h.get()),
            status: job.status.code(),
            name: job.name.clone(),
            trigger_type: job.trigger_type.clone(),
            expression: job.expression.clone(),
            http_method: job.http_method.clone(),
            http_target_url: job.http_target_url.clone(),
            http_request_body: job.http_request_body.clone(),
            json_web_token: job.json_web_token.clone(),
            creation_time: job.creation_time.format(TIME_FORMAT).to_string(),
            update_time: job.update_time.format(TIME_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
