//! API error type and error envelope rendering.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hookcron_core::JobError;
use thiserror::Error;
use tracing::{error, warn};

use crate::job::model::ApiResponse;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 - malformed body, invalid field or rejected expression.
    #[error("{0}")]
    BadRequest(String),

    /// 404 - unknown job or route.
    #[error("{0}")]
    NotFound(String),

    /// 500 - storage or scheduler failure.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => ApiError::NotFound(err.to_string()),
            e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %detail, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %detail, "Request rejected");
        }

        (status, Json(ApiResponse::<()>::failure(status, detail))).into_response()
    }
}
