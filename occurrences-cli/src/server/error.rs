use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::ingest::ParseError;
use crate::services::UploadError;

/// Error returned by handlers; rendered as `{"detail": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

/// Failures while reading the stored file are server errors
impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        log::error!("Failed to load occurrences ({}): {}", err.kind(), err);
        ApiError::internal(err.to_string())
    }
}

/// Anything wrong with an upload is the client's problem
impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        log::warn!("Rejected upload: {}", err);
        ApiError::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
