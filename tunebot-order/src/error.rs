//! HTTP error responses for tunebot-order

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// tunebot-common error, mapped by variant
    #[error(transparent)]
    Common(#[from] tunebot_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use tunebot_common::Error;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(err) => match &err {
                Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
                Error::InvalidFormat(_) | Error::InvalidSize(_) | Error::RefreshUnsupported => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
                }
                Error::RefreshedNotPersisted(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REFRESHED_NOT_PERSISTED",
                    err.to_string(),
                ),
                Error::CorruptCredential(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRUPT_CREDENTIAL",
                    err.to_string(),
                ),
                Error::Upstream(_) | Error::RefreshFailed(_) | Error::AllQualitiesExhausted { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", err.to_string())
                }
                Error::Io(_) | Error::Json(_) | Error::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
