//! Error types for diary-server
//!
//! Every failure surfaces to the request boundary as a structured JSON
//! body. Sequence violations (a step invoked before its precondition
//! state) are deliberately distinct from oracle failures so a client
//! can tell "you skipped a step" apart from "the service is down".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Operation invoked before its precondition state (409)
    #[error("Sequence violation: {0}")]
    SequenceViolation(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// An external model collaborator failed (503)
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// diary-common error
    #[error("Common error: {0}")]
    Common(#[from] diary_common::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Sequence(e) => ApiError::SequenceViolation(e.to_string()),
            ServiceError::Oracle(e) => ApiError::OracleUnavailable(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::SequenceViolation(msg) => (StatusCode::CONFLICT, "SEQUENCE_VIOLATION", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::OracleUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ORACLE_UNAVAILABLE",
                msg,
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
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
