//! HTTP error mapping
//!
//! Client mistakes are 400 (413 for an oversized body), anything that goes
//! wrong while reading or drawing the exam is 500. Bodies are plain text so the upload form can
//! show them verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Body exceeds the configured upload limit (413)
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Exam could not be read or rendered (500)
    #[error("Failed to generate ECG image: {0}")]
    Pipeline(#[from] crate::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(msg) => {
                warn!("Rejected upload: {}", msg);
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(msg) => {
                warn!("Rejected upload: {}", msg);
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Pipeline(err) => {
                error!("ECG rendering failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
