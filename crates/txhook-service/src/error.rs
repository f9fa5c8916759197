//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use txhook_core::IdError;
use txhook_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeded the configured limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Unknown transaction.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store could not be reached. Not retried; callers retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::NotFound(_) => "not_found",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let error = match self {
            Self::InvalidRequest(msg) | Self::PayloadTooLarge(msg) | Self::NotFound(msg) => msg,
            Self::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable");
                "The transaction store is temporarily unavailable".to_string()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                "An internal error occurred".to_string()
            }
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}

impl ApiError {
    /// Map an extractor rejection, keeping 413 for over-limit bodies.
    pub(crate) fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(message)
        } else {
            Self::InvalidRequest(message)
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(msg) => Self::StoreUnavailable(msg),
            StoreError::Serialization(msg) => Self::Internal(msg),
            err @ StoreError::InvalidTransition { .. } => Self::Internal(err.to_string()),
        }
    }
}
