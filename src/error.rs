//! API error taxonomy.
//!
//! Every failure a handler can return maps to a stable machine-checkable
//! `error` kind plus a human message. Client faults come back as 4xx;
//! anything unexpected collapses to a generic 5xx with the detail kept in
//! the logs, never in the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account is deactivated. Please contact admin.")]
    AccountDeactivated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("User already exists with this email")]
    DuplicateEmail,
    #[error("You have already submitted an application")]
    DuplicateApplication,
    #[error("Invalid status")]
    InvalidStatus,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable wire kind, independent of the human message.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::DuplicateEmail => "DUPLICATE_EMAIL",
            ApiError::DuplicateApplication => "DUPLICATE_APPLICATION",
            ApiError::InvalidStatus => "INVALID_STATUS",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Upstream(_) => "UPSTREAM_FAILURE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_)
            | ApiError::InvalidCredentials
            | ApiError::AccountDeactivated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateEmail
            | ApiError::DuplicateApplication
            | ApiError::InvalidStatus
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side detail stays in the logs.
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                "Server error".to_string()
            }
            ApiError::Upstream(detail) => {
                tracing::error!(error = %detail, "upstream failure");
                "Upstream service failure".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail => ApiError::DuplicateEmail,
            StorageError::DuplicateApplication => ApiError::DuplicateApplication,
            other => ApiError::Internal(other.to_string()),
        }
    }
}
