//! Error types for saturno-api
//!
//! Every failure leaves the server as the error envelope
//! `{"success": false, "error": "..."}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::envelope::ErrorBody;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Known path, unsupported method (405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Request body the JSON extractor refused (400, 413 or 415)
    #[error("Rejected request body: {message}")]
    Rejection { status: StatusCode, message: String },

    /// Internal server error (500)
    ///
    /// `details` carries the underlying error text and is only populated
    /// when the server runs in the development environment.
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Translate a store failure into a 500, logging the cause
    pub fn store(context: &str, err: saturno_common::Error, expose_details: bool) -> Self {
        error!("{}: {}", context, err);
        ApiError::Internal {
            message: context.to_string(),
            details: expose_details.then(|| err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Rejection { status, .. } => *status,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            // Well-formed JSON of the wrong shape is a plain bad request here
            JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
            other => other.status(),
        };
        ApiError::Rejection {
            status,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::Rejection { message: msg, .. } => ErrorBody::new(msg),
            ApiError::Internal { message, details } => ErrorBody {
                details,
                ..ErrorBody::new(message)
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
