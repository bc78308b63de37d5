//! HTTP API handlers for saturno-api

pub mod buildinfo;
pub mod envelope;
pub mod health;
pub mod payload;
pub mod quizzes;

use axum::http::{Method, Uri};

use crate::ApiError;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use quizzes::quiz_routes;

/// Fallback for unmatched paths
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} not found", uri.path()))
}

/// Fallback for a matched path whose method has no handler
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {} not allowed on {}", method, uri.path()))
}
