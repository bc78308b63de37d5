//! saturno-api library - quiz REST service
//!
//! Router, handlers and data access for the `/api/quizzes` resource.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use saturno_common::config::ServerConfig;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

pub mod api;
pub mod db;
pub mod error;

pub use db::QuizStore;
pub use error::{ApiError, ApiResult};

/// Largest accepted request body
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

const CORS_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Quiz persistence backend
    pub store: Arc<dyn QuizStore>,
    /// Resolved server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn QuizStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Whether 500 responses may carry the underlying error text
    pub fn expose_error_details(&self) -> bool {
        self.config.environment.is_development()
    }
}

/// Build application router
///
/// Every response, including fallbacks and CORS preflights, carries the
/// security headers.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(api::quiz_routes())
        .merge(api::health_routes())
        .route(
            "/api/buildinfo",
            get(api::get_build_info).fallback(api::method_not_allowed),
        )
        .fallback(api::route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // AllowOrigin::list rejects a wildcard alongside credentials
            Ok(value) if value == "*" => {
                warn!("Ignoring wildcard CORS origin");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
