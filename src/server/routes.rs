//! Router configuration for the web server.

use std::path::PathBuf;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
///
/// When `public_dir` is given, any path not matched by the API is served from
/// that directory.
pub fn create_router(state: AppState, public_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/collector-data", get(handlers::api_collector_data))
        .route("/api/hello", get(handlers::api_hello))
        .route("/health", get(handlers::health));

    let router = match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}
