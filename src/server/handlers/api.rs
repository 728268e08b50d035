//! API endpoint handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::super::AppState;
use crate::storage::parse_csv;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn api_hello() -> impl IntoResponse {
    Json(json!({ "message": "Hello from AdStream Finder Backend!" }))
}

/// The stored collection results as a JSON array.
///
/// Read and parse failures are logged; the client only sees a fixed message.
pub async fn api_collector_data(State(state): State<AppState>) -> impl IntoResponse {
    let data_dir = state.data_dir.clone();
    let dataset = state.dataset.clone();
    let parsed = tokio::task::spawn_blocking(move || parse_csv(&data_dir, &dataset)).await;

    match parsed {
        Ok(Ok(results)) => Json(results).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Error reading collector data: {}", e);
            collector_data_error().into_response()
        }
        Err(e) => {
            tracing::error!("Collector data task failed: {}", e);
            collector_data_error().into_response()
        }
    }
}

fn collector_data_error() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Failed to fetch collector data" })),
    )
}
