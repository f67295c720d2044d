use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    solver: String,
    inference: String,
}

/// Health check endpoint
///
/// The discovery core holds no connections of its own, so this reports
/// configuration only. A missing inference key does not affect discovery.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    let inference = if state.inference_configured {
        "configured"
    } else {
        "absent"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        solver: "configured".to_string(),
        inference: inference.to_string(),
    })
}
