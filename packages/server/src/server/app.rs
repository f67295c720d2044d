//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::discovery::DiscoveryPipeline;
use crate::server::middleware::{rate_limited, RateLimit};
use crate::server::routes::{discover_handler, health_handler};

/// Shared application state
///
/// Holds no per-run mutable state: concurrent discovery runs share only the
/// pipeline's immutable configuration and service handles.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DiscoveryPipeline>,
    pub inference_configured: bool,
    pub max_upload_bytes: usize,
    /// Per-IP limit on the discovery route; None disables it
    pub rate_limit: Option<RateLimit>,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Result<Router> {
    // CORS configuration - the UI is served from a separate origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let mut discover = Router::new()
        .route("/api/discover", post(discover_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    if let Some(limit) = state.rate_limit {
        discover = rate_limited(discover, limit)?;
    }

    let app = Router::new()
        .merge(discover)
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
