// Rate limiting middleware using tower-governor
//
// The plate-solving and survey services are rate-limited third parties, and
// every discovery run holds a solver session for up to a minute. Limits are
// per client IP (X-Forwarded-For / X-Real-IP, falling back to the socket
// address) and apply only to the discovery route.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};

use crate::server::routes::ErrorResponse;

/// Per-IP quota for discovery requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Seconds for one request of quota to come back
    pub replenish_secs: u64,
    pub burst: u32,
}

impl RateLimit {
    pub fn new(replenish_secs: u64, burst: u32) -> Self {
        Self { replenish_secs, burst }
    }
}

/// Wrap a router in a per-IP governor layer
pub fn rate_limited<S>(router: Router<S>, limit: RateLimit) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(limit.replenish_secs)
            .burst_size(limit.burst)
            .use_headers()
            .error_handler(rejection_response)
            .finish()
            .context("Rate limiter configuration is invalid (values must be > 0)")?,
    );

    Ok(router.layer(GovernorLayer { config }))
}

/// Governor rejections in the same `{ "error": ... }` shape as the route's own failures
fn rejection_response(error: GovernorError) -> Response<Body> {
    let message = error.to_string();
    let (status, headers) = match error {
        GovernorError::TooManyRequests { headers, .. } => (StatusCode::TOO_MANY_REQUESTS, headers),
        GovernorError::UnableToExtractKey => (StatusCode::INTERNAL_SERVER_ERROR, None),
        GovernorError::Other { code, headers, .. } => (code, headers),
    };

    let body = Json(ErrorResponse { error: message });
    match headers {
        Some(headers) => (status, headers, body).into_response(),
        None => (status, body).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn too_many_requests_is_json_with_retry_headers() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-ratelimit-after", "2".parse().unwrap());

        let response = rejection_response(GovernorError::TooManyRequests {
            wait_time: 2,
            headers: Some(headers),
        });

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-after"], "2");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Wait for 2s"));
    }

    #[tokio::test]
    async fn missing_client_address_is_json_error() {
        let response = rejection_response(GovernorError::UnableToExtractKey);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }
}
