//! Discovery endpoint: base64 photo in, discovery report out.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::domains::discovery::{DiscoveryError, DiscoveryReport};
use crate::server::app::AppState;

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    /// Free-text question for the chat collaborator; not used by discovery
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// HTTP status for a failed run
pub fn status_for(error: &DiscoveryError) -> StatusCode {
    match error {
        DiscoveryError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        DiscoveryError::SolvingTimeout { .. } | DiscoveryError::DeadlineExceeded(_) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        DiscoveryError::Authentication(_)
        | DiscoveryError::SolvingFailed(_)
        | DiscoveryError::Transport(_)
        | DiscoveryError::ReferenceUnavailable(_) => StatusCode::BAD_GATEWAY,
        DiscoveryError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Decode a base64 image payload, tolerating a `data:<mime>;base64,` prefix
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, String> {
    let trimmed = payload.trim();
    let encoded = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once("base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| "data URL is not base64 encoded".to_string())?,
        None => trimmed,
    };

    if encoded.is_empty() {
        return Err("imageBase64 is empty".to_string());
    }

    STANDARD
        .decode(encoded)
        .map_err(|e| format!("imageBase64 is not valid base64: {}", e))
}

/// POST /api/discover
pub async fn discover_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<DiscoverRequest>, JsonRejection>,
) -> Result<Json<DiscoveryReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        api_error(rejection.status(), rejection.body_text())
    })?;

    let image = decode_payload(&request.image_base64)
        .map_err(|message| api_error(StatusCode::BAD_REQUEST, message))?;

    if let Some(question) = request.question.as_deref() {
        tracing::debug!(question_len = question.len(), "Discovery request carried a question");
    }

    match state.pipeline.run_discovery(&image).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(error = %e, "Discovery run failed");
            Err(api_error(status_for(&e), e.to_string()))
        }
    }
}
