//! Error types for the astrometry.net client.

use thiserror::Error;

/// Result type for astrometry.net client operations.
pub type Result<T> = std::result::Result<T, AstrometryError>;

/// astrometry.net client errors.
#[derive(Debug, Error)]
pub enum AstrometryError {
    /// Transport failure (connection refused, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Login was rejected (bad or revoked API key)
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The API answered 2xx but with `status != "success"`
    #[error("request rejected: {0}")]
    Rejected(String),
}
