//! Error taxonomy for a discovery run.

use std::time::Duration;

use astrometry_client::AstrometryError;
use thiserror::Error;

/// Errors that abort a discovery run. No partial report is produced.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Submitted bytes are not a decodable image
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Plate-solving login was rejected
    #[error("plate-solving authentication failed: {0}")]
    Authentication(String),

    /// No calibration within the poll budget
    #[error("plate solving timed out after {attempts} status checks")]
    SolvingTimeout { attempts: u32 },

    /// The solving service refused the upload or its job failed
    #[error("plate-solving service error: {0}")]
    SolvingFailed(String),

    /// Network failure talking to an external service
    #[error("transport error: {0}")]
    Transport(String),

    /// Reference image could not be compared (only under the `fail` policy)
    #[error("historical reference unavailable: {0}")]
    ReferenceUnavailable(String),

    /// The run exceeded its end-to-end deadline
    #[error("discovery exceeded deadline of {}s", .0.as_secs())]
    DeadlineExceeded(Duration),

    /// The run was cancelled by its caller
    #[error("discovery cancelled")]
    Cancelled,
}

impl From<AstrometryError> for DiscoveryError {
    fn from(err: AstrometryError) -> Self {
        match err {
            AstrometryError::Authentication(msg) => Self::Authentication(msg),
            AstrometryError::Http(e) => Self::Transport(e.to_string()),
            AstrometryError::Api { status, message } => {
                Self::SolvingFailed(format!("status {}: {}", status, message))
            }
            AstrometryError::Rejected(msg) => Self::SolvingFailed(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_says_solving_timed_out() {
        let err = DiscoveryError::SolvingTimeout { attempts: 20 };
        assert!(err.to_string().contains("solving timed out"));
    }

    #[test]
    fn astrometry_errors_map_to_stages() {
        let err: DiscoveryError = AstrometryError::Authentication("bad key".into()).into();
        assert!(matches!(err, DiscoveryError::Authentication(m) if m == "bad key"));

        let err: DiscoveryError = AstrometryError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, DiscoveryError::SolvingFailed(_)));
    }
}
