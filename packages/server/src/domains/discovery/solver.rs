//! Plate-solving stage: login, upload, then poll until calibrated.
//!
//! State machine per run:
//! `LoggedOut -> SessionEstablished -> Submitted -> Polling -> Calibrated | TimedOut | Failed`.
//! The session lives only inside one `solve` call.

use std::sync::Arc;

use astrometry_client::JobState;
use tracing::{debug, info, warn};

use crate::common::ApiKey;
use crate::domains::discovery::errors::{DiscoveryError, Result};
use crate::domains::discovery::models::CalibrationResult;
use crate::domains::discovery::retry::RetryPolicy;
use crate::kernel::BasePlateSolver;

/// Log a progress line every this many polls.
const HEARTBEAT_EVERY: u32 = 5;

/// Credentials presented to the solving service at login.
#[derive(Debug, Clone)]
pub struct SolverCredentials {
    pub api_key: ApiKey,
}

impl SolverCredentials {
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    LoggedOut,
    SessionEstablished,
    Submitted,
    Polling { attempt: u32 },
    Calibrated,
    TimedOut,
    Failed,
}

struct Progress {
    state: SolveState,
}

impl Progress {
    fn advance(&mut self, next: SolveState) {
        debug!(from = ?self.state, to = ?next, "Plate solve transition");
        self.state = next;
    }
}

pub struct PlateSolvingClient {
    service: Arc<dyn BasePlateSolver>,
    policy: RetryPolicy,
}

impl PlateSolvingClient {
    pub fn new(service: Arc<dyn BasePlateSolver>, policy: RetryPolicy) -> Self {
        Self { service, policy }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Recover the field centre of an image.
    ///
    /// Fails with [`DiscoveryError::SolvingTimeout`] once the poll budget is
    /// spent; any service or transport error ends the run immediately.
    pub async fn solve(
        &self,
        image: &[u8],
        credentials: &SolverCredentials,
    ) -> Result<CalibrationResult> {
        let mut progress = Progress {
            state: SolveState::LoggedOut,
        };

        let outcome = self.drive(image, credentials, &mut progress).await;
        if let Err(e) = &outcome {
            if progress.state != SolveState::TimedOut {
                warn!(error = %e, state = ?progress.state, "Plate solving failed");
                progress.advance(SolveState::Failed);
            }
        }
        outcome
    }

    async fn drive(
        &self,
        image: &[u8],
        credentials: &SolverCredentials,
        progress: &mut Progress,
    ) -> Result<CalibrationResult> {
        let session = self.service.login(credentials.api_key.expose()).await?;
        progress.advance(SolveState::SessionEstablished);

        let submission_id = self.service.upload(&session, image).await?;
        progress.advance(SolveState::Submitted);
        info!(submission_id, "Image submitted for plate solving");

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.delay_for(attempt)).await;
            progress.advance(SolveState::Polling { attempt });

            let status = self.service.submission_status(submission_id).await?;

            if let Some(job_id) = status.calibrated_job() {
                let calibration = self.service.calibration(job_id).await?;
                progress.advance(SolveState::Calibrated);
                info!(
                    submission_id,
                    job_id,
                    attempt,
                    ra = calibration.ra,
                    dec = calibration.dec,
                    "Plate solved"
                );
                return Ok(CalibrationResult::from_calibration(job_id, &calibration));
            }

            for job_id in status.job_ids() {
                if self.service.job_status(job_id).await?.status == JobState::Failure {
                    return Err(DiscoveryError::SolvingFailed(format!(
                        "solve job {} failed",
                        job_id
                    )));
                }
            }

            if attempt % HEARTBEAT_EVERY == 0 {
                info!(
                    submission_id,
                    attempt,
                    max_attempts = self.policy.max_attempts,
                    "Still waiting for calibration"
                );
            }
        }

        progress.advance(SolveState::TimedOut);
        Err(DiscoveryError::SolvingTimeout {
            attempts: self.policy.max_attempts,
        })
    }
}
