// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The discovery pipeline sequences calls to these; tests swap in the
// doubles from test_dependencies.
//
// Naming convention: Base* for trait names (e.g., BasePlateSolver)

use async_trait::async_trait;

use astrometry_client::{Calibration, JobId, JobStatus, Session, SubmissionId, SubmissionStatus};

// =============================================================================
// Plate Solving Trait (Infrastructure - astrometry.net style API)
// =============================================================================

#[async_trait]
pub trait BasePlateSolver: Send + Sync {
    /// Exchange an API key for a session handle
    async fn login(&self, api_key: &str) -> astrometry_client::Result<Session>;

    /// Upload image bytes under a session; returns the submission id
    async fn upload(&self, session: &Session, image: &[u8])
        -> astrometry_client::Result<SubmissionId>;

    /// Jobs and calibrations linked to a submission so far
    async fn submission_status(&self, id: SubmissionId)
        -> astrometry_client::Result<SubmissionStatus>;

    /// Whether a solve job is still running, succeeded or failed
    async fn job_status(&self, id: JobId) -> astrometry_client::Result<JobStatus>;

    /// Field centre of a solved job
    async fn calibration(&self, id: JobId) -> astrometry_client::Result<Calibration>;
}

// =============================================================================
// Reference Image Trait (Infrastructure - sky survey cutouts)
// =============================================================================

#[async_trait]
pub trait BaseReferenceImageSource: Send + Sync {
    /// Download the image behind a survey locator
    async fn fetch(&self, locator: &str) -> anyhow::Result<Vec<u8>>;
}
