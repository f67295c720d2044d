//! Server dependencies (using traits for testability)
//!
//! Central container for the external services the discovery pipeline talks
//! to. Every service sits behind a kernel trait so tests can inject doubles.

use anyhow::Result;
use astrometry_client::{
    AstrometryClient, Calibration, JobId, JobStatus, Session, SubmissionId, SubmissionStatus,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::kernel::{BasePlateSolver, BaseReferenceImageSource, SkyViewClient};

// =============================================================================
// AstrometryClient Adapter (implements BasePlateSolver trait)
// =============================================================================

/// Wrapper around AstrometryClient that implements BasePlateSolver trait
pub struct AstrometryAdapter(pub Arc<AstrometryClient>);

impl AstrometryAdapter {
    pub fn new(client: Arc<AstrometryClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BasePlateSolver for AstrometryAdapter {
    async fn login(&self, api_key: &str) -> astrometry_client::Result<Session> {
        self.0.login(api_key).await
    }

    async fn upload(
        &self,
        session: &Session,
        image: &[u8],
    ) -> astrometry_client::Result<SubmissionId> {
        self.0.upload(session, image.to_vec()).await
    }

    async fn submission_status(
        &self,
        id: SubmissionId,
    ) -> astrometry_client::Result<SubmissionStatus> {
        self.0.submission_status(id).await
    }

    async fn job_status(&self, id: JobId) -> astrometry_client::Result<JobStatus> {
        self.0.job_status(id).await
    }

    async fn calibration(&self, id: JobId) -> astrometry_client::Result<Calibration> {
        self.0.calibration(id).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// External services used by the discovery pipeline
#[derive(Clone)]
pub struct ServerDeps {
    pub plate_solver: Arc<dyn BasePlateSolver>,
    pub reference_images: Arc<dyn BaseReferenceImageSource>,
}

impl ServerDeps {
    pub fn new(
        plate_solver: Arc<dyn BasePlateSolver>,
        reference_images: Arc<dyn BaseReferenceImageSource>,
    ) -> Self {
        Self {
            plate_solver,
            reference_images,
        }
    }

    /// Production wiring: astrometry.net for solving, SkyView for references
    pub fn live(astrometry_base_url: &str) -> Result<Self> {
        let astrometry = AstrometryClient::new().with_base_url(astrometry_base_url);
        Ok(Self::new(
            Arc::new(AstrometryAdapter::new(Arc::new(astrometry))),
            Arc::new(SkyViewClient::new()?),
        ))
    }
}
