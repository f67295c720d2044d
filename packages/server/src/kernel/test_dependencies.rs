// TestDependencies - mock implementations for testing
//
// Deterministic stand-ins for the plate-solving and survey services so the
// pipeline's timeout, failure and classification paths can be driven without
// network calls.

use anyhow::Result;
use astrometry_client::{
    AstrometryError, Calibration, JobId, JobState, JobStatus, Session, SubmissionId,
    SubmissionStatus,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{BasePlateSolver, BaseReferenceImageSource, ServerDeps};

const MOCK_SUBMISSION_ID: SubmissionId = 9001;
const MOCK_JOB_ID: JobId = 4242;

// =============================================================================
// Mock Plate Solver
// =============================================================================

/// Scripted plate solver.
///
/// By default logs in, accepts the upload, and reports a calibration on the
/// first status poll.
pub struct MockPlateSolver {
    ra: f64,
    dec: f64,
    /// Poll number (1-based) on which the calibration appears; None = never
    solved_on_poll: Option<u32>,
    reject_login: bool,
    fail_upload: bool,
    fail_job: bool,
    /// Poll number (1-based) that answers with a gateway error
    fail_poll_on: Option<u32>,
    polls: Mutex<u32>,
    uploads: Mutex<Vec<usize>>,
    logins: Mutex<Vec<String>>,
}

impl MockPlateSolver {
    pub fn new() -> Self {
        Self {
            ra: 150.0,
            dec: 2.0,
            solved_on_poll: Some(1),
            reject_login: false,
            fail_upload: false,
            fail_job: false,
            fail_poll_on: None,
            polls: Mutex::new(0),
            uploads: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
        }
    }

    /// Coordinates returned by the calibration endpoint
    pub fn with_coordinates(mut self, ra: f64, dec: f64) -> Self {
        self.ra = ra;
        self.dec = dec;
        self
    }

    /// Report the calibration on the given poll
    pub fn solved_on_poll(mut self, poll: u32) -> Self {
        self.solved_on_poll = Some(poll);
        self
    }

    /// Never report a calibration
    pub fn never_solves(mut self) -> Self {
        self.solved_on_poll = None;
        self
    }

    pub fn rejecting_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    /// Spawn a job that the service reports as failed
    pub fn with_failed_job(mut self) -> Self {
        self.fail_job = true;
        self.solved_on_poll = None;
        self
    }

    /// Answer the given status poll with a 502 from the service
    pub fn failing_poll_on(mut self, poll: u32) -> Self {
        self.fail_poll_on = Some(poll);
        self
    }

    /// Number of submission status polls made
    pub fn poll_count(&self) -> u32 {
        *self.polls.lock().unwrap()
    }

    /// Byte sizes of every upload
    pub fn uploads(&self) -> Vec<usize> {
        self.uploads.lock().unwrap().clone()
    }

    /// API keys presented at login
    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }
}

impl Default for MockPlateSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePlateSolver for MockPlateSolver {
    async fn login(&self, api_key: &str) -> astrometry_client::Result<Session> {
        self.logins.lock().unwrap().push(api_key.to_string());
        if self.reject_login {
            return Err(AstrometryError::Authentication("bad apikey".into()));
        }
        Ok(Session(format!("session-{}", api_key.len())))
    }

    async fn upload(
        &self,
        _session: &Session,
        image: &[u8],
    ) -> astrometry_client::Result<SubmissionId> {
        self.uploads.lock().unwrap().push(image.len());
        if self.fail_upload {
            return Err(AstrometryError::Api {
                status: 503,
                message: "upload service unavailable".into(),
            });
        }
        Ok(MOCK_SUBMISSION_ID)
    }

    async fn submission_status(
        &self,
        _id: SubmissionId,
    ) -> astrometry_client::Result<SubmissionStatus> {
        let poll = {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            *polls
        };

        if self.fail_poll_on == Some(poll) {
            return Err(AstrometryError::Api {
                status: 502,
                message: "bad gateway".into(),
            });
        }

        let solved = self.solved_on_poll.is_some_and(|n| poll >= n);
        let mut status = SubmissionStatus {
            processing_started: Some("2024-01-01 00:00:00".into()),
            ..Default::default()
        };
        if solved {
            status.jobs = vec![Some(MOCK_JOB_ID)];
            status.job_calibrations = vec![(MOCK_JOB_ID, 1)];
        } else if self.fail_job {
            status.jobs = vec![Some(MOCK_JOB_ID)];
        } else {
            status.jobs = vec![None];
        }
        Ok(status)
    }

    async fn job_status(&self, _id: JobId) -> astrometry_client::Result<JobStatus> {
        let status = if self.fail_job {
            JobState::Failure
        } else {
            JobState::Solving
        };
        Ok(JobStatus { status })
    }

    async fn calibration(&self, _id: JobId) -> astrometry_client::Result<Calibration> {
        Ok(Calibration {
            ra: self.ra,
            dec: self.dec,
            radius: Some(0.25),
            pixscale: Some(1.7),
            orientation: Some(180.0),
            parity: Some(1.0),
        })
    }
}

// =============================================================================
// Mock Reference Image Source
// =============================================================================

pub struct MockReferenceImageSource {
    image: Option<Vec<u8>>,
    fetched: Mutex<Vec<String>>,
}

impl MockReferenceImageSource {
    /// Serve these bytes for every locator
    pub fn serving(image: Vec<u8>) -> Self {
        Self {
            image: Some(image),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Fail every fetch
    pub fn failing() -> Self {
        Self {
            image: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Locators requested so far
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseReferenceImageSource for MockReferenceImageSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(locator.to_string());
        match &self.image {
            Some(bytes) => Ok(bytes.clone()),
            None => anyhow::bail!("survey service unreachable"),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Mock services plus handles for asserting on their calls
pub struct TestDependencies {
    pub plate_solver: Arc<MockPlateSolver>,
    pub reference_images: Arc<MockReferenceImageSource>,
}

impl TestDependencies {
    pub fn new(plate_solver: MockPlateSolver, reference_images: MockReferenceImageSource) -> Self {
        Self {
            plate_solver: Arc::new(plate_solver),
            reference_images: Arc::new(reference_images),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(self.plate_solver.clone(), self.reference_images.clone())
    }
}
