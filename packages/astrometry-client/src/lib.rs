//! Pure astrometry.net REST API client.
//!
//! A minimal client for the nova.astrometry.net plate-solving API. Supports
//! logging in, uploading an image, checking submission and job progress, and
//! fetching the calibration of a solved job.
//!
//! The client is stateless: `login` returns a [`Session`] that callers pass
//! back into `upload`, so concurrent solves never share a session slot.
//!
//! # Example
//!
//! ```rust,ignore
//! use astrometry_client::AstrometryClient;
//!
//! let client = AstrometryClient::new();
//! let session = client.login("your-api-key").await?;
//! let submission = client.upload(&session, image_bytes).await?;
//!
//! let status = client.submission_status(submission).await?;
//! if let Some(job) = status.calibrated_job() {
//!     let cal = client.calibration(job).await?;
//!     println!("ra={} dec={}", cal.ra, cal.dec);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{AstrometryError, Result};
pub use types::{
    Calibration, JobId, JobState, JobStatus, Session, SubmissionId, SubmissionStatus,
};

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use types::{LoginRequest, LoginResponse, UploadRequest, UploadResponse};

pub const DEFAULT_BASE_URL: &str = "http://nova.astrometry.net/api";

#[derive(Clone)]
pub struct AstrometryClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for AstrometryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AstrometryClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (self-hosted solver, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange an API key for a session handle.
    pub async fn login(&self, api_key: &str) -> Result<Session> {
        let body = serde_json::to_string(&LoginRequest { apikey: api_key })
            .map_err(|e| AstrometryError::Rejected(e.to_string()))?;

        let resp = self
            .client
            .post(format!("{}/login", self.base_url))
            .form(&[("request-json", body)])
            .send()
            .await?;

        let login: LoginResponse = Self::read_json(resp).await?;
        match (login.status.as_str(), login.session) {
            ("success", Some(session)) => Ok(Session(session)),
            _ => Err(AstrometryError::Authentication(
                login
                    .error_message
                    .unwrap_or_else(|| format!("login status {}", login.status)),
            )),
        }
    }

    /// Upload image bytes under the given session. Returns the submission id.
    pub async fn upload(&self, session: &Session, image: Vec<u8>) -> Result<SubmissionId> {
        let body = serde_json::to_string(&UploadRequest::private(session))
            .map_err(|e| AstrometryError::Rejected(e.to_string()))?;

        let size = image.len();
        let file = Part::bytes(image)
            .file_name("upload.jpg")
            .mime_str("application/octet-stream")?;
        let form = Form::new().text("request-json", body).part("file", file);

        let resp = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = Self::read_json(resp).await?;
        match (upload.status.as_str(), upload.submission_id) {
            ("success", Some(id)) => {
                tracing::debug!(submission_id = id, bytes = size, "Image uploaded");
                Ok(id)
            }
            _ => Err(AstrometryError::Rejected(
                upload
                    .error_message
                    .unwrap_or_else(|| format!("upload status {}", upload.status)),
            )),
        }
    }

    /// Current progress of a submission.
    pub async fn submission_status(&self, id: SubmissionId) -> Result<SubmissionStatus> {
        self.get(&format!("/submissions/{}", id)).await
    }

    /// Current state of a solve job.
    pub async fn job_status(&self, id: JobId) -> Result<JobStatus> {
        self.get(&format!("/jobs/{}", id)).await
    }

    /// Calibration (field centre and scale) of a solved job.
    pub async fn calibration(&self, id: JobId) -> Result<Calibration> {
        self.get(&format!("/jobs/{}/calibration/", id)).await
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn read_json<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AstrometryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}
