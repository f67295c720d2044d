use serde::{Deserialize, Serialize};

/// Session handle returned by `login`. Passed explicitly to every call that
/// needs it; the client itself never stores one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(pub String);

impl Session {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier the service assigns to an uploaded image.
pub type SubmissionId = u64;

/// Identifier of a solve job spawned from a submission.
pub type JobId = u64;

/// Body of the `request-json` form field sent to `/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub apikey: &'a str,
}

/// Body of the `request-json` multipart field sent to `/upload`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRequest<'a> {
    pub session: &'a str,
    pub allow_commercial_use: &'a str,
    pub allow_modifications: &'a str,
    pub publicly_visible: &'a str,
}

impl<'a> UploadRequest<'a> {
    /// Private upload: not listed publicly, no commercial reuse.
    pub fn private(session: &'a Session) -> Self {
        Self {
            session: session.as_str(),
            allow_commercial_use: "n",
            allow_modifications: "n",
            publicly_visible: "n",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    pub session: Option<String>,
    #[serde(rename = "errormessage")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(rename = "subid")]
    pub submission_id: Option<SubmissionId>,
    #[serde(rename = "errormessage")]
    pub error_message: Option<String>,
}

/// Submission progress as reported by `/submissions/{id}`.
///
/// `jobs` holds `null` until the service has spawned a solve job.
/// `job_calibrations` holds `[job_id, calibration_id]` pairs once solved.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionStatus {
    pub processing_started: Option<String>,
    pub processing_finished: Option<String>,
    #[serde(default)]
    pub jobs: Vec<Option<JobId>>,
    #[serde(default)]
    pub job_calibrations: Vec<(JobId, u64)>,
}

impl SubmissionStatus {
    /// First job that already has a calibration attached.
    pub fn calibrated_job(&self) -> Option<JobId> {
        self.job_calibrations.first().map(|(job, _)| *job)
    }

    /// Jobs the service has spawned so far.
    pub fn job_ids(&self) -> impl Iterator<Item = JobId> + '_ {
        self.jobs.iter().flatten().copied()
    }
}

/// Solve job state from `/jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Solving,
    Success,
    Failure,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
}

/// Calibration of a solved job, from `/jobs/{id}/calibration/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Calibration {
    /// Right ascension of the field centre, degrees
    pub ra: f64,
    /// Declination of the field centre, degrees
    pub dec: f64,
    /// Field radius, degrees
    pub radius: Option<f64>,
    /// Arcseconds per pixel
    pub pixscale: Option<f64>,
    pub orientation: Option<f64>,
    pub parity: Option<f64>,
}
