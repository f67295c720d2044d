use astrometry_client::{Calibration, JobId};

/// Field centre recovered by plate solving. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    /// Right ascension, degrees
    pub ra: f64,
    /// Declination, degrees
    pub dec: f64,
    pub job_id: JobId,
    /// Field radius, degrees
    pub radius: Option<f64>,
    /// Arcseconds per pixel
    pub pixel_scale: Option<f64>,
}

impl CalibrationResult {
    pub fn new(job_id: JobId, ra: f64, dec: f64) -> Self {
        Self {
            ra,
            dec,
            job_id,
            radius: None,
            pixel_scale: None,
        }
    }

    pub fn from_calibration(job_id: JobId, calibration: &Calibration) -> Self {
        Self {
            ra: calibration.ra,
            dec: calibration.dec,
            job_id,
            radius: calibration.radius,
            pixel_scale: calibration.pixscale,
        }
    }
}
