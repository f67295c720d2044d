//! Discovery pipeline orchestration.
//!
//! Pipeline:
//! 1. Decode the submitted image
//! 2. Plate-solve it to recover the field centre
//! 3. Build the historical survey locator for those coordinates
//! 4. Fetch the reference and diff it against the user image
//! 5. Classify the difference count and assemble the report
//!
//! Stages run strictly in sequence. Only the solver retries (internally); any
//! other failure aborts the run. The whole run is bounded by an optional
//! deadline and can be cancelled by the caller.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::domains::discovery::classifier::{classify, verdict};
use crate::domains::discovery::comparator::ImageComparator;
use crate::domains::discovery::errors::{DiscoveryError, Result};
use crate::domains::discovery::models::{
    CalibrationResult, ComparisonOutcome, DiscoveryReport, ReportCoords,
};
use crate::domains::discovery::reference::ReferenceImageFetcher;
use crate::domains::discovery::retry::RetryPolicy;
use crate::domains::discovery::solver::{PlateSolvingClient, SolverCredentials};
use crate::kernel::{BaseReferenceImageSource, ServerDeps};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);

/// What to do when the reference comparison cannot be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonFailurePolicy {
    /// Substitute a zero difference count; the field reads as stable
    #[default]
    TreatAsStable,
    /// Abort the run with `ReferenceUnavailable`
    Fail,
}

impl FromStr for ComparisonFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Self::TreatAsStable),
            "fail" => Ok(Self::Fail),
            other => Err(format!(
                "unknown comparison failure policy '{}' (expected 'stable' or 'fail')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// End-to-end bound on a run; None = unbounded
    pub deadline: Option<Duration>,
    pub on_comparison_failure: ComparisonFailurePolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            deadline: Some(DEFAULT_DEADLINE),
            on_comparison_failure: ComparisonFailurePolicy::default(),
        }
    }
}

pub struct DiscoveryPipeline {
    solver: PlateSolvingClient,
    references: ReferenceImageFetcher,
    comparator: ImageComparator,
    reference_images: Arc<dyn BaseReferenceImageSource>,
    credentials: SolverCredentials,
    options: PipelineOptions,
}

impl DiscoveryPipeline {
    pub fn new(deps: &ServerDeps, credentials: SolverCredentials) -> Self {
        Self {
            solver: PlateSolvingClient::new(deps.plate_solver.clone(), RetryPolicy::default()),
            references: ReferenceImageFetcher::default(),
            comparator: ImageComparator::default(),
            reference_images: deps.reference_images.clone(),
            credentials,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.solver = self.solver.with_policy(policy);
        self
    }

    pub fn with_reference_fetcher(mut self, references: ReferenceImageFetcher) -> Self {
        self.references = references;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one discovery over raw image bytes.
    pub async fn run_discovery(&self, image_bytes: &[u8]) -> Result<DiscoveryReport> {
        self.run_discovery_with_cancellation(image_bytes, CancellationToken::new())
            .await
    }

    /// Run one discovery, aborting early if `cancel` fires.
    pub async fn run_discovery_with_cancellation(
        &self,
        image_bytes: &[u8],
        cancel: CancellationToken,
    ) -> Result<DiscoveryReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("discovery_run", %run_id, bytes = image_bytes.len());
        let run = self.execute(image_bytes).instrument(span);

        let bounded = async {
            match self.options.deadline {
                Some(limit) => tokio::time::timeout(limit, run)
                    .await
                    .unwrap_or(Err(DiscoveryError::DeadlineExceeded(limit))),
                None => run.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(%run_id, "Discovery run cancelled");
                Err(DiscoveryError::Cancelled)
            }
            result = bounded => result,
        }
    }

    async fn execute(&self, image_bytes: &[u8]) -> Result<DiscoveryReport> {
        let image = decode_image(image_bytes).await?;
        info!(
            width = image.width(),
            height = image.height(),
            "Decoded submitted image"
        );

        let calibration = self.solver.solve(image_bytes, &self.credentials).await?;
        validate_coordinates(&calibration)?;

        let locator = self
            .references
            .build_reference_url(calibration.ra, calibration.dec);

        let outcome = self
            .comparator
            .compare_with_reference(image, &locator, self.reference_images.as_ref())
            .await;

        let differing_pixels = match outcome {
            ComparisonOutcome::Measured { differing_pixels } => differing_pixels,
            ComparisonOutcome::Unavailable { reason } => match self.options.on_comparison_failure
            {
                ComparisonFailurePolicy::TreatAsStable => {
                    warn!(%reason, "Comparison degraded, treating field as stable");
                    0
                }
                ComparisonFailurePolicy::Fail => {
                    return Err(DiscoveryError::ReferenceUnavailable(reason));
                }
            },
        };

        let classification = classify(differing_pixels);
        info!(
            differing_pixels,
            classification = %classification,
            "Discovery run complete"
        );

        Ok(DiscoveryReport {
            coords: ReportCoords::from_calibration(&calibration),
            historical_image: locator,
            discovery: verdict(classification, differing_pixels),
            classification,
        })
    }
}

async fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(DiscoveryError::InvalidImage("empty payload".into()));
    }

    let owned = bytes.to_vec();
    tokio::task::spawn_blocking(move || image::load_from_memory(&owned))
        .await
        .map_err(|e| DiscoveryError::InvalidImage(format!("decode task failed: {}", e)))?
        .map_err(|e| DiscoveryError::InvalidImage(e.to_string()))
}

fn validate_coordinates(calibration: &CalibrationResult) -> Result<()> {
    let ra_ok = calibration.ra.is_finite() && (0.0..=360.0).contains(&calibration.ra);
    let dec_ok = calibration.dec.is_finite() && (-90.0..=90.0).contains(&calibration.dec);
    if ra_ok && dec_ok {
        Ok(())
    } else {
        Err(DiscoveryError::SolvingFailed(format!(
            "calibration out of range: ra={} dec={}",
            calibration.ra, calibration.dec
        )))
    }
}
