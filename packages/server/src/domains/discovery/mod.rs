//! Discovery domain - plate-solve a sky photo and compare it with survey history
//!
//! Components, leaf-first:
//! - `comparator`: normalize two images and count differing pixels
//! - `reference`: survey cutout locator for solved coordinates
//! - `solver`: plate-solving login/upload/poll state machine
//! - `classifier`: threshold a difference count into a label
//! - `pipeline`: sequence the above into one `DiscoveryReport`

pub mod classifier;
pub mod comparator;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod retry;
pub mod solver;

pub use classifier::{classify, verdict, Classification, ANOMALY_THRESHOLD};
pub use comparator::{ImageComparator, WORKING_RESOLUTION};
pub use errors::DiscoveryError;
pub use models::{CalibrationResult, ComparisonOutcome, DiscoveryReport, ReportCoords};
pub use pipeline::{ComparisonFailurePolicy, DiscoveryPipeline, PipelineOptions};
pub use reference::{build_reference_url, ReferenceImageFetcher};
pub use retry::{Backoff, RetryPolicy};
pub use solver::{PlateSolvingClient, SolveState, SolverCredentials};
