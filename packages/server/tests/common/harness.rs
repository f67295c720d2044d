//! Test harness wiring the discovery pipeline to mock services.

use std::sync::Arc;
use std::time::Duration;

use discovery_core::domains::discovery::{
    ComparisonFailurePolicy, DiscoveryPipeline, PipelineOptions, RetryPolicy, SolverCredentials,
};
use discovery_core::kernel::{MockPlateSolver, MockReferenceImageSource, TestDependencies};
use discovery_core::server::AppState;

pub const TEST_API_KEY: &str = "test-astrometry-key";

/// Mock services plus a pipeline built on them.
pub struct TestHarness {
    pub deps: TestDependencies,
    pub pipeline: Arc<DiscoveryPipeline>,
}

impl TestHarness {
    pub fn new(solver: MockPlateSolver, references: MockReferenceImageSource) -> Self {
        Self::with_options(solver, references, PipelineOptions::default())
    }

    pub fn with_options(
        solver: MockPlateSolver,
        references: MockReferenceImageSource,
        options: PipelineOptions,
    ) -> Self {
        init_tracing();

        let deps = TestDependencies::new(solver, references);
        // Real clock, millisecond polls: the full 20-attempt budget stays fast.
        let pipeline = DiscoveryPipeline::new(
            &deps.server_deps(),
            SolverCredentials::new(TEST_API_KEY),
        )
        .with_retry_policy(RetryPolicy::fixed(20, Duration::from_millis(1)))
        .with_options(options);

        Self {
            deps,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn strict(solver: MockPlateSolver, references: MockReferenceImageSource) -> Self {
        Self::with_options(
            solver,
            references,
            PipelineOptions {
                on_comparison_failure: ComparisonFailurePolicy::Fail,
                ..PipelineOptions::default()
            },
        )
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            pipeline: self.pipeline.clone(),
            inference_configured: false,
            max_upload_bytes: 8 * 1024 * 1024,
            rate_limit: None,
        }
    }
}

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
