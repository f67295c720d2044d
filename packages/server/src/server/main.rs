// Main entry point for the discovery API server

use std::sync::Arc;

use anyhow::{Context, Result};
use discovery_core::domains::discovery::{
    DiscoveryPipeline, PipelineOptions, ReferenceImageFetcher, RetryPolicy, SolverCredentials,
};
use discovery_core::kernel::ServerDeps;
use discovery_core::server::{build_app, middleware::RateLimit, AppState};
use discovery_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,discovery_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AstroVision discovery API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    if config.inference_api_key.is_none() {
        tracing::warn!("HF_API_KEY not set; inference collaborators disabled, discovery unaffected");
    }

    // External services
    let deps = ServerDeps::live(&config.astrometry_base_url)
        .context("Failed to create external service clients")?;

    let retry_policy = RetryPolicy::fixed(config.poll_attempts, config.poll_interval);
    let pipeline = DiscoveryPipeline::new(
        &deps,
        SolverCredentials::new(config.astrometry_api_key.clone()),
    )
    .with_retry_policy(retry_policy)
    .with_reference_fetcher(ReferenceImageFetcher::new(config.skyview_base_url.clone()))
    .with_options(PipelineOptions {
        deadline: config.deadline,
        on_comparison_failure: config.comparison_failure_policy,
    });

    tracing::info!(
        poll_attempts = config.poll_attempts,
        poll_interval_secs = config.poll_interval.as_secs(),
        worst_case_solve_secs = retry_policy.worst_case().as_secs(),
        deadline_secs = ?config.deadline.map(|d| d.as_secs()),
        comparison_failure_policy = ?config.comparison_failure_policy,
        "Discovery pipeline ready"
    );

    // Build application
    let app = build_app(AppState {
        pipeline: Arc::new(pipeline),
        inference_configured: config.inference_api_key.is_some(),
        max_upload_bytes: config.max_upload_bytes,
        rate_limit: Some(RateLimit::new(
            config.rate_limit_replenish_secs,
            config.rate_limit_burst,
        )),
    })
    .context("Failed to build router")?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Discovery endpoint: http://localhost:{}/api/discover", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
