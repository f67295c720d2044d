use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::common::ApiKey;
use crate::domains::discovery::pipeline::{ComparisonFailurePolicy, DEFAULT_DEADLINE};
use crate::domains::discovery::reference::DEFAULT_SKYVIEW_URL;
use crate::domains::discovery::retry::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub astrometry_api_key: ApiKey,
    pub astrometry_base_url: String,
    pub skyview_base_url: String,
    /// Used by the captioning/chat collaborators, not by the discovery core
    pub inference_api_key: Option<ApiKey>,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    pub deadline: Option<Duration>,
    pub comparison_failure_policy: ComparisonFailurePolicy,
    pub max_upload_bytes: usize,
    pub rate_limit_replenish_secs: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let astrometry_api_key = lookup("ASTROMETRY_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("ASTROMETRY_API_KEY must be set")?;

        let deadline_secs: u64 = parse_or(
            &lookup,
            "DISCOVERY_DEADLINE_SECS",
            DEFAULT_DEADLINE.as_secs(),
        )?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3001)?,
            astrometry_api_key: ApiKey::new(astrometry_api_key),
            astrometry_base_url: lookup("ASTROMETRY_BASE_URL")
                .unwrap_or_else(|| astrometry_client::DEFAULT_BASE_URL.to_string()),
            skyview_base_url: lookup("SKYVIEW_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SKYVIEW_URL.to_string()),
            inference_api_key: lookup("HF_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .map(ApiKey::new),
            poll_interval: Duration::from_secs(parse_or(
                &lookup,
                "SOLVE_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL.as_secs(),
            )?),
            poll_attempts: parse_or(&lookup, "SOLVE_MAX_ATTEMPTS", DEFAULT_POLL_ATTEMPTS)?,
            deadline: (deadline_secs > 0).then(|| Duration::from_secs(deadline_secs)),
            comparison_failure_policy: match lookup("COMPARISON_FAILURE_POLICY") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e: String| anyhow!(e))
                    .context("COMPARISON_FAILURE_POLICY is invalid")?,
                None => ComparisonFailurePolicy::default(),
            },
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            rate_limit_replenish_secs: parse_or(&lookup, "RATE_LIMIT_REPLENISH_SECS", 2)?,
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 5)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
