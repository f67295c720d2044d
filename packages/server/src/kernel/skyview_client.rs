use anyhow::{Context, Result};
use async_trait::async_trait;

use super::BaseReferenceImageSource;

/// SkyView survey client for historical reference cutouts
pub struct SkyViewClient {
    client: reqwest::Client,
}

impl SkyViewClient {
    /// Create a new SkyView client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl BaseReferenceImageSource for SkyViewClient {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .context("Failed to send SkyView request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("SkyView error {}: {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read SkyView image body")?;

        if bytes.is_empty() {
            anyhow::bail!("SkyView returned an empty image");
        }

        tracing::debug!(bytes = bytes.len(), "Fetched reference image");
        Ok(bytes.to_vec())
    }
}
