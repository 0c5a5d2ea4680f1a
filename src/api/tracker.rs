use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::TrendingFeedSource;
use crate::error::FeedError;
use crate::models::{RawTokenRecord, TimeframeKey};

// Verified base URL
const TRACKER_BASE_URL: &str = "https://data.solanatracker.io";

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Client for the trending-token data API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl TrackerClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(
            TRACKER_BASE_URL,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Construct against a custom base URL (tests, self-hosted proxies).
    pub fn with_base_url(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client for tracker API"),
        }
    }
}

#[async_trait]
impl TrendingFeedSource for TrackerClient {
    /// Fetches the raw trending list for one timeframe from
    /// `/tokens/trending/{timeframe}`.
    async fn fetch_trending(
        &self,
        timeframe: TimeframeKey,
    ) -> Result<Vec<RawTokenRecord>, FeedError> {
        let url = format!("{}/tokens/trending/{}", self.base_url, timeframe);

        debug!("Fetching trending tokens for {}: {}", timeframe, url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| FeedError::FetchFailed(format!("request to trending API failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!(
                "Trending API error for {}: {} - {}",
                timeframe, status, error_text
            );
            return Err(FeedError::FetchFailed(format!(
                "trending API returned {} for {}",
                status, timeframe
            )));
        }

        let records: Vec<RawTokenRecord> = response.json().await.map_err(|e| {
            FeedError::FetchFailed(format!("failed to parse trending API response: {}", e))
        })?;

        debug!("Trending API returned {} records for {}", records.len(), timeframe);
        Ok(records)
    }
}
