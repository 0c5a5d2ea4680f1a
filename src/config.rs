use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::TimeframeKey;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub tracker_api_base_url: String,
    pub tracker_api_key: String,

    pub default_timeframe: TimeframeKey,
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            tracker_api_base_url: env::var("TRACKER_API_BASE_URL")
                .unwrap_or_else(|_| "https://data.solanatracker.io".to_string()),
            tracker_api_key: env::var("TRACKER_API_KEY")
                .context("TRACKER_API_KEY not set in environment")?,

            default_timeframe: env::var("DEFAULT_TIMEFRAME")
                .unwrap_or_else(|_| "5m".to_string())
                .parse()
                .unwrap_or(TimeframeKey::M5),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
        })
    }
}
