use async_trait::async_trait;

use crate::error::FeedError;
use crate::models::{RawTokenRecord, TimeframeKey};

pub mod tracker;

pub use tracker::TrackerClient;

/// Cancellable source of raw trending-token records.
///
/// The controller only ever talks to this seam; cancellation is handled
/// above it (the coordinator drops the in-flight future), so implementors
/// just perform one fetch per call.
#[async_trait]
pub trait TrendingFeedSource: Send + Sync {
    async fn fetch_trending(
        &self,
        timeframe: TimeframeKey,
    ) -> Result<Vec<RawTokenRecord>, FeedError>;
}
