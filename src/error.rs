use thiserror::Error;

use crate::models::TimeframeKey;

/// Failure taxonomy for the trending feed core.
///
/// Nothing here is fatal to the process: cancelled and skipped work is
/// absorbed locally, and a failed fetch degrades to whatever cached data
/// exists for the timeframe.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Fetch cancelled")]
    FetchCancelled,

    #[error("AI ranking merge skipped for {timeframe}: {reason}")]
    MergeSkipped {
        timeframe: TimeframeKey,
        reason: String,
    },

    #[error("Invalid token record: {0}")]
    InvalidRecord(String),
}
