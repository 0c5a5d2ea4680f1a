//! trendlens: trending-token feed engine.
//!
//! The core is [`feed::FeedController`]: it fetches a ranked token list
//! per trending window, caches results per window (stale-while-revalidate),
//! cancels superseded in-flight requests, merges externally computed AI
//! rankings into the cached entries, and exposes a deterministically
//! sorted view through a watch-channel subscription that any UI layer can
//! adapt on top of.

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;

pub use api::TrendingFeedSource;
pub use error::FeedError;
pub use feed::{FeedController, FeedSnapshot, FeedState};
