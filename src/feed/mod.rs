pub mod cache;
pub mod controller;
pub mod coordinator;
pub mod merger;
pub mod normalizer;
pub mod sorter;

pub use cache::{CacheEntry, TimeframeCache};
pub use controller::{FeedController, FeedSnapshot, FeedState};
pub use coordinator::{FetchTicket, RequestCoordinator};
pub use merger::merge_ai_ranks;
pub use normalizer::normalize_records;
pub use sorter::sort_entries;
