//! Timeframe Cache
//!
//! Process-lifetime map from timeframe to the last successfully normalized
//! entry list. Writes replace the stored list wholesale; readers always see
//! a complete list, never an interleaving. Bounded by the fixed timeframe
//! enumeration, so nothing is ever evicted.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{TimeframeKey, TokenEntry};

/// One cached fetch result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub entries: Vec<TokenEntry>,
    /// When the fetch that produced these entries completed
    pub fetched_at: DateTime<Utc>,
}

pub struct TimeframeCache {
    entries: RwLock<HashMap<TimeframeKey, CacheEntry>>,
}

impl TimeframeCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Last successful entry list for a timeframe, or `None` if never fetched.
    pub async fn get(&self, timeframe: TimeframeKey) -> Option<Vec<TokenEntry>> {
        let entries = self.entries.read().await;
        entries.get(&timeframe).map(|e| e.entries.clone())
    }

    /// Full cache record including the fetch timestamp.
    pub async fn get_entry(&self, timeframe: TimeframeKey) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        entries.get(&timeframe).cloned()
    }

    pub async fn contains(&self, timeframe: TimeframeKey) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(&timeframe)
    }

    /// Atomically replace the stored list for a timeframe.
    pub async fn put(&self, timeframe: TimeframeKey, list: Vec<TokenEntry>) {
        let mut entries = self.entries.write().await;
        debug!("Caching {} entries for {}", list.len(), timeframe);
        entries.insert(
            timeframe,
            CacheEntry {
                entries: list,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Replace the stored list for an already-cached timeframe without
    /// counting it as a fresh fetch (the fetch timestamp is preserved).
    /// Used when merging AI ranks into an existing set. Returns false when
    /// the timeframe was never fetched.
    pub async fn update(&self, timeframe: TimeframeKey, list: Vec<TokenEntry>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&timeframe) {
            Some(cached) => {
                cached.entries = list;
                true
            }
            None => false,
        }
    }

    /// Number of timeframes cached so far.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for TimeframeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mint: &str, rank: u32) -> TokenEntry {
        TokenEntry {
            mint: mint.to_string(),
            name: mint.to_string(),
            symbol: mint.to_uppercase(),
            image_url: None,
            price: 1.0,
            market_cap: 0.0,
            price_change_percent: 0.0,
            rank,
            ai_rank: None,
        }
    }

    #[tokio::test]
    async fn test_get_before_put_is_none() {
        let cache = TimeframeCache::new();
        assert!(cache.get(TimeframeKey::M5).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_replaces_wholesale() {
        let cache = TimeframeCache::new();
        cache
            .put(TimeframeKey::M5, vec![entry("a", 1), entry("b", 2)])
            .await;
        cache.put(TimeframeKey::M5, vec![entry("c", 1)]).await;

        let got = cache.get(TimeframeKey::M5).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].mint, "c");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_preserves_fetch_timestamp() {
        let cache = TimeframeCache::new();
        assert!(!cache.update(TimeframeKey::M5, vec![entry("a", 1)]).await);

        cache.put(TimeframeKey::M5, vec![entry("a", 1)]).await;
        let before = cache.get_entry(TimeframeKey::M5).await.unwrap().fetched_at;

        assert!(cache.update(TimeframeKey::M5, vec![entry("b", 1)]).await);
        let after = cache.get_entry(TimeframeKey::M5).await.unwrap();
        assert_eq!(after.entries[0].mint, "b");
        assert_eq!(after.fetched_at, before);
    }

    #[tokio::test]
    async fn test_timeframes_are_independent() {
        let cache = TimeframeCache::new();
        cache.put(TimeframeKey::M5, vec![entry("a", 1)]).await;
        cache.put(TimeframeKey::H1, vec![entry("b", 1)]).await;

        assert_eq!(cache.get(TimeframeKey::M5).await.unwrap()[0].mint, "a");
        assert_eq!(cache.get(TimeframeKey::H1).await.unwrap()[0].mint, "b");
        assert!(!cache.contains(TimeframeKey::H24).await);
    }
}
