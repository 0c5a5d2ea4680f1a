//! Feed Controller
//!
//! Orchestrates fetching, caching, rank merging and sorting into one
//! long-lived session object:
//! - `select_timeframe` serves cached entries immediately (stale-while-
//!   revalidate) and refreshes in the background, superseding any fetch
//!   for a different timeframe
//! - `apply_ai_ranking` folds an externally computed ranking into the
//!   active timeframe's entries without re-fetching
//! - `set_sort` reorders the view without touching cached data
//!
//! Consumers read the current `FeedSnapshot` or subscribe to the watch
//! channel; any UI layer can adapt on top of that.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::ai::RankDirection;
use crate::api::TrendingFeedSource;
use crate::error::FeedError;
use crate::feed::cache::TimeframeCache;
use crate::feed::coordinator::{FetchTicket, RequestCoordinator};
use crate::feed::{merge_ai_ranks, normalize_records, sort_entries};
use crate::models::{RawTokenRecord, SortKey, SortSpec, TimeframeKey, TokenEntry};

/// Lifecycle of the feed for the currently selected timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedState {
    /// No timeframe selected yet
    Idle,
    /// Fetch outstanding; entries may be stale cache or empty
    Loading,
    /// Data present, no outstanding fetch
    Ready,
    /// Last fetch failed and no cache exists for this timeframe
    Error,
}

/// Point-in-time view of the feed, published on every transition.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub state: FeedState,
    pub timeframe: Option<TimeframeKey>,
    /// Entries in display order (sorted per `sort`)
    pub entries: Vec<TokenEntry>,
    pub sort: SortSpec,
    /// Non-fatal: the last refresh failed but stale entries remain shown
    pub notice: Option<String>,
    /// Fatal for this timeframe: fetch failed with no cached fallback
    pub error: Option<String>,
}

impl FeedSnapshot {
    fn idle() -> Self {
        Self {
            state: FeedState::Idle,
            timeframe: None,
            entries: Vec::new(),
            sort: SortSpec::default(),
            notice: None,
            error: None,
        }
    }
}

struct ControllerState {
    timeframe: Option<TimeframeKey>,
    feed_state: FeedState,
    sort: SortSpec,
    notice: Option<String>,
    error: Option<String>,
}

struct Inner {
    source: Arc<dyn TrendingFeedSource>,
    cache: TimeframeCache,
    coordinator: RequestCoordinator,
    state: RwLock<ControllerState>,
    updates: watch::Sender<FeedSnapshot>,
}

/// One controller per dashboard session; construct at session start,
/// drop at session end.
pub struct FeedController {
    inner: Arc<Inner>,
}

impl FeedController {
    pub fn new(source: Arc<dyn TrendingFeedSource>) -> Self {
        let (updates, _) = watch::channel(FeedSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                source,
                cache: TimeframeCache::new(),
                coordinator: RequestCoordinator::new(),
                state: RwLock::new(ControllerState {
                    timeframe: None,
                    feed_state: FeedState::Idle,
                    sort: SortSpec::default(),
                    notice: None,
                    error: None,
                }),
                updates,
            }),
        }
    }

    /// Receiver that yields a fresh snapshot on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.inner.updates.borrow().clone()
    }

    /// Switch the feed to a timeframe.
    ///
    /// Cached entries for the timeframe are reflected in the published
    /// snapshot before this returns; the revalidating fetch runs in the
    /// background. A fetch outstanding for a different timeframe is
    /// cancelled; one for the same timeframe is attached to (no duplicate
    /// network call).
    pub async fn select_timeframe(&self, timeframe: TimeframeKey) {
        let inner = &self.inner;

        // The attach decision and the Loading transition are one critical
        // section: when begin() attaches to an in-flight fetch, that
        // fetch's completion must apply its terminal state after the
        // Loading write, never before it, or the feed would show Loading
        // with nothing left to resolve it.
        let ticket = {
            let mut state = inner.state.write().await;
            let ticket = inner.coordinator.begin(timeframe).await;
            state.timeframe = Some(timeframe);
            state.feed_state = FeedState::Loading;
            state.notice = None;
            state.error = None;
            ticket
        };

        if inner.cache.contains(timeframe).await {
            info!("Serving cached entries for {} while revalidating", timeframe);
        }
        inner.publish().await;

        let Some(ticket) = ticket else {
            debug!("Reusing in-flight fetch for {}", timeframe);
            return;
        };

        let task_inner = inner.clone();
        let handle = tokio::spawn(async move {
            let result = task_inner.source.fetch_trending(timeframe).await;
            task_inner.finish_fetch(ticket, result).await;
        });
        inner.coordinator.register(ticket, handle).await;
    }

    /// Merge an externally computed symbol-to-rank mapping into the
    /// timeframe it was requested against, then sort the view by AI rank.
    ///
    /// The merge is skipped (logged, non-fatal) when that timeframe is no
    /// longer active or the feed is not `Ready`; a skipped merge never
    /// touches another timeframe's cached entries.
    pub async fn apply_ai_ranking(
        &self,
        timeframe: TimeframeKey,
        ranks: &HashMap<String, u32>,
        direction: RankDirection,
    ) -> Result<(), FeedError> {
        let inner = &self.inner;
        let mut state = inner.state.write().await;

        if state.timeframe != Some(timeframe) {
            warn!(
                "AI ranking for {} arrived after the timeframe changed, skipping merge",
                timeframe
            );
            return Err(FeedError::MergeSkipped {
                timeframe,
                reason: "timeframe no longer active".to_string(),
            });
        }
        if state.feed_state != FeedState::Ready {
            warn!(
                "AI ranking for {} arrived while feed is {:?}, skipping merge",
                timeframe, state.feed_state
            );
            return Err(FeedError::MergeSkipped {
                timeframe,
                reason: format!("feed not ready ({:?})", state.feed_state),
            });
        }

        let entries = match inner.cache.get(timeframe).await {
            Some(entries) => entries,
            None => {
                return Err(FeedError::MergeSkipped {
                    timeframe,
                    reason: "no cached entries".to_string(),
                });
            }
        };

        let merged = merge_ai_ranks(&entries, ranks);
        inner.cache.update(timeframe, merged).await;
        state.sort = SortSpec {
            key: SortKey::AiRank,
            direction: direction.sort_direction(),
        };
        drop(state);

        info!("Applied AI ranking to {} ({} ranks supplied)", timeframe, ranks.len());
        inner.publish().await;
        Ok(())
    }

    /// Change the sort spec. Pure view change: no I/O, cached data is
    /// untouched.
    pub async fn set_sort(&self, sort: SortSpec) {
        let mut state = self.inner.state.write().await;
        state.sort = sort;
        drop(state);
        self.inner.publish().await;
    }

    /// Header-click convenience: same key flips direction, new key sorts
    /// ascending.
    pub async fn toggle_sort(&self, key: SortKey) {
        let mut state = self.inner.state.write().await;
        state.sort = state.sort.toggle(key);
        drop(state);
        self.inner.publish().await;
    }
}

impl Inner {
    async fn finish_fetch(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<RawTokenRecord>, FeedError>,
    ) {
        // Superseded completions must never overwrite later results
        if !self.coordinator.try_complete(ticket).await {
            return;
        }

        match result {
            Ok(raw) => {
                let entries = normalize_records(&raw, ticket.timeframe);
                info!(
                    "Fetched {} trending tokens for {} ({} raw records)",
                    entries.len(),
                    ticket.timeframe,
                    raw.len()
                );
                self.cache.put(ticket.timeframe, entries).await;

                let mut state = self.state.write().await;
                if state.timeframe == Some(ticket.timeframe) {
                    state.feed_state = FeedState::Ready;
                    state.notice = None;
                    state.error = None;
                }
                drop(state);
                self.publish().await;
            }
            Err(FeedError::FetchCancelled) => {
                debug!("Fetch for {} cancelled", ticket.timeframe);
            }
            Err(e) => {
                let message = e.to_string();
                let has_cache = self.cache.contains(ticket.timeframe).await;

                let mut state = self.state.write().await;
                if state.timeframe == Some(ticket.timeframe) {
                    if has_cache {
                        warn!(
                            "Refresh for {} failed, keeping stale entries: {}",
                            ticket.timeframe, message
                        );
                        state.feed_state = FeedState::Ready;
                        state.notice = Some(message);
                    } else {
                        error!(
                            "Fetch for {} failed with no cached fallback: {}",
                            ticket.timeframe, message
                        );
                        state.feed_state = FeedState::Error;
                        state.error = Some(message);
                    }
                }
                drop(state);
                self.publish().await;
            }
        }
    }

    /// Build and broadcast the snapshot from current state + cache.
    ///
    /// Snapshot construction and the broadcast hold the state write lock
    /// together, serializing concurrent publishers: the last broadcast
    /// always reflects the newest state, an interleaved publisher can
    /// never overwrite it with an older snapshot.
    async fn publish(&self) {
        let state = self.state.write().await;
        let entries = match state.timeframe {
            Some(timeframe) => self.cache.get(timeframe).await.unwrap_or_default(),
            None => Vec::new(),
        };
        let snapshot = FeedSnapshot {
            state: state.feed_state,
            timeframe: state.timeframe,
            entries: sort_entries(&entries, state.sort),
            sort: state.sort,
            notice: state.notice.clone(),
            error: state.error.clone(),
        };
        self.updates.send_replace(snapshot);
    }
}
