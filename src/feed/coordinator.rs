//! Request Coordinator
//!
//! At most one trending fetch is outstanding at any time. Switching
//! timeframe supersedes the outstanding request: its task is aborted
//! (dropping the in-flight HTTP future) and its generation is retired so a
//! completion that already left the transport can never write state.
//! Re-requesting the timeframe that is already in flight attaches to the
//! existing request instead of spawning a duplicate call.

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::TimeframeKey;

/// Identity of one issued fetch. A completion may only be applied while
/// its ticket is still the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub timeframe: TimeframeKey,
}

struct InFlight {
    generation: u64,
    timeframe: TimeframeKey,
    handle: Option<JoinHandle<()>>,
}

struct CoordinatorState {
    next_generation: u64,
    in_flight: Option<InFlight>,
}

pub struct RequestCoordinator {
    state: Mutex<CoordinatorState>,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                next_generation: 0,
                in_flight: None,
            }),
        }
    }

    /// Claim the in-flight slot for a timeframe.
    ///
    /// Returns `None` when a request for the same timeframe is already
    /// outstanding (attach policy: the caller observes the existing
    /// request). A request for a different timeframe is cancelled first;
    /// its generation is retired before the abort so the ordering guarantee
    /// holds even if its completion races the abort.
    pub async fn begin(&self, timeframe: TimeframeKey) -> Option<FetchTicket> {
        let mut state = self.state.lock().await;

        if let Some(in_flight) = &state.in_flight {
            if in_flight.timeframe == timeframe {
                debug!(
                    "Fetch for {} already in flight (generation {}), attaching",
                    timeframe, in_flight.generation
                );
                return None;
            }
        }

        if let Some(old) = state.in_flight.take() {
            debug!(
                "Superseding fetch for {} (generation {}) with {}",
                old.timeframe, old.generation, timeframe
            );
            if let Some(handle) = old.handle {
                handle.abort();
            }
        }

        state.next_generation += 1;
        let ticket = FetchTicket {
            generation: state.next_generation,
            timeframe,
        };
        state.in_flight = Some(InFlight {
            generation: ticket.generation,
            timeframe,
            handle: None,
        });
        Some(ticket)
    }

    /// Attach the spawned task handle to its ticket so a later supersede
    /// can abort it. A handle whose ticket is already stale is aborted on
    /// the spot.
    pub async fn register(&self, ticket: FetchTicket, handle: JoinHandle<()>) {
        let mut state = self.state.lock().await;
        match &mut state.in_flight {
            Some(in_flight) if in_flight.generation == ticket.generation => {
                in_flight.handle = Some(handle);
            }
            _ => handle.abort(),
        }
    }

    /// Retire the ticket if it is still current.
    ///
    /// Returns true when the completion may be applied; false means the
    /// request was superseded and its result must be ignored.
    pub async fn try_complete(&self, ticket: FetchTicket) -> bool {
        let mut state = self.state.lock().await;
        match &state.in_flight {
            Some(in_flight) if in_flight.generation == ticket.generation => {
                state.in_flight = None;
                true
            }
            _ => {
                debug!(
                    "Ignoring stale completion for {} (generation {})",
                    ticket.timeframe, ticket.generation
                );
                false
            }
        }
    }

    /// Timeframe of the outstanding request, if any.
    pub async fn outstanding(&self) -> Option<TimeframeKey> {
        let state = self.state.lock().await;
        state.in_flight.as_ref().map(|f| f.timeframe)
    }
}

impl Default for RequestCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_begin_and_complete() {
        let coordinator = RequestCoordinator::new();

        let ticket = coordinator.begin(TimeframeKey::M5).await.unwrap();
        assert_eq!(coordinator.outstanding().await, Some(TimeframeKey::M5));

        assert!(coordinator.try_complete(ticket).await);
        assert_eq!(coordinator.outstanding().await, None);

        // Double completion is ignored
        assert!(!coordinator.try_complete(ticket).await);
    }

    #[tokio::test]
    async fn test_same_timeframe_attaches() {
        let coordinator = RequestCoordinator::new();

        let ticket = coordinator.begin(TimeframeKey::M5).await.unwrap();
        assert!(coordinator.begin(TimeframeKey::M5).await.is_none());

        // The original ticket is still the one that completes
        assert!(coordinator.try_complete(ticket).await);
    }

    #[tokio::test]
    async fn test_supersede_retires_old_generation() {
        let coordinator = RequestCoordinator::new();

        let old = coordinator.begin(TimeframeKey::M5).await.unwrap();
        let new = coordinator.begin(TimeframeKey::H1).await.unwrap();
        assert!(new.generation > old.generation);

        // The superseded completion must never be applied
        assert!(!coordinator.try_complete(old).await);
        assert!(coordinator.try_complete(new).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supersede_aborts_registered_task() {
        let coordinator = RequestCoordinator::new();
        let completed = Arc::new(AtomicBool::new(false));

        let ticket = coordinator.begin(TimeframeKey::M5).await.unwrap();
        let flag = completed.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
        });
        coordinator.register(ticket, handle).await;

        coordinator.begin(TimeframeKey::H1).await.unwrap();

        // Give the aborted task every chance to run; it must not complete
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_register_stale_ticket_aborts_handle() {
        let coordinator = RequestCoordinator::new();

        let stale = coordinator.begin(TimeframeKey::M5).await.unwrap();
        coordinator.begin(TimeframeKey::H1).await.unwrap();

        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        coordinator.register(stale, handle).await;

        // The handle was aborted immediately; outstanding is still 1h
        assert_eq!(coordinator.outstanding().await, Some(TimeframeKey::H1));
    }
}
