//! Single-slot freshness cache for the latest snapshot.
//!
//! Two states: empty (process start) and populated with the snapshot and the
//! instant it was fetched. The slot is replaced wholesale on every miss and
//! never partially mutated.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use copilot_core::{Recorder, Snapshot};

/// Default time-to-live: four hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// The populated state.
struct CacheEntry {
    snapshot: Arc<Snapshot>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        // A caller that waited on the lock may carry a `now` older than
        // `fetched_at`; saturating keeps that a hit.
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// TTL-gated holder of the most recent snapshot.
pub struct FreshnessCache {
    slot: Mutex<Option<CacheEntry>>,
    recorder: Arc<dyn Recorder>,
}

impl FreshnessCache {
    pub fn new(recorder: Arc<dyn Recorder>) -> Self {
        Self {
            slot: Mutex::new(None),
            recorder,
        }
    }

    /// Return the cached snapshot if younger than `ttl`, otherwise run
    /// `fetch_fn`, store its result stamped with `now`, and return it.
    ///
    /// The check-fetch-store sequence runs under the slot lock. An error
    /// from `fetch_fn` is returned as-is and leaves the slot unchanged.
    /// `ttl` of zero refreshes on every call.
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        now: Instant,
        ttl: Duration,
        fetch_fn: F,
    ) -> Result<Arc<Snapshot>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Snapshot, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh(now, ttl) {
                self.recorder.cache_hit();
                debug!(
                    age_secs = now.saturating_duration_since(entry.fetched_at).as_secs(),
                    "returning Copilot metrics from cache"
                );
                return Ok(Arc::clone(&entry.snapshot));
            }
        }

        self.recorder.cache_miss();
        debug!(populated = slot.is_some(), "cache miss, fetching");

        let snapshot = Arc::new(fetch_fn().await?);
        *slot = Some(CacheEntry {
            snapshot: Arc::clone(&snapshot),
            fetched_at: now,
        });
        Ok(snapshot)
    }

    /// When the slot was last filled, if ever.
    pub async fn fetched_at(&self) -> Option<Instant> {
        self.slot.lock().await.as_ref().map(|e| e.fetched_at)
    }
}
