//! In-memory counter store.
//!
//! Each key keeps a log of its accepted hit times in a `HashMap` behind a
//! `Mutex`. A log never holds more than `limit` entries. Nothing is persisted
//! and nothing is shared between processes: restarting the server resets
//! every client's window. Logs whose hits have all expired are pruned on the
//! write path once the map grows past a bound, so no background task is needed.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::{CounterStore, StoreError, WindowState};

/// Number of tracked keys above which elapsed windows are pruned.
const DEFAULT_PRUNE_THRESHOLD: usize = 10_000;

/// Accepted hit times for one key, oldest first.
#[derive(Debug, Clone, Default)]
struct HitLog {
    hits: VecDeque<Instant>,
}

impl HitLog {
    /// Drop hits that fell out of the trailing `window` ending at `now`.
    fn expire(&mut self, window: Duration, now: Instant) {
        while self
            .hits
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= window)
        {
            self.hits.pop_front();
        }
    }

    fn is_stale(&self, window: Duration, now: Instant) -> bool {
        self.hits
            .back()
            .is_none_or(|&at| now.saturating_duration_since(at) >= window)
    }

    /// Time until the oldest hit leaves the window.
    fn reset_after(&self, window: Duration, now: Instant) -> Duration {
        self.hits.front().map_or(window, |&oldest| {
            window.saturating_sub(now.saturating_duration_since(oldest))
        })
    }

    fn count(&self) -> u32 {
        u32::try_from(self.hits.len()).unwrap_or(u32::MAX)
    }
}

/// An in-memory counter store.
///
/// Cloning is cheap and clones share the same counters.
///
/// # Examples
///
/// ```
/// # use std::time::{Duration, Instant};
/// # use samabrains_store::{CounterStore, MemoryStore};
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let now = Instant::now();
/// let state = store.hit("email:192.0.2.1", 5, Duration::from_secs(900), now).await.unwrap();
/// assert!(state.accepted);
/// assert_eq!(state.count, 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    windows: Arc<Mutex<HashMap<String, HitLog>>>,
    prune_threshold: usize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }

    /// Create an empty store that prunes expired logs once more than
    /// `prune_threshold` keys are tracked.
    #[must_use]
    pub fn with_prune_threshold(prune_threshold: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            prune_threshold,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CounterStore for MemoryStore {
    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> Result<WindowState, StoreError> {
        if window.is_zero() {
            return Err(StoreError::InvalidWindow {
                key: key.to_owned(),
            });
        }

        let mut windows = self.windows.lock().await;

        if windows.len() > self.prune_threshold {
            let before = windows.len();
            windows.retain(|_, log| !log.is_stale(window, now));
            tracing::debug!(
                pruned = before.saturating_sub(windows.len()),
                remaining = windows.len(),
                "pruned expired rate windows"
            );
        }

        let log = windows.entry(key.to_owned()).or_default();
        log.expire(window, now);

        let accepted = log.count() < limit;
        if accepted {
            log.hits.push_back(now);
        }

        Ok(WindowState {
            count: log.count(),
            accepted,
            reset_after: log.reset_after(window, now),
        })
    }

    async fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.windows.lock().await.remove(key);
        Ok(())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.windows.lock().await.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn first_hit_creates_window() {
        let store = MemoryStore::new();
        let state = store.hit("a", 3, MINUTE, Instant::now()).await.unwrap();
        assert!(state.accepted);
        assert_eq!(state.count, 1);
        assert_eq!(state.reset_after, MINUTE);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn hits_over_limit_are_rejected_and_not_counted() {
        let store = MemoryStore::new();
        let now = Instant::now();
        for expected in 1..=3 {
            let state = store.hit("a", 3, MINUTE, now).await.unwrap();
            assert!(state.accepted);
            assert_eq!(state.count, expected);
        }

        for _ in 0..5 {
            let state = store.hit("a", 3, MINUTE, now).await.unwrap();
            assert!(!state.accepted);
            assert_eq!(state.count, 3);
        }
    }

    #[tokio::test]
    async fn hits_expire_one_at_a_time() {
        let store = MemoryStore::new();
        let start = Instant::now();
        store.hit("a", 2, MINUTE, start).await.unwrap();
        store
            .hit("a", 2, MINUTE, start + Duration::from_secs(30))
            .await
            .unwrap();

        let blocked = store
            .hit("a", 2, MINUTE, start + Duration::from_secs(59))
            .await
            .unwrap();
        assert!(!blocked.accepted);
        assert_eq!(blocked.reset_after, Duration::from_secs(1));

        // Only the first hit has left the window; the one at 30s still counts.
        let freed = store.hit("a", 2, MINUTE, start + MINUTE).await.unwrap();
        assert!(freed.accepted);
        assert_eq!(freed.count, 2);
        assert_eq!(freed.reset_after, Duration::from_secs(30));

        let again = store
            .hit("a", 2, MINUTE, start + Duration::from_secs(61))
            .await
            .unwrap();
        assert!(!again.accepted);
    }

    #[tokio::test]
    async fn burst_across_window_boundary_is_capped() {
        let store = MemoryStore::new();
        let window = Duration::from_secs(900);
        let start = Instant::now();

        let mut schedule = vec![0u64];
        schedule.extend([899; 4]);
        schedule.extend([900; 5]);

        let mut accepted_at = Vec::new();
        for secs in schedule {
            let state = store
                .hit("email:a", 5, window, start + Duration::from_secs(secs))
                .await
                .unwrap();
            if state.accepted {
                accepted_at.push(secs);
            }
        }

        // Any trailing 900s interval may hold at most five accepted hits.
        let in_last_window = accepted_at.iter().filter(|&&s| s > 0).count();
        assert!(in_last_window <= 5, "accepted at {accepted_at:?}");
        assert_eq!(accepted_at, vec![0, 899, 899, 899, 899, 900]);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.hit("a", 1, MINUTE, now).await.unwrap();
        let other = store.hit("b", 1, MINUTE, now).await.unwrap();
        assert!(other.accepted);
    }

    #[tokio::test]
    async fn zero_window_is_rejected() {
        let store = MemoryStore::new();
        let result = store.hit("a", 1, Duration::ZERO, Instant::now()).await;
        assert!(matches!(result, Err(StoreError::InvalidWindow { .. })));
    }

    #[tokio::test]
    async fn clear_forgets_key() {
        let store = MemoryStore::new();
        let now = Instant::now();
        store.hit("a", 1, MINUTE, now).await.unwrap();
        store.clear("a").await.unwrap();
        store.clear("missing").await.unwrap();
        assert!(store.is_empty().await.unwrap());
        assert!(store.hit("a", 1, MINUTE, now).await.unwrap().accepted);
    }

    #[tokio::test]
    async fn expired_logs_are_pruned_past_threshold() {
        let store = MemoryStore::with_prune_threshold(2);
        let start = Instant::now();
        for key in ["a", "b", "c"] {
            store.hit(key, 1, MINUTE, start).await.unwrap();
        }
        assert_eq!(store.len().await.unwrap(), 3);

        store.hit("d", 1, MINUTE, start + MINUTE).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clones_share_counters() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let now = Instant::now();
        store.hit("a", 1, MINUTE, now).await.unwrap();
        assert!(!clone.hit("a", 1, MINUTE, now).await.unwrap().accepted);
    }
}
