//! Counter store abstraction for the contact relay.
//!
//! This crate defines the [`CounterStore`] trait: a per-key sliding-window hit
//! counter that knows nothing about HTTP, clients, or email. The rate limiter
//! in `samabrains-core` namespaces its keys and decides what a rejection
//! means; this layer only counts.
//!
//! One implementation is provided:
//!
//! - [`MemoryStore`]: in-process, lost on restart, not shared between
//!   processes. A multi-process deployment plugs in a shared store behind
//!   the same trait.

mod error;
mod memory;

use std::time::{Duration, Instant};

pub use error::StoreError;
pub use memory::MemoryStore;

/// Snapshot of one key's window after a [`CounterStore::hit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// Hits counted in the trailing window, including this one if it was accepted.
    pub count: u32,
    /// Whether this hit fit under the limit and was counted.
    pub accepted: bool,
    /// Time until the oldest counted hit leaves the window.
    pub reset_after: Duration,
}

/// A pluggable store of sliding-window hit counters.
///
/// Keys are opaque UTF-8 strings (e.g. `email:203.0.113.7`). Implementations
/// must be safe to share across async tasks (`Send + Sync`) and must make
/// the check-and-increment in [`hit`](CounterStore::hit) atomic per key.
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync + 'static {
    /// Record a hit for `key` at `now`.
    ///
    /// Only hits recorded less than `window` before `now` are counted. The
    /// hit is counted only while that count is below `limit`; a hit over the
    /// limit leaves the count untouched and reports `accepted: false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing store cannot be
    /// reached, or [`StoreError::InvalidWindow`] for a zero-length window.
    async fn hit(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> Result<WindowState, StoreError>;

    /// Forget everything recorded for `key`. Clearing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing store cannot be reached.
    async fn clear(&self, key: &str) -> Result<(), StoreError>;

    /// Number of keys currently tracked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing store cannot be reached.
    async fn len(&self) -> Result<usize, StoreError>;

    /// Whether no keys are tracked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backing store cannot be reached.
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}
