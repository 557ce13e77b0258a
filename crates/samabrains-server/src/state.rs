//! Shared application state for the Axum server.
//!
//! All handlers and middleware receive an `Arc<AppState>` through Axum's
//! state extraction. The counter store is the only mutable piece, and it
//! lives behind the limiters.

use std::sync::Arc;

use samabrains_core::origin::OriginGuard;
use samabrains_core::rate_limit::RateLimiter;
use samabrains_core::relay::{EmailRelay, MailTransport};
use samabrains_store::CounterStore;

use crate::config::ServerConfig;

/// Application state shared across all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// Relays validated submissions upstream.
    pub relay: EmailRelay,
    /// Decides which browser origins may call `/api/*`.
    pub origin_guard: OriginGuard,
    /// Limit on every request.
    pub general_limiter: RateLimiter,
    /// Limit on contact submissions.
    pub email_limiter: RateLimiter,
    /// Whether client IPs come from forwarding headers.
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire the state from configuration, an upstream transport and a
    /// counter store shared by both limiters.
    #[must_use]
    pub fn new(
        config: &ServerConfig,
        transport: Arc<dyn MailTransport>,
        store: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            relay: EmailRelay::new(transport, config.relay_config()),
            origin_guard: config.origin_guard(),
            general_limiter: RateLimiter::new(Arc::clone(&store), config.general_limit.clone()),
            email_limiter: RateLimiter::new(store, config.email_limit.clone()),
            trust_proxy: config.trust_proxy,
        }
    }
}
