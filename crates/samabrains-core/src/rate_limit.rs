//! Per-client rate limiting over a pluggable [`CounterStore`].
//!
//! A [`RateLimiter`] pairs a store with a [`RateLimitPolicy`]. Several
//! limiters can share one store: keys are prefixed with the policy name, so
//! the general and the email limiter never see each other's counts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use samabrains_store::CounterStore;

/// How many hits a client may make per window, and what to tell it when it
/// goes over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Key namespace, e.g. `general` or `email`.
    pub name: String,
    /// Hits allowed per window.
    pub max: u32,
    /// Window length.
    pub window: Duration,
    /// Text returned to a rejected client.
    pub message: String,
}

impl RateLimitPolicy {
    /// 100 requests per minute, every route.
    #[must_use]
    pub fn general() -> Self {
        Self {
            name: "general".to_owned(),
            max: 100,
            window: Duration::from_secs(60),
            message: "Too many requests, please try again later.".to_owned(),
        }
    }

    /// 5 contact submissions per 15 minutes.
    #[must_use]
    pub fn email() -> Self {
        Self {
            name: "email".to_owned(),
            max: 5,
            window: Duration::from_secs(15 * 60),
            message: "Too many contact requests. Please try again in 15 minutes.".to_owned(),
        }
    }

    /// Same policy with a different limit and window.
    #[must_use]
    pub fn with_limit(mut self, max: u32, window: Duration) -> Self {
        self.max = max;
        self.window = window;
        self
    }
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateDecision {
    /// Seconds until the window resets, rounded up, at least 1.
    #[must_use]
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let secs = if self.reset_after.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs
        };
        secs.max(1)
    }
}

/// A rate limiter for one policy.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    policy: Arc<RateLimitPolicy>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Count a hit for `client` now.
    pub async fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now()).await
    }

    /// Count a hit for `client` at `now`.
    ///
    /// If the store fails, the hit is allowed and the failure is logged:
    /// the limiter mitigates abuse, it does not gate availability.
    pub async fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let key = format!("{}:{client}", self.policy.name);

        match self
            .store
            .hit(&key, self.policy.max, self.policy.window, now)
            .await
        {
            Ok(state) => RateDecision {
                allowed: state.accepted,
                limit: self.policy.max,
                remaining: self.policy.max.saturating_sub(state.count),
                reset_after: state.reset_after,
            },
            Err(e) => {
                tracing::error!(
                    policy = %self.policy.name,
                    error = %e,
                    "rate limit store failed, allowing request"
                );
                RateDecision {
                    allowed: true,
                    limit: self.policy.max,
                    remaining: self.policy.max,
                    reset_after: self.policy.window,
                }
            }
        }
    }
}
