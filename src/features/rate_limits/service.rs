use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::features::rate_limits::store::{RateLimitEntry, RateLimitStore};

/// Outcome of one rate-limit check. `remaining` is what is left after this
/// request was counted (zero when denied).
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub count: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Advisory per-user throttle over an injected [`RateLimitStore`].
///
/// The check itself cannot fail: storage races under concurrency may over-
/// or under-count briefly, which is tolerated.
pub struct RateLimitService {
    store: Arc<dyn RateLimitStore>,
}

impl RateLimitService {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Count this request against the user's window.
    ///
    /// A missing or expired entry starts a fresh window with count 1. An
    /// entry at or over the limit denies without mutation, so the window is
    /// never extended by rejected traffic.
    pub async fn check_and_consume(
        &self,
        user_id: &str,
        limit: u32,
        window: Duration,
    ) -> RateLimitDecision {
        let now = Utc::now();

        if let Some(entry) = self.store.get(user_id).await {
            if now < entry.reset_at {
                if entry.count >= limit {
                    return RateLimitDecision {
                        allowed: false,
                        count: entry.count,
                        remaining: 0,
                        reset_at: entry.reset_at,
                    };
                }

                // Entry may have been replaced since the read; fall back to
                // a fresh window in that case.
                if let Some(updated) = self.store.increment(user_id).await {
                    return RateLimitDecision {
                        allowed: true,
                        count: updated.count,
                        remaining: limit.saturating_sub(updated.count),
                        reset_at: updated.reset_at,
                    };
                }
            }
        }

        let entry = RateLimitEntry {
            count: 1,
            reset_at: now + window,
        };
        self.store.set(user_id, entry.clone()).await;

        RateLimitDecision {
            allowed: true,
            count: 1,
            remaining: limit.saturating_sub(1),
            reset_at: entry.reset_at,
        }
    }
}
