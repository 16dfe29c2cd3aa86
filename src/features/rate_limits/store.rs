use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Counter state for one user within the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Storage behind the rate limiter. The service only needs get/set/
/// increment, so a shared external store (e.g. Redis) can replace the
/// in-memory map without touching handler logic.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<RateLimitEntry>;

    async fn set(&self, key: &str, entry: RateLimitEntry);

    /// Increment an existing entry, returning the updated state, or `None`
    /// when no entry exists for the key.
    async fn increment(&self, key: &str) -> Option<RateLimitEntry>;
}

/// In-memory store. Process-local and non-durable: counters reset on
/// restart and are not shared across server instances. Concurrent requests
/// for one user may race between get and increment; the resulting
/// approximate counting is acceptable for advisory throttling.
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    entries: RwLock<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, entry: RateLimitEntry) {
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn increment(&self, key: &str) -> Option<RateLimitEntry> {
        let mut entries = self.entries.write().await;
        entries.get_mut(key).map(|entry| {
            entry.count = entry.count.saturating_add(1);
            entry.clone()
        })
    }
}
