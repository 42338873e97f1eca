//! Time-bounded cache for market fetches.
//!
//! The fetcher only sees the [`QuoteCache`] trait, so tests can inject a
//! recording or no-op cache. [`MemoryQuoteCache`] is the in-process TTL store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::market::types::{MarketData, QuoteKey};

/// Default validity of a cached market fetch.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait QuoteCache: Send + Sync {
    /// A non-expired entry for `key`, if any.
    async fn get(&self, key: &QuoteKey) -> Option<MarketData>;
    async fn put(&self, key: QuoteKey, value: MarketData);
    async fn invalidate(&self, key: &QuoteKey);
    fn ttl(&self) -> Duration;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: MarketData,
    expires_at: Instant,
}

/// Thread-safe in-memory TTL cache. A zero TTL disables it.
#[derive(Debug, Clone)]
pub struct MemoryQuoteCache {
    inner: Arc<tokio::sync::RwLock<HashMap<QuoteKey, CacheEntry>>>,
    ttl: Duration,
}

impl MemoryQuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner.write().await.retain(|_, e| e.expires_at > now);
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryQuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTE_TTL)
    }
}

#[async_trait]
impl QuoteCache for MemoryQuoteCache {
    async fn get(&self, key: &QuoteKey) -> Option<MarketData> {
        let map = self.inner.read().await;
        map.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    async fn put(&self, key: QuoteKey, value: MarketData) {
        if self.ttl == Duration::ZERO {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        self.inner
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    async fn invalidate(&self, key: &QuoteKey) {
        self.inner.write().await.remove(key);
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
