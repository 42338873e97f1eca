// src/market/mod.rs
//! Market data fetcher: per-symbol series from a provider, one derived
//! cross-rate, and a TTL cache in front of the whole thing.
//!
//! Concurrency: cache hits are served under a read lock. Misses take a
//! single refresh mutex and re-check the cache, so callers racing on the same
//! key within the TTL share one upstream fetch.

pub mod cache;
pub mod types;
pub mod yahoo;

pub use crate::market::cache::{MemoryQuoteCache, QuoteCache, DEFAULT_QUOTE_TTL};
pub use crate::market::types::{
    CrossRate, CrossRateSpec, Interval, LookbackWindow, MarketData, MarketDataProvider,
    PricePoint, PriceSeries, QuoteKey, QuoteRequest, QuoteSnapshot,
};
pub use crate::market::yahoo::YahooChartProvider;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::FetchError;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("quote_cache_hits_total", "Market fetches served from cache.");
        describe_counter!(
            "quote_cache_misses_total",
            "Market fetches that went upstream."
        );
        describe_counter!(
            "quote_provider_errors_total",
            "Per-symbol provider fetch/parse errors."
        );
        describe_histogram!("quote_parse_ms", "Chart parse time in milliseconds.");
        describe_gauge!("quote_cache_ttl_secs", "Configured market cache TTL.");
    });
}

pub struct QuoteFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: Arc<dyn QuoteCache>,
    cross: CrossRateSpec,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl QuoteFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Arc<dyn QuoteCache>,
        cross: CrossRateSpec,
    ) -> Self {
        Self {
            provider,
            cache,
            cross,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn cross_rate_spec(&self) -> &CrossRateSpec {
        &self.cross
    }

    /// Cached fetch. Within the cache TTL identical requests return the same
    /// `MarketData` without touching the provider. Failures are not cached.
    pub async fn fetch_quotes(&self, req: &QuoteRequest) -> Result<MarketData, FetchError> {
        ensure_metrics_described();
        let key = req.key();

        if let Some(hit) = self.cache.get(&key).await {
            counter!("quote_cache_hits_total").increment(1);
            tracing::debug!(target: "market", key = %key, "quote cache hit");
            return Ok(hit);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(hit) = self.cache.get(&key).await {
            counter!("quote_cache_hits_total").increment(1);
            return Ok(hit);
        }

        counter!("quote_cache_misses_total").increment(1);
        let data = self.fetch_uncached(&key).await?;
        self.cache.put(key, data.clone()).await;
        Ok(data)
    }

    /// Drop the cached entry for `req` and fetch again.
    pub async fn refresh_quotes(&self, req: &QuoteRequest) -> Result<MarketData, FetchError> {
        self.cache.invalidate(&req.key()).await;
        self.fetch_quotes(req).await
    }

    async fn fetch_uncached(&self, key: &QuoteKey) -> Result<MarketData, FetchError> {
        if key.symbols.is_empty() {
            return Err(FetchError::DataUnavailable("no symbols requested".into()));
        }

        let mut series = BTreeMap::new();
        let mut gaps = Vec::new();
        for symbol in &key.symbols {
            match self
                .provider
                .fetch_series(symbol, key.window, key.interval)
                .await
            {
                Ok(s) if !s.is_empty() => {
                    series.insert(symbol.clone(), s);
                }
                Ok(_) => {
                    tracing::warn!(target: "market", symbol = %symbol, provider = self.provider.name(), "provider returned no data");
                    gaps.push(symbol.clone());
                }
                Err(e) => {
                    tracing::warn!(target: "market", error = ?e, symbol = %symbol, provider = self.provider.name(), "provider error");
                    counter!("quote_provider_errors_total").increment(1);
                    gaps.push(symbol.clone());
                }
            }
        }

        if series.is_empty() {
            return Err(FetchError::DataUnavailable(format!(
                "no data for any of {}",
                key.symbols.join(", ")
            )));
        }

        let snapshot = QuoteSnapshot::build(&series, &self.cross)?;
        if gaps.is_empty() {
            tracing::info!(target: "market", key = %key, "market data refreshed");
        } else {
            tracing::warn!(target: "market", key = %key, missing = ?gaps, "partial market data");
        }

        Ok(MarketData {
            series,
            snapshot,
            gaps,
            fetched_at: chrono::Utc::now(),
        })
    }
}
