// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::market::{CrossRateSpec, Interval, LookbackWindow, QuoteRequest};
use crate::news::{DEFAULT_FEED_URL, DEFAULT_MAX_HEADLINES};

pub const ENV_CONFIG_PATH: &str = "FX_SENTIMENT_CONFIG";
pub const ENV_NEWS_URL: &str = "FX_NEWS_URL";
pub const ENV_BIND_ADDR: &str = "FX_BIND_ADDR";
pub const ENV_LEXICON_PATH: &str = "FX_LEXICON_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

fn default_symbols() -> Vec<String> {
    vec!["CNY=X".to_string(), "JPY=X".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub symbols: Vec<String>,
    pub window: LookbackWindow,
    pub interval: Interval,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
    pub base_url: String,
    pub cross_rate: CrossRateSpec,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            window: LookbackWindow::OneMonth,
            interval: Interval::Daily,
            cache_ttl_secs: 3600,
            timeout_secs: 10,
            base_url: crate::market::yahoo::DEFAULT_CHART_BASE_URL.to_string(),
            cross_rate: CrossRateSpec::default(),
        }
    }
}

impl MarketConfig {
    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest::new(self.symbols.iter().cloned(), self.window, self.interval)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub feed_url: String,
    pub max_headlines: usize,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            max_headlines: DEFAULT_MAX_HEADLINES,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// JSON/TOML rule file; the built-in table is used when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub lexicon: LexiconConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from an explicit TOML file, then sanitize.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Resolve the config file, then apply env overrides:
    /// 1) $FX_SENTIMENT_CONFIG (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                Self::default()
            }
        };
        Ok(cfg.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_NEWS_URL) {
            self.news.feed_url = url;
        }
        if let Some(bind) = non_empty_env(ENV_BIND_ADDR) {
            self.server.bind = bind;
        }
        if let Some(p) = non_empty_env(ENV_LEXICON_PATH) {
            self.lexicon.path = Some(PathBuf::from(p));
        }
        self
    }

    /// Repair values that would make every fetch fail.
    fn sanitized(mut self) -> Self {
        let mut symbols: Vec<String> = Vec::new();
        for s in self.market.symbols.drain(..) {
            let t = s.trim();
            if !t.is_empty() && !symbols.iter().any(|x| x == t) {
                symbols.push(t.to_string());
            }
        }
        if symbols.is_empty() {
            symbols = default_symbols();
        }
        // Both cross-rate legs must be fetched.
        for leg in [
            self.market.cross_rate.numerator.clone(),
            self.market.cross_rate.denominator.clone(),
        ] {
            if !symbols.contains(&leg) {
                tracing::warn!(target: "config", symbol = %leg, "cross-rate leg not in symbols; adding it");
                symbols.push(leg);
            }
        }
        self.market.symbols = symbols;

        if self.news.max_headlines == 0 {
            self.news.max_headlines = DEFAULT_MAX_HEADLINES;
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
