//! # Sentiment Desk
//! Orchestrates one run: market fetch (cached), news fetch, scoring, labels.
//!
//! Ordering: the headline batch is fully fetched before scoring starts.
//! Market and news are independent; `briefing()` runs them concurrently and
//! reports each side's error on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::label::{Outlook, SentimentLabel};
use crate::lexicon::{Currency, Lexicon};
use crate::market::{
    MarketData, MemoryQuoteCache, QuoteFetcher, QuoteRequest, YahooChartProvider,
};
use crate::news::{HeadlineBatch, NewsFetcher};
use crate::scoring::{batch_text, score_with_evidence, ScoreBoard};

#[derive(Debug, Clone, PartialEq)]
pub struct DeskSettings {
    pub request: QuoteRequest,
    pub feed_url: String,
    pub max_headlines: usize,
}

impl From<&AppConfig> for DeskSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            request: cfg.market.quote_request(),
            feed_url: cfg.news.feed_url.clone(),
            max_headlines: cfg.news.max_headlines,
        }
    }
}

/// Score, label and outlook of one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyView {
    pub currency: Currency,
    pub score: i32,
    pub label: SentimentLabel,
    pub outlook: Outlook,
}

/// Scored headline batch with explainability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub generated_at: DateTime<Utc>,
    /// Short fingerprint of the normalized batch (raw text is never logged).
    pub batch_id: String,
    pub headlines: HeadlineBatch,
    pub scores: ScoreBoard,
    pub labels: BTreeMap<Currency, SentimentLabel>,
    /// Lexicon phrases that matched, in lexicon order.
    pub matched: Vec<String>,
}

impl SentimentReport {
    pub fn from_batch(headlines: HeadlineBatch, lexicon: &Lexicon) -> Self {
        let (scores, matched) = score_with_evidence(&headlines, lexicon);
        let batch_id = fingerprint(&batch_text(&headlines));
        tracing::info!(
            target: "desk",
            batch = %batch_id,
            headlines = headlines.len(),
            matched = matched.len(),
            "scored headline batch"
        );
        Self {
            generated_at: Utc::now(),
            batch_id,
            labels: scores.labels(),
            scores,
            headlines,
            matched,
        }
    }

    pub fn currencies(&self) -> Vec<CurrencyView> {
        self.scores
            .iter()
            .map(|(currency, score)| {
                let label = self.labels[&currency];
                CurrencyView {
                    currency,
                    score,
                    label,
                    outlook: label.outlook(),
                }
            })
            .collect()
    }
}

/// User-visible error shape shared by the desk and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl From<&FetchError> for ErrorBody {
    fn from(e: &FetchError) -> Self {
        Self {
            error: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Either a value or the error that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Section<T> {
    Ok { data: T },
    Error(ErrorBody),
}

impl<T> From<Result<T, FetchError>> for Section<T> {
    fn from(r: Result<T, FetchError>) -> Self {
        match r {
            Ok(data) => Section::Ok { data },
            Err(e) => Section::Error(ErrorBody::from(&e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Briefing {
    pub market: Section<MarketData>,
    pub sentiment: Section<SentimentReport>,
}

pub struct SentimentDesk {
    quotes: QuoteFetcher,
    news: NewsFetcher,
    lexicon: Arc<Lexicon>,
    settings: DeskSettings,
}

impl SentimentDesk {
    pub fn new(
        quotes: QuoteFetcher,
        news: NewsFetcher,
        lexicon: Arc<Lexicon>,
        settings: DeskSettings,
    ) -> Self {
        Self {
            quotes,
            news,
            lexicon,
            settings,
        }
    }

    /// Production wiring: Yahoo chart provider, in-memory TTL cache, HTTP feed.
    pub fn from_config(cfg: &AppConfig, lexicon: Arc<Lexicon>) -> anyhow::Result<Self> {
        let provider = YahooChartProvider::new(cfg.market.timeout_secs)?
            .with_base_url(cfg.market.base_url.clone());
        let cache = MemoryQuoteCache::new(cfg.market.cache_ttl());
        let quotes = QuoteFetcher::new(
            Arc::new(provider),
            Arc::new(cache),
            cfg.market.cross_rate.clone(),
        );
        let news = NewsFetcher::http(cfg.news.timeout_secs)?;
        Ok(Self::new(quotes, news, lexicon, DeskSettings::from(cfg)))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    pub async fn market(&self) -> Result<MarketData, FetchError> {
        self.quotes.fetch_quotes(&self.settings.request).await
    }

    pub async fn refresh_market(&self) -> Result<MarketData, FetchError> {
        self.quotes.refresh_quotes(&self.settings.request).await
    }

    /// Fetch the configured feed, then score and label it.
    pub async fn sentiment(&self) -> Result<SentimentReport, FetchError> {
        let batch = self
            .news
            .fetch_news(&self.settings.feed_url, self.settings.max_headlines)
            .await?;
        Ok(SentimentReport::from_batch(batch, &self.lexicon))
    }

    /// Score caller-supplied headlines; no fetch involved.
    ///
    /// Bounded like a fetched batch: only the first `max_headlines` are kept.
    pub fn score_headlines<I, S>(&self, texts: I) -> SentimentReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let batch =
            HeadlineBatch::from_texts(texts.into_iter().take(self.settings.max_headlines));
        SentimentReport::from_batch(batch, &self.lexicon)
    }

    pub async fn briefing(&self) -> Briefing {
        let (market, sentiment) = tokio::join!(self.market(), self.sentiment());
        Briefing {
            market: market.into(),
            sentiment: sentiment.into(),
        }
    }
}

/// First 6 bytes of SHA-256, hex.
pub(crate) fn fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::RawEntry;

    #[test]
    fn fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("boj exit"), fingerprint("boj exit"));
        assert_ne!(fingerprint("boj exit"), fingerprint("boj hike"));
        assert_eq!(fingerprint("").len(), 12);
    }

    #[test]
    fn report_carries_labels_and_views() {
        let lex = Lexicon::new(vec![RawEntry::new("fed hawkish", &[Currency::Usd], 6)]).unwrap();
        let r = SentimentReport::from_batch(HeadlineBatch::from_texts(["Fed hawkish tilt"]), &lex);
        assert_eq!(r.labels[&Currency::Usd], SentimentLabel::StronglyBullish);
        let usd = r
            .currencies()
            .into_iter()
            .find(|v| v.currency == Currency::Usd)
            .unwrap();
        assert_eq!(usd.score, 6);
        assert_eq!(usd.outlook, Outlook::Bullish);
        assert_eq!(r.matched, vec!["fed hawkish"]);
    }

    #[test]
    fn section_serializes_errors() {
        let s: Section<u32> = Err(FetchError::FeedUnreachable("down".into())).into();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["error"], "feed_unreachable");
    }
}
