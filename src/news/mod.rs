// src/news/mod.rs
//! News fetcher: one feed URL in, a bounded feed-ordered headline batch out.

pub mod http;
pub mod rss;
pub mod types;

pub use crate::news::http::HttpFeedTransport;
pub use crate::news::types::{FeedTransport, Headline, HeadlineBatch};

use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::sync::Arc;

use crate::error::FetchError;

/// Default source: Yahoo Finance RSS index.
pub const DEFAULT_FEED_URL: &str = "https://finance.yahoo.com/news/rssindex";
pub const DEFAULT_MAX_HEADLINES: usize = 6;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_fetch_total", "News feed fetch attempts.");
        describe_counter!(
            "news_fetch_errors_total",
            "News feed transport/parse errors."
        );
        describe_counter!("news_headlines_total", "Headlines kept after parsing.");
        describe_histogram!("news_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Longest headline kept; anything past it is feed garbage.
const MAX_HEADLINE_CHARS: usize = 500;

// Only `<tag ...>` / `</tag>` shapes. A bare `<` or `>` in a title
// ("USD/JPY > 150") is text and must reach the scorer.
static RE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("static tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static ws regex"));

/// Turn a feed title into scorable headline text.
///
/// Feeds double-escape entities and leak inline markup into titles, so this
/// decodes what is left, drops tags, folds typographic quotes to ASCII and
/// collapses whitespace. Trailing `.`, `,`, `;` and `:` go; `?` and `!` stay
/// since they change how a headline reads ("Recession?").
pub fn clean_headline(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let untagged = RE_TAG.replace_all(&decoded, " ");
    let quoted: String = untagged
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    let collapsed = RE_WS.replace_all(&quoted, " ");
    let trimmed = collapsed
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .trim_end();

    trimmed.chars().take(MAX_HEADLINE_CHARS).collect()
}

/// Fetches a single feed and parses it into a [`HeadlineBatch`].
///
/// Idempotent and stateless; no caching here.
#[derive(Clone)]
pub struct NewsFetcher {
    transport: Arc<dyn FeedTransport>,
}

impl NewsFetcher {
    pub fn new(transport: Arc<dyn FeedTransport>) -> Self {
        Self { transport }
    }

    /// Production fetcher over HTTP.
    pub fn http(timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(HttpFeedTransport::new(timeout_secs)?)))
    }

    /// At most `max_count` headlines in feed order.
    ///
    /// Transport or parse failure → `FeedUnreachable`; an empty feed is an empty batch.
    pub async fn fetch_news(
        &self,
        source_url: &str,
        max_count: usize,
    ) -> Result<HeadlineBatch, FetchError> {
        ensure_metrics_described();
        counter!("news_fetch_total").increment(1);

        let body = match self.transport.get(source_url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(target: "news", error = ?e, transport = self.transport.name(), url = source_url, "feed fetch failed");
                counter!("news_fetch_errors_total").increment(1);
                return Err(FetchError::FeedUnreachable(format!("{source_url}: {e:#}")));
            }
        };

        let batch = match rss::parse_headlines(&body, max_count) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(target: "news", error = ?e, url = source_url, "feed parse failed");
                counter!("news_fetch_errors_total").increment(1);
                return Err(FetchError::FeedUnreachable(format!("{source_url}: {e:#}")));
            }
        };

        counter!("news_headlines_total").increment(batch.len() as u64);
        tracing::info!(target: "news", url = source_url, headlines = batch.len(), "feed fetched");
        Ok(batch)
    }
}
