// tests/e2e_briefing.rs
//
// Full desk run with in-memory upstreams: quotes + a ten-headline feed
// through the built-in lexicon, ending in labels and a briefing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use fx_sentiment::desk::{DeskSettings, SentimentDesk};
use fx_sentiment::label::Outlook;
use fx_sentiment::market::{
    CrossRateSpec, Interval, LookbackWindow, MarketDataProvider, MemoryQuoteCache, PriceSeries,
    QuoteFetcher, QuoteRequest,
};
use fx_sentiment::news::{FeedTransport, NewsFetcher};
use fx_sentiment::{Currency, Lexicon, SentimentLabel};

const HEADLINES: [&str; 10] = [
    "BOJ exit speculation builds ahead of policy meeting",
    "China stimulus package targets consumer spending",
    "Oil prices edge lower on demand worries",
    "Tech shares mixed as earnings season winds down",
    "Gold holds near record high",
    "European stocks open flat",
    "Airline shares climb on travel demand",
    "Copper slips from two-year peak",
    "Retail sales data due Thursday",
    "Bitcoin steadies after volatile week",
];

fn feed_xml() -> String {
    let items: String = HEADLINES
        .iter()
        .map(|t| format!("<item><title>{t}</title></item>"))
        .collect();
    format!(r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>{items}</channel></rss>"#)
}

struct FixedFeed(String);

#[async_trait]
impl FeedTransport for FixedFeed {
    async fn get(&self, _url: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct FixedQuotes;

#[async_trait]
impl MarketDataProvider for FixedQuotes {
    async fn fetch_series(
        &self,
        symbol: &str,
        _window: LookbackWindow,
        _interval: Interval,
    ) -> anyhow::Result<PriceSeries> {
        let close = match symbol {
            "CNY=X" => 7.10,
            "JPY=X" => 142.0,
            other => anyhow::bail!("unexpected symbol {other}"),
        };
        let d = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();
        Ok(PriceSeries::from_observations(symbol, [(d, close)]))
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn desk() -> SentimentDesk {
    let quotes = QuoteFetcher::new(
        Arc::new(FixedQuotes),
        Arc::new(MemoryQuoteCache::default()),
        CrossRateSpec::default(),
    );
    let news = NewsFetcher::new(Arc::new(FixedFeed(feed_xml())));
    let lexicon = Arc::new(Lexicon::builtin().expect("builtin lexicon"));
    let settings = DeskSettings {
        request: QuoteRequest::new(["CNY=X", "JPY=X"], LookbackWindow::OneMonth, Interval::Daily),
        feed_url: "https://feeds.test/rss".to_string(),
        max_headlines: 10,
    };
    SentimentDesk::new(quotes, news, lexicon, settings)
}

#[tokio::test]
async fn ten_headlines_score_and_label() {
    let report = desk().sentiment().await.expect("sentiment run");

    assert_eq!(report.headlines.len(), 10);
    assert_eq!(report.scores.get(Currency::Jpy), 7);
    assert_eq!(report.scores.get(Currency::Cny), 4);
    assert_eq!(report.scores.get(Currency::Usd), 0);

    assert_eq!(report.labels[&Currency::Jpy], SentimentLabel::StronglyBullish);
    assert_eq!(report.labels[&Currency::Cny], SentimentLabel::MildlyBullish);
    assert_eq!(report.labels[&Currency::Usd], SentimentLabel::Neutral);

    assert_eq!(report.matched, vec!["boj exit", "china stimulus"]);
    assert_eq!(report.batch_id.len(), 12);

    let usd = report
        .currencies()
        .into_iter()
        .find(|v| v.currency == Currency::Usd)
        .expect("usd view");
    assert_eq!(usd.outlook, Outlook::Ranging);
}

#[tokio::test]
async fn briefing_carries_both_sections() {
    let briefing = desk().briefing().await;
    let v = serde_json::to_value(&briefing).expect("serialize briefing");

    assert_eq!(v["market"]["status"], "ok");
    let cross = v["market"]["data"]["snapshot"]["cross_rate"]["value"]
        .as_f64()
        .expect("cross rate value");
    assert!((cross - 7.10 / 142.0 * 100.0).abs() < 1e-9);

    assert_eq!(v["sentiment"]["status"], "ok");
    assert_eq!(v["sentiment"]["data"]["scores"]["JPY"], 7);
    assert_eq!(v["sentiment"]["data"]["labels"]["CNY"], "mildly_bullish");
}

#[tokio::test]
async fn same_batch_same_result() {
    let d = desk();
    let a = d.sentiment().await.expect("first");
    let b = d.sentiment().await.expect("second");
    assert_eq!(a.scores, b.scores);
    assert_eq!(a.batch_id, b.batch_id);
}
