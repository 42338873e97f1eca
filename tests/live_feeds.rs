// tests/live_feeds.rs
//
// Hits the real Yahoo endpoints. Opt-in:
//   cargo test --features live-feeds --test live_feeds -- --nocapture
#![cfg(feature = "live-feeds")]

use fx_sentiment::market::{
    Interval, LookbackWindow, MarketDataProvider, YahooChartProvider,
};
use fx_sentiment::news::{NewsFetcher, DEFAULT_FEED_URL};

#[tokio::test]
async fn live_chart_returns_bars() {
    let p = YahooChartProvider::new(10).expect("client");
    let s = p
        .fetch_series("JPY=X", LookbackWindow::OneMonth, Interval::Daily)
        .await
        .expect("live chart");
    assert!(!s.is_empty());
    println!("JPY=X latest: {:?}", s.latest());
}

#[tokio::test]
async fn live_feed_returns_headlines() {
    let f = NewsFetcher::http(10).expect("client");
    let batch = f.fetch_news(DEFAULT_FEED_URL, 6).await.expect("live feed");
    assert!(batch.len() <= 6);
    for h in &batch {
        println!("{:>2}. {}", h.rank, h.text);
    }
}
