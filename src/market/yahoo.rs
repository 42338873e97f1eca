// src/market/yahoo.rs
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::histogram;
use serde::Deserialize;
use std::time::Duration;

use crate::market::types::{Interval, LookbackWindow, MarketDataProvider, PriceSeries};
use crate::news::http::USER_AGENT;

pub const DEFAULT_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Exchange-local calendar date of a bar timestamp.
fn bar_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts.saturating_add(gmtoffset), 0).map(|dt| dt.date_naive())
}

/// Parse a `/v8/finance/chart` body into a daily close series.
/// Null closes are skipped; a result without bars is an empty series.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries> {
    let t0 = std::time::Instant::now();
    let resp: ChartResponse = serde_json::from_str(body).context("parsing yahoo chart json")?;

    if let Some(err) = resp.chart.error {
        bail!(
            "yahoo chart error for {symbol}: {} ({})",
            err.description.unwrap_or_default(),
            err.code.unwrap_or_default()
        );
    }

    let result = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("no chart result for {symbol}"))?;

    let gmtoffset = result.meta.map(|m| m.gmtoffset).unwrap_or(0);
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let observations = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| Some((bar_date(*ts, gmtoffset)?, close?)));
    let series = PriceSeries::from_observations(symbol, observations);

    histogram!("quote_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(series)
}

/// Yahoo Finance chart endpoint provider.
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("building yahoo http client")?;
        Ok(Self {
            client,
            base_url: DEFAULT_CHART_BASE_URL.to_string(),
        })
    }

    /// Point at another host (mirror, proxy, local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        window: LookbackWindow,
        interval: Interval,
    ) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let resp = self
            .client
            .get(&url)
            .query(&[("range", window.as_range()), ("interval", interval.as_param())])
            .send()
            .await
            .with_context(|| format!("yahoo http get() {symbol}"))?;
        let status = resp.status();
        let body = resp.text().await.context("yahoo http .text()")?;

        // Yahoo reports unknown symbols as 404 with a JSON error body; prefer its message.
        match parse_chart(symbol, &body) {
            Ok(series) if status.is_success() => Ok(series),
            Ok(_) => bail!("yahoo http status {status} for {symbol}"),
            Err(e) if status.is_success() => Err(e),
            Err(e) => Err(e.context(format!("yahoo http status {status}"))),
        }
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
