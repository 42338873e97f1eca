// src/market/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::FetchError;

/// How far back a series reaches (Yahoo `range`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackWindow {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl LookbackWindow {
    pub fn as_range(self) -> &'static str {
        match self {
            LookbackWindow::OneMonth => "1mo",
            LookbackWindow::ThreeMonths => "3mo",
            LookbackWindow::SixMonths => "6mo",
            LookbackWindow::OneYear => "1y",
        }
    }
}

/// Sampling interval of a series (Yahoo `interval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl Interval {
    pub fn as_param(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub symbols: Vec<String>,
    pub window: LookbackWindow,
    pub interval: Interval,
}

impl QuoteRequest {
    pub fn new<I, S>(symbols: I, window: LookbackWindow, interval: Interval) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            window,
            interval,
        }
    }

    /// Cache key: the symbol *set* plus window and interval.
    pub fn key(&self) -> QuoteKey {
        let mut symbols: Vec<String> = self.symbols.iter().map(|s| s.trim().to_string()).collect();
        symbols.retain(|s| !s.is_empty());
        symbols.sort();
        symbols.dedup();
        QuoteKey {
            symbols,
            window: self.window,
            interval: self.interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub symbols: Vec<String>,
    pub window: LookbackWindow,
    pub interval: Interval,
}

impl fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}",
            self.symbols.join(","),
            self.window.as_range(),
            self.interval.as_param()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices of one instrument, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build from raw observations in any order. Non-finite closes are dropped;
    /// for repeated dates the later observation wins.
    pub fn from_observations(
        symbol: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, close) in observations {
            if close.is_finite() {
                by_date.insert(date, close);
            }
        }
        Self {
            symbol: symbol.into(),
            points: by_date
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Which two instruments form the derived cross-rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRateSpec {
    pub numerator: String,
    pub denominator: String,
    pub multiplier: f64,
    pub label: String,
}

impl Default for CrossRateSpec {
    /// USD/CNY over USD/JPY, scaled to CNY per 100 JPY.
    fn default() -> Self {
        Self {
            numerator: "CNY=X".to_string(),
            denominator: "JPY=X".to_string(),
            multiplier: 100.0,
            label: "100 JPY/CNY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRate {
    pub label: String,
    pub value: f64,
}

/// Latest close per instrument plus the cross-rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub as_of: Option<NaiveDate>,
    pub latest: BTreeMap<String, f64>,
    pub cross_rate: Option<CrossRate>,
}

impl QuoteSnapshot {
    /// Missing (or zero) denominator is `DataUnavailable`; a missing numerator
    /// only leaves the cross-rate empty.
    pub fn build(
        series: &BTreeMap<String, PriceSeries>,
        spec: &CrossRateSpec,
    ) -> Result<Self, FetchError> {
        let latest: BTreeMap<String, f64> = series
            .iter()
            .filter_map(|(sym, s)| s.latest().map(|p| (sym.clone(), p.close)))
            .collect();
        let as_of = series
            .values()
            .filter_map(|s| s.latest().map(|p| p.date))
            .max();

        let denominator = latest.get(&spec.denominator).copied().ok_or_else(|| {
            FetchError::DataUnavailable(format!(
                "cross-rate denominator {} missing",
                spec.denominator
            ))
        })?;
        if denominator == 0.0 {
            return Err(FetchError::DataUnavailable(format!(
                "cross-rate denominator {} is zero",
                spec.denominator
            )));
        }

        let cross_rate = latest.get(&spec.numerator).map(|num| CrossRate {
            label: spec.label.clone(),
            value: num / denominator * spec.multiplier,
        });

        Ok(Self {
            as_of,
            latest,
            cross_rate,
        })
    }
}

/// Result of one market fetch: chartable series, the snapshot, and the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub series: BTreeMap<String, PriceSeries>,
    pub snapshot: QuoteSnapshot,
    /// Requested symbols that came back empty or failed.
    pub gaps: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketData {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Strict view: any flagged gap becomes `PartialData`.
    pub fn require_complete(self) -> Result<Self, FetchError> {
        if self.gaps.is_empty() {
            Ok(self)
        } else {
            Err(FetchError::PartialData { missing: self.gaps })
        }
    }
}

/// Upstream source of price series.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_series(
        &self,
        symbol: &str,
        window: LookbackWindow,
        interval: Interval,
    ) -> Result<PriceSeries>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn series(sym: &str, closes: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::from_observations(sym, closes.iter().map(|(day, c)| (d(*day), *c)))
    }

    #[test]
    fn series_sorted_and_deduped_last_wins() {
        let s = series("JPY=X", &[(3, 155.0), (1, 154.0), (3, 156.5), (2, f64::NAN)]);
        let dates: Vec<_> = s.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1), d(3)]);
        assert_eq!(s.latest().unwrap().close, 156.5);
    }

    #[test]
    fn key_ignores_symbol_order_and_duplicates() {
        let a = QuoteRequest::new(["JPY=X", "CNY=X"], LookbackWindow::OneMonth, Interval::Daily);
        let b = QuoteRequest::new(
            ["CNY=X", "JPY=X", "CNY=X"],
            LookbackWindow::OneMonth,
            Interval::Daily,
        );
        assert_eq!(a.key(), b.key());
        let c = QuoteRequest::new(["CNY=X", "JPY=X"], LookbackWindow::ThreeMonths, Interval::Daily);
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn snapshot_computes_scaled_cross_rate() {
        let mut m = BTreeMap::new();
        m.insert("CNY=X".to_string(), series("CNY=X", &[(1, 7.10), (2, 7.25)]));
        m.insert("JPY=X".to_string(), series("JPY=X", &[(1, 150.0), (2, 145.0)]));
        let snap = QuoteSnapshot::build(&m, &CrossRateSpec::default()).unwrap();
        let cross = snap.cross_rate.unwrap();
        assert!((cross.value - 5.0).abs() < 1e-9);
        assert_eq!(snap.as_of, Some(d(2)));
        assert_eq!(snap.latest["JPY=X"], 145.0);
    }

    #[test]
    fn snapshot_without_denominator_is_unavailable() {
        let mut m = BTreeMap::new();
        m.insert("CNY=X".to_string(), series("CNY=X", &[(1, 7.1)]));
        let err = QuoteSnapshot::build(&m, &CrossRateSpec::default()).unwrap_err();
        assert!(matches!(err, FetchError::DataUnavailable(_)));
    }

    #[test]
    fn snapshot_with_zero_denominator_is_unavailable() {
        let mut m = BTreeMap::new();
        m.insert("CNY=X".to_string(), series("CNY=X", &[(1, 7.1)]));
        m.insert("JPY=X".to_string(), series("JPY=X", &[(1, 0.0)]));
        assert!(QuoteSnapshot::build(&m, &CrossRateSpec::default()).is_err());
    }

    #[test]
    fn snapshot_without_numerator_has_no_cross_rate() {
        let mut m = BTreeMap::new();
        m.insert("JPY=X".to_string(), series("JPY=X", &[(1, 150.0)]));
        let snap = QuoteSnapshot::build(&m, &CrossRateSpec::default()).unwrap();
        assert!(snap.cross_rate.is_none());
        assert_eq!(snap.latest.len(), 1);
    }
}
