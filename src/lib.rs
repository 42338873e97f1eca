// src/lib.rs
//! Keyword-driven FX sentiment over Yahoo Finance quotes and news headlines.
//!
//! Leaves first: [`market`] and [`news`] fetch, [`lexicon`] holds the rule
//! table, [`scoring`] and [`label`] are the pure core, [`desk`] orchestrates a
//! run, and [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod desk;
pub mod error;
pub mod label;
pub mod lexicon;
pub mod market;
pub mod metrics;
pub mod news;
pub mod scoring;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::desk::{Briefing, SentimentDesk, SentimentReport};
pub use crate::error::{FetchError, LexiconError};
pub use crate::label::{classify, SentimentLabel};
pub use crate::lexicon::{Currency, Lexicon, LexiconEntry};
pub use crate::market::{MarketData, QuoteFetcher, QuoteRequest, QuoteSnapshot};
pub use crate::news::{HeadlineBatch, NewsFetcher};
pub use crate::scoring::{score_sentiment, ScoreBoard};
