//! Domain error taxonomy.
//!
//! Provider and parsing plumbing uses `anyhow`; these enums are what the
//! fetchers and the lexicon loader surface to callers.

use thiserror::Error;

/// Failures of the two external data sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Nothing usable came back for a required symbol.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// Some symbols came back, some didn't.
    #[error("partial market data, missing: {}", .missing.join(", "))]
    PartialData { missing: Vec<String> },

    /// The news source could not be reached or parsed.
    #[error("news feed unreachable: {0}")]
    FeedUnreachable(String),
}

impl FetchError {
    /// Stable machine name, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::DataUnavailable(_) => "data_unavailable",
            FetchError::PartialData { .. } => "partial_data",
            FetchError::FeedUnreachable(_) => "feed_unreachable",
        }
    }
}

/// Lexicon validation failure. Fatal at startup, never raised while scoring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexiconError {
    #[error("invalid lexicon entry #{index}: {reason}")]
    InvalidLexiconEntry { index: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_data_lists_missing_symbols() {
        let e = FetchError::PartialData {
            missing: vec!["EUR=X".into(), "GBP=X".into()],
        };
        assert_eq!(e.to_string(), "partial market data, missing: EUR=X, GBP=X");
        assert_eq!(e.kind(), "partial_data");
    }
}
