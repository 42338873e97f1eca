//! Score → label mapping with fixed, non-overlapping thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    StronglyBullish,
    MildlyBullish,
    Neutral,
    MildlyBearish,
    StronglyBearish,
}

/// Three-way direction, as a trader would phrase a weekly call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Bullish,
    Ranging,
    Bearish,
}

/// Total over all integers:
/// `> 5` strongly bullish, `2..=5` mildly bullish, `-1..=1` neutral,
/// `-5..=-2` mildly bearish, `< -5` strongly bearish.
pub fn classify(score: i32) -> SentimentLabel {
    match score {
        s if s > 5 => SentimentLabel::StronglyBullish,
        s if s > 1 => SentimentLabel::MildlyBullish,
        s if s >= -1 => SentimentLabel::Neutral,
        s if s >= -5 => SentimentLabel::MildlyBearish,
        _ => SentimentLabel::StronglyBearish,
    }
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::StronglyBullish => "strongly_bullish",
            SentimentLabel::MildlyBullish => "mildly_bullish",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::MildlyBearish => "mildly_bearish",
            SentimentLabel::StronglyBearish => "strongly_bearish",
        }
    }

    pub fn outlook(self) -> Outlook {
        match self {
            SentimentLabel::StronglyBullish | SentimentLabel::MildlyBullish => Outlook::Bullish,
            SentimentLabel::Neutral => Outlook::Ranging,
            SentimentLabel::MildlyBearish | SentimentLabel::StronglyBearish => Outlook::Bearish,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_are_total() {
        assert_eq!(classify(i32::MAX), SentimentLabel::StronglyBullish);
        assert_eq!(classify(i32::MIN), SentimentLabel::StronglyBearish);
        assert_eq!(classify(0), SentimentLabel::Neutral);
    }

    #[test]
    fn outlook_groups_labels() {
        assert_eq!(classify(3).outlook(), Outlook::Bullish);
        assert_eq!(classify(1).outlook(), Outlook::Ranging);
        assert_eq!(classify(-9).outlook(), Outlook::Bearish);
    }

    #[test]
    fn serializes_snake_case() {
        let v = serde_json::to_value(SentimentLabel::MildlyBearish).unwrap();
        assert_eq!(v, serde_json::json!("mildly_bearish"));
    }
}
