//! # Sentiment Scoring
//! Pure lexicon matching over one headline batch. No I/O, no shared state.
//!
//! Policy: every headline is case-folded and whitespace-collapsed, the batch is
//! joined with `'\n'`, and each lexicon phrase is tested for substring presence
//! once. A matching phrase adds its weight to every currency it declares,
//! regardless of how many headlines repeat it. Matching is plain substring
//! containment, so "japan" also hits "japanese".

use serde::Serialize;
use std::collections::BTreeMap;

use crate::label::{classify, SentimentLabel};
use crate::lexicon::{Currency, Lexicon};
use crate::news::HeadlineBatch;

/// Joins headlines; `fold_text` never emits it, so phrases can't straddle two.
const HEADLINE_DELIMITER: char = '\n';

/// Per-currency accumulated score of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreBoard {
    scores: BTreeMap<Currency, i32>,
}

impl ScoreBoard {
    /// Every tracked currency at zero.
    pub fn zeroed() -> Self {
        Self {
            scores: Currency::ALL.iter().map(|c| (*c, 0)).collect(),
        }
    }

    pub fn get(&self, currency: Currency) -> i32 {
        self.scores.get(&currency).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, i32)> + '_ {
        self.scores.iter().map(|(c, s)| (*c, *s))
    }

    pub fn is_all_zero(&self) -> bool {
        self.scores.values().all(|s| *s == 0)
    }

    /// Label for every currency on the board.
    pub fn labels(&self) -> BTreeMap<Currency, SentimentLabel> {
        self.iter().map(|(c, s)| (c, classify(s))).collect()
    }

    fn add(&mut self, currency: Currency, weight: i32) {
        let slot = self.scores.entry(currency).or_insert(0);
        *slot = slot.saturating_add(weight);
    }
}

/// Case-fold and collapse whitespace (all runs, including newlines, become one
/// space). Shared by lexicon loading and scoring so both sides agree.
pub fn fold_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = true;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.extend(ch.to_lowercase());
            last_space = false;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Normalized text of the whole batch, in feed order.
pub fn batch_text(batch: &HeadlineBatch) -> String {
    let mut text = String::new();
    for (i, h) in batch.iter().enumerate() {
        if i > 0 {
            text.push(HEADLINE_DELIMITER);
        }
        text.push_str(&fold_text(&h.text));
    }
    text
}

/// Score one batch against the lexicon.
pub fn score_sentiment(batch: &HeadlineBatch, lexicon: &Lexicon) -> ScoreBoard {
    score_with_evidence(batch, lexicon).0
}

/// Like [`score_sentiment`], also returning the matched phrases in lexicon order.
pub fn score_with_evidence(batch: &HeadlineBatch, lexicon: &Lexicon) -> (ScoreBoard, Vec<String>) {
    let mut board = ScoreBoard::zeroed();
    let mut matched = Vec::new();
    if batch.is_empty() {
        return (board, matched);
    }

    let text = batch_text(batch);
    for entry in lexicon.entries() {
        if !text.contains(entry.phrase.as_str()) {
            continue;
        }
        for currency in &entry.affinities {
            board.add(*currency, entry.weight);
        }
        matched.push(entry.phrase.clone());
    }

    (board, matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::RawEntry;

    fn batch(texts: &[&str]) -> HeadlineBatch {
        HeadlineBatch::from_texts(texts.iter().copied())
    }

    fn lex(entries: Vec<RawEntry>) -> Lexicon {
        Lexicon::new(entries).unwrap()
    }

    #[test]
    fn fold_text_lowercases_and_collapses() {
        assert_eq!(fold_text("  Fed\tHAWKISH \n move "), "fed hawkish move");
        assert_eq!(fold_text(""), "");
        assert_eq!(fold_text(" \n "), "");
    }

    #[test]
    fn delimiter_blocks_cross_headline_match() {
        let l = lex(vec![RawEntry::new("boj exit", &[Currency::Jpy], 7)]);
        let b = batch(&["Traders eye BOJ", "Exit polls in Tokyo"]);
        assert!(score_sentiment(&b, &l).is_all_zero());
    }

    #[test]
    fn negative_weights_accumulate() {
        let l = lex(vec![
            RawEntry::new("property crisis", &[Currency::Cny], -5),
            RawEntry::new("trade war", &[Currency::Usd, Currency::Cny], -3),
        ]);
        let b = batch(&["Property crisis deepens as trade war escalates"]);
        let board = score_sentiment(&b, &l);
        assert_eq!(board.get(Currency::Cny), -8);
        assert_eq!(board.get(Currency::Usd), -3);
        assert_eq!(board.get(Currency::Jpy), 0);
    }

    #[test]
    fn substring_match_ignores_word_boundaries() {
        let l = lex(vec![RawEntry::new("japan", &[Currency::Jpy], 1)]);
        let b = batch(&["Japanese automakers rally"]);
        assert_eq!(score_sentiment(&b, &l).get(Currency::Jpy), 1);
    }

    #[test]
    fn evidence_lists_matches_in_lexicon_order() {
        let l = lex(vec![
            RawEntry::new("china stimulus", &[Currency::Cny], 4),
            RawEntry::new("fed dovish", &[Currency::Usd], -5),
            RawEntry::new("boj exit", &[Currency::Jpy], 7),
        ]);
        let b = batch(&["BOJ exit talk grows", "China stimulus package unveiled"]);
        let (_, matched) = score_with_evidence(&b, &l);
        assert_eq!(matched, vec!["china stimulus", "boj exit"]);
    }

    #[test]
    fn serializes_as_currency_map() {
        let v = serde_json::to_value(ScoreBoard::zeroed()).unwrap();
        assert_eq!(v, serde_json::json!({"USD": 0, "JPY": 0, "CNY": 0}));
    }
}
