//! Weighted phrase → currency lexicon.
//!
//! Each entry declares the currencies it moves; nothing is inferred from the
//! phrase text. Entries are validated once at load time and the resulting
//! [`Lexicon`] is shared read-only (`Arc<Lexicon>`) for the life of the process.
//!
//! Accepted file formats:
//! - JSON: `[{"phrase": "boj exit", "affinities": ["JPY"], "weight": 7}, ...]`
//! - TOML: `[[entries]]` tables with the same keys.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::LexiconError;
use crate::scoring::fold_text;

const BUILTIN_LEXICON: &str = include_str!("../config/lexicon.json");

/// Currencies tracked by the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Jpy,
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Jpy, Currency::Cny];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One validated rule. `phrase` is stored case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexiconEntry {
    pub phrase: String,
    pub affinities: BTreeSet<Currency>,
    pub weight: i32,
}

/// Entry as written in config, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub phrase: String,
    #[serde(default)]
    pub affinities: Vec<Currency>,
    pub weight: i32,
}

impl RawEntry {
    pub fn new(phrase: impl Into<String>, affinities: &[Currency], weight: i32) -> Self {
        Self {
            phrase: phrase.into(),
            affinities: affinities.to_vec(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Validate raw entries, keeping their order.
    pub fn new(raw: Vec<RawEntry>) -> Result<Self, LexiconError> {
        let mut entries = Vec::with_capacity(raw.len());
        for (index, r) in raw.into_iter().enumerate() {
            let phrase = fold_text(&r.phrase);
            if phrase.is_empty() {
                return Err(LexiconError::InvalidLexiconEntry {
                    index,
                    reason: "empty phrase".to_string(),
                });
            }
            if r.affinities.is_empty() {
                return Err(LexiconError::InvalidLexiconEntry {
                    index,
                    reason: format!("phrase '{phrase}' has no currency affinities"),
                });
            }
            entries.push(LexiconEntry {
                phrase,
                affinities: r.affinities.into_iter().collect(),
                weight: r.weight,
            });
        }
        Ok(Self { entries })
    }

    /// The rule table compiled into the binary (`config/lexicon.json`).
    pub fn builtin() -> Result<Self> {
        parse_lexicon(BUILTIN_LEXICON, "json").context("parsing built-in lexicon")
    }

    /// Load from a JSON or TOML file (format picked by extension, then sniffed).
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_lexicon(&content, &ext).with_context(|| format!("loading {}", path.display()))
    }

    /// Configured file if any, otherwise the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_lexicon(s: &str, hint_ext: &str) -> Result<Lexicon> {
    let raw = if hint_ext == "toml" {
        parse_toml(s)?
    } else {
        match parse_json(s) {
            Ok(v) => v,
            Err(json_err) => parse_toml(s).map_err(|_| json_err)?,
        }
    };
    Ok(Lexicon::new(raw)?)
}

fn parse_json(s: &str) -> Result<Vec<RawEntry>> {
    Ok(serde_json::from_str(s)?)
}

fn parse_toml(s: &str) -> Result<Vec<RawEntry>> {
    #[derive(Deserialize)]
    struct TomlLexicon {
        #[serde(default)]
        entries: Vec<RawEntry>,
    }
    let v: TomlLexicon = toml::from_str(s)?;
    Ok(v.entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lexicon_is_valid() {
        let lex = Lexicon::builtin().unwrap();
        assert!(!lex.is_empty());
        assert!(lex.entries().iter().all(|e| !e.affinities.is_empty()));
        assert!(lex.entries().iter().any(|e| e.phrase == "boj exit"));
    }

    #[test]
    fn phrases_are_case_folded_and_collapsed() {
        let lex = Lexicon::new(vec![RawEntry::new("  China   Stimulus ", &[Currency::Cny], 4)])
            .unwrap();
        assert_eq!(lex.entries()[0].phrase, "china stimulus");
    }

    #[test]
    fn empty_phrase_is_rejected() {
        let err = Lexicon::new(vec![
            RawEntry::new("boj exit", &[Currency::Jpy], 7),
            RawEntry::new("   ", &[Currency::Usd], 1),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LexiconError::InvalidLexiconEntry {
                index: 1,
                reason: "empty phrase".into()
            }
        );
    }

    #[test]
    fn empty_affinities_are_rejected() {
        let err = Lexicon::new(vec![RawEntry::new("fed hawkish", &[], 6)]).unwrap_err();
        assert!(matches!(err, LexiconError::InvalidLexiconEntry { index: 0, .. }));
    }

    #[test]
    fn duplicate_affinities_collapse() {
        let lex =
            Lexicon::new(vec![RawEntry::new("safe haven", &[Currency::Jpy, Currency::Jpy], 2)])
                .unwrap();
        assert_eq!(lex.entries()[0].affinities.len(), 1);
    }

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
[[entries]]
phrase = "Fed Hawkish"
affinities = ["USD"]
weight = 6
"#;
        let json = r#"[{"phrase":"BOJ exit","affinities":["JPY"],"weight":7}]"#;
        let t = parse_lexicon(toml, "toml").unwrap();
        assert_eq!(t.entries()[0].phrase, "fed hawkish");
        let j = parse_lexicon(json, "json").unwrap();
        assert_eq!(j.entries()[0].weight, 7);
        // no extension hint: JSON first, TOML fallback
        let sniffed = parse_lexicon(toml, "").unwrap();
        assert_eq!(sniffed.len(), 1);
    }

    #[test]
    fn unknown_currency_fails_to_parse() {
        let json = r#"[{"phrase":"ecb hike","affinities":["EUR"],"weight":3}]"#;
        assert!(parse_lexicon(json, "json").is_err());
    }
}
