// src/news/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One headline; `rank` is its 0-based position in the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub rank: usize,
    pub text: String,
}

/// Feed-ordered, bounded sequence of headlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadlineBatch {
    items: Vec<Headline>,
}

impl HeadlineBatch {
    pub fn new(items: Vec<Headline>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Caller-supplied texts, ranked by position.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = texts
            .into_iter()
            .enumerate()
            .map(|(rank, t)| Headline {
                rank,
                text: t.into(),
            })
            .collect();
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Headline> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|h| h.text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a HeadlineBatch {
    type Item = &'a Headline;
    type IntoIter = std::slice::Iter<'a, Headline>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Raw document retrieval for a feed URL.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}
