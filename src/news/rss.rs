// src/news/rss.rs
use anyhow::{Context, Result};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::news::clean_headline;
use crate::news::types::{Headline, HeadlineBatch};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
}

/// Parse an RSS 2.0 document into at most `max_count` headlines, feed order kept.
///
/// A channel without items is an empty batch. Anything that isn't an RSS
/// document with a `<channel>` is an error.
pub fn parse_headlines(xml: &str, max_count: usize) -> Result<HeadlineBatch> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len().min(max_count));
    for (rank, it) in rss.channel.item.into_iter().enumerate() {
        if out.len() >= max_count {
            break;
        }
        let text = clean_headline(it.title.as_deref().unwrap_or_default());
        if text.is_empty() {
            continue;
        }
        out.push(Headline { rank, text });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_parse_ms").record(ms);
    Ok(HeadlineBatch::new(out))
}

/// HTML entities that feeds leak into XML and that the XML parser rejects.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
