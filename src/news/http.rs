// src/news/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::news::types::FeedTransport;

pub(crate) const USER_AGENT: &str = "fx-sentiment/0.1";

/// Plain GET over reqwest; non-2xx statuses are errors.
pub struct HttpFeedTransport {
    client: reqwest::Client,
}

impl HttpFeedTransport {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("feed http get()")?
            .error_for_status()
            .context("feed http status")?;
        resp.text().await.context("feed http .text()")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
