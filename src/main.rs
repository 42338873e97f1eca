//! FX Sentiment Desk: binary entrypoint.
//! Loads config and the lexicon, then serves the JSON API with Axum.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fx_sentiment::api::{create_router, AppState};
use fx_sentiment::config::AppConfig;
use fx_sentiment::desk::SentimentDesk;
use fx_sentiment::lexicon::Lexicon;
use fx_sentiment::metrics::Metrics;

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
/// Filter from `RUST_LOG`, falling back to `fx_sentiment=info,warn`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fx_sentiment=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default()?;

    // Invalid lexicon entries are fatal here, never at scoring time.
    let lexicon = Arc::new(Lexicon::load(cfg.lexicon.path.as_deref())?);
    info!(
        entries = lexicon.len(),
        source = %cfg
            .lexicon
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "builtin".to_string()),
        "lexicon loaded"
    );

    let metrics = Metrics::init(cfg.market.cache_ttl_secs)?;
    let desk = SentimentDesk::from_config(&cfg, lexicon)?;
    let router = create_router(AppState::new(desk)).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;
    info!(
        bind = %cfg.server.bind,
        feed = %cfg.news.feed_url,
        symbols = ?cfg.market.symbols,
        "fx-sentiment listening"
    );
    axum::serve(listener, router).await.context("axum serve")?;
    Ok(())
}
