use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::desk::{Briefing, CurrencyView, ErrorBody, SentimentDesk, SentimentReport};
use crate::error::FetchError;
use crate::lexicon::Lexicon;
use crate::market::MarketData;

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<SentimentDesk>,
}

impl AppState {
    pub fn new(desk: SentimentDesk) -> Self {
        Self {
            desk: Arc::new(desk),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/quotes", get(quotes))
        .route("/quotes/refresh", post(refresh_quotes))
        .route("/sentiment", get(sentiment))
        .route("/score", post(score))
        .route("/briefing", get(briefing))
        .route("/lexicon", get(lexicon))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Fetch failures as JSON with a status the presentation layer can branch on.
pub struct ApiError(FetchError);

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            FetchError::DataUnavailable(_) | FetchError::PartialData { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            FetchError::FeedUnreachable(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}

async fn quotes(State(state): State<AppState>) -> Result<Json<MarketData>, ApiError> {
    Ok(Json(state.desk.market().await?))
}

async fn refresh_quotes(State(state): State<AppState>) -> Result<Json<MarketData>, ApiError> {
    Ok(Json(state.desk.refresh_market().await?))
}

#[derive(serde::Serialize)]
struct SentimentResp {
    #[serde(flatten)]
    report: SentimentReport,
    currencies: Vec<CurrencyView>,
}

impl From<SentimentReport> for SentimentResp {
    fn from(report: SentimentReport) -> Self {
        let currencies = report.currencies();
        Self { report, currencies }
    }
}

async fn sentiment(State(state): State<AppState>) -> Result<Json<SentimentResp>, ApiError> {
    let report = state.desk.sentiment().await?;
    Ok(Json(report.into()))
}

#[derive(serde::Deserialize)]
struct ScoreReq {
    headlines: Vec<String>,
}

async fn score(State(state): State<AppState>, Json(body): Json<ScoreReq>) -> Json<SentimentResp> {
    Json(state.desk.score_headlines(body.headlines).into())
}

async fn briefing(State(state): State<AppState>) -> Json<Briefing> {
    Json(state.desk.briefing().await)
}

async fn lexicon(State(state): State<AppState>) -> Json<Lexicon> {
    Json(state.desk.lexicon().clone())
}
