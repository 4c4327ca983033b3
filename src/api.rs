use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::credibility::domain_from_url;
use crate::engine::{Capabilities, Engine, EngineHandle};
use crate::error::EngineError;
use crate::history::{Channel, History, HistoryEntry, HistoryStats};
use crate::verdict::{Document, FeedArticle, FeedResult, Verdict};

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub history: Arc<History>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: engine.into_handle(),
            history: Arc::new(History::default()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/predict-from-url", post(predict_from_url))
        .route("/api/predict-batch", post(predict_batch))
        .route("/api/history", get(history))
        .route("/api/admin/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "msg": msg })))
}

fn engine_error(e: EngineError) -> ApiError {
    match e {
        EngineError::ModelUnavailable { reason } => {
            warn!(target: "truthlens::api", %reason, "request rejected: model offline");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "msg": "Model offline" })),
            )
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Capabilities> {
    Json(state.engine.capabilities())
}

#[derive(Deserialize)]
struct PredictReq {
    #[serde(default)]
    text: String,
}

async fn predict(
    State(state): State<AppState>,
    Json(body): Json<PredictReq>,
) -> Result<Json<Verdict>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(bad_request("No text provided"));
    }
    let doc = Document::typed(body.text);
    let v = state.engine.classify_document(&doc).map_err(engine_error)?;
    state.history.record(Channel::from(&doc.provenance), &doc.text, &v);
    Ok(Json(v))
}

#[derive(Deserialize)]
struct PredictUrlReq {
    #[serde(default)]
    url: String,
    #[serde(default)]
    text: String,
}

async fn predict_from_url(
    State(state): State<AppState>,
    Json(body): Json<PredictUrlReq>,
) -> Result<Json<Verdict>, ApiError> {
    if body.url.trim().is_empty() {
        return Err(bad_request("No URL provided"));
    }
    if body.text.trim().is_empty() {
        return Err(bad_request("No article text provided"));
    }
    let domain = domain_from_url(&body.url).ok_or_else(|| bad_request("Invalid URL"))?;
    let doc = Document::from_url(body.text, domain);
    let v = state.engine.classify_document(&doc).map_err(engine_error)?;
    state.history.record(Channel::from(&doc.provenance), &doc.text, &v);
    Ok(Json(v))
}

async fn predict_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<FeedArticle>>,
) -> Result<Json<Vec<FeedResult>>, ApiError> {
    let mut out = Vec::with_capacity(items.len());
    for article in &items {
        let (v, row) = state.engine.classify_feed_item(article).map_err(engine_error)?;
        state.history.record(Channel::Feed, &article.full_text(), &v);
        out.push(row);
    }
    Ok(Json(out))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let n = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    // newest first for the dashboard
    let mut rows = state.history.snapshot_last_n(n);
    rows.reverse();
    Json(rows)
}

async fn stats(State(state): State<AppState>) -> Json<HistoryStats> {
    Json(state.history.stats())
}
