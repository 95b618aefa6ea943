use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use candlebin::Symbol;
use candlebin_core::parse_minutes;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

fn default_ticker() -> String {
    "AAPL".to_string()
}

fn default_time() -> String {
    "1".to_string()
}

/// Query string of `GET /`.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "Ticker", default = "default_ticker")]
    pub ticker: String,
    /// Interval in minutes, kept as text so malformed values map to `invalid_interval`.
    #[serde(rename = "Time", default = "default_time")]
    pub time: String,
}

/// `GET /?Ticker=..&Time=..` → plain-text path of the produced artifact.
pub async fn export(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<String, ApiError> {
    let Query(q) = query?;
    let minutes = parse_minutes(&q.time)?;
    let symbol = Symbol::new(&q.ticker)?;
    let handle = state.bin.export(&symbol, minutes).await?;
    tracing::info!(symbol = %symbol, minutes, artifact = %handle.public_path, "export served");
    Ok(handle.public_path)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
