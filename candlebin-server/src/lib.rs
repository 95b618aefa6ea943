//! HTTP surface for candlebin.
//!
//! `app` wires the export route, the static artifact directory and a health
//! probe onto an axum `Router`; the binary in `main.rs` adds configuration,
//! the SQLite store and graceful shutdown.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

/// Build the router over `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let data = ServeDir::new(&state.data_dir);
    Router::new()
        .route("/", get(routes::export))
        .route("/health", get(routes::health))
        .nest_service("/data", data)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
