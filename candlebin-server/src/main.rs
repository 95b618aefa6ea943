use std::sync::Arc;

use candlebin::{Candlebin, FsArtifactStore};
use candlebin_server::{AppState, ServerConfig, app};
use candlebin_sqlite::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServerConfig::from_env();
    tracing::info!(
        database = %cfg.database_url,
        data_dir = %cfg.data_dir.display(),
        store_timeout_ms = u64::try_from(cfg.store_timeout.as_millis()).unwrap_or(u64::MAX),
        "starting candlebin-server"
    );

    let store = Arc::new(SqliteStore::connect(&cfg.database_url, cfg.db_max_connections).await?);
    store.initialize().await?;

    let bin = Candlebin::builder()
        .with_store(store.clone())
        .with_catalog(store.clone())
        .with_artifacts(Arc::new(FsArtifactStore::new(&cfg.data_dir)))
        .config(cfg.candlebin_config())
        .build()?;

    let state = Arc::new(AppState::new(bin, &cfg.data_dir));
    let listener = tokio::net::TcpListener::bind(cfg.addr()).await?;
    tracing::info!(addr = %cfg.addr(), "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
