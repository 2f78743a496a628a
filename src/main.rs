use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use flowweek::error::AppResult;
use flowweek::http::{build_router, AppState};
use flowweek::services::cache_service::{CacheService, SqliteStore};
use flowweek::services::generation_service::{GenerationConfig, GenerationService};
use flowweek::utils::logger;

#[tokio::main]
async fn main() -> AppResult<()> {
    logger::init();

    let cache_path = std::env::var("FLOWWEEK_CACHE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("flowweek-cache.sqlite"));
    let store = SqliteStore::open(&cache_path)?;
    let cache = CacheService::new(Arc::new(store));

    let config = GenerationConfig::from_env()?;
    let generation = GenerationService::new(config, cache)?;

    let addr = std::env::var("FLOWWEEK_LISTEN").unwrap_or_else(|_| "127.0.0.1:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(target: "app::http", %addr, "flowweek server listening");

    let app = build_router(AppState { generation });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(target: "app::http", "shutdown requested");
    }
}
