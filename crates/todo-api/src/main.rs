//! `todo-api` バイナリのエントリポイント

use anyhow::Context;
use infrastructure::open_store;
use shared::{init_tracing, Config};
use todo_api::{app_with_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(config.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;

    let store = open_store(&config.storage).context("failed to open todo store")?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, storage = %config.storage, "server starting");

    axum::serve(listener, app_with_state(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            // シグナルを待てない場合は kill されるまで稼働を続ける
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
