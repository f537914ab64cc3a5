use std::sync::Arc;

use anyhow::Context;
use db::DBService;
use server::{AppState, routes, session::HeaderSessionResolver};
use services::services::config::Config;
use tracing::info;
use utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let config = Config::from_env().context("invalid configuration")?;
    let db = DBService::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open database at {}", config.database_url))?;

    let state = AppState::new(db, &config, Arc::new(HeaderSessionResolver));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    info!(
        addr = %config.socket_addr(),
        progress_mode = %config.progress_mode,
        default_phase_status = %config.default_phase_status,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
