use anyhow::Context;
use dotenvy::dotenv;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use school_reviews::api;
use school_reviews::app_state::AppState;
use school_reviews::config::{log_dir_from_env, Config};
use school_reviews::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Logging first so configuration and storage decisions are recorded
    let _guard = telemetry::init(&log_dir_from_env()).context("Failed to create logs directory")?;
    let config = Config::from_env().context("Failed to load configuration")?;

    let bind_addr = config.bind_addr;
    let (state, pool) = AppState::connect(config).await?;

    let app = api::router(state);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(pool))
        .await
        .context("Server encountered an error")?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal(pool: Option<PgPool>) {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Received Ctrl+C, shutting down...");
    if let Some(pool) = pool {
        info!("🛠️ Closing database pool...");
        pool.close().await;
        info!("✅ Database pool closed.");
    }
}
