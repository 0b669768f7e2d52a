use anyhow::Context;
use peopler::{Config, db, serve, telemetry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    let providers = telemetry::init_telemetry(&config)?;

    let pool = db::create_pool(&config.database_url).await?;
    db::create_schema(&pool).await?;
    db::ping(&pool).await.context("Database is not reachable")?;

    tracing::info!(database_url = %config.database_url, "Connected to database");

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting server on {addr}");

    let result = serve(listener, pool, shutdown_signal()).await;

    if let Some(providers) = providers {
        tracing::info!("Flushing telemetry...");
        if let Err(e) = providers.shutdown() {
            tracing::error!(error = %e, "Failed to flush telemetry");
        }
    }
    tracing::info!("Shutdown complete");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
