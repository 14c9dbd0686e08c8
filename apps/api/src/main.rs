//! # Ingreventory API server
//!
//! ```text
//! .env ──► ApiConfig ──► SQLite pool (+ migrations) ──► AppState ──► axum
//! ```

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ingreventory_api::{build_router, ApiConfig, AppState};
use ingreventory_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Ingreventory API server...");

    let config = ApiConfig::load(None).context("failed to load configuration")?;
    info!(
        environment = %config.environment,
        port = config.server.port,
        prefix = %config.server.api_prefix,
        database = %config.database.path.display(),
        compensate_on_failure = config.fulfillment.compensate_on_failure,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(config.database.path.clone()).max_connections(config.database.max_connections),
    )
    .await
    .context("failed to open database")?;
    info!("Database ready");

    let addr = config.socket_addr();
    let state = AppState::new(db.clone(), config).context("failed to build application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
