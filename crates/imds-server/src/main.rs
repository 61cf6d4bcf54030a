//! IMDS server entry point.
//!
//! Opens the configured storage backend, then starts the Axum HTTP server
//! with graceful shutdown. The shutdown signal is also handed to every
//! request context, so in-flight store calls are abandoned when it fires.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use imds_server::config::{DbDriver, ServerConfig};
use imds_server::routes;
use imds_server::state::AppState;
use imds_storage::{MemoryQuerier, VendorQuerier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        driver = driver_name(&config.db_driver),
        default_vendor = %config.default_vendor,
        "IMDS starting"
    );

    let querier = open_querier(&config.db_driver).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = Arc::new(AppState::new(
        querier,
        config.request_timeout,
        config.default_vendor.clone(),
        shutdown_rx,
    ));

    let app = routes::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "IMDS server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("IMDS server stopped");
    Ok(())
}

fn driver_name(driver: &DbDriver) -> &'static str {
    match driver {
        DbDriver::Memory => "memory",
        DbDriver::Sqlite { .. } => "sqlite",
        DbDriver::Postgres { .. } => "postgres",
    }
}

/// Open the storage backend selected by `DB_DRIVER`.
async fn open_querier(driver: &DbDriver) -> anyhow::Result<Arc<dyn VendorQuerier>> {
    let querier: Arc<dyn VendorQuerier> = match driver {
        DbDriver::Memory => {
            info!("using in-memory storage (data will not persist)");
            Arc::new(MemoryQuerier::new())
        }
        #[cfg(feature = "sqlite-backend")]
        DbDriver::Sqlite { path } => {
            info!(path = %path, "using SQLite storage");
            Arc::new(
                imds_storage::SqliteQuerier::open(path)
                    .await
                    .context("failed to open SQLite storage")?,
            )
        }
        #[cfg(not(feature = "sqlite-backend"))]
        DbDriver::Sqlite { .. } => {
            anyhow::bail!("SQLite backend requested but feature 'sqlite-backend' is not enabled");
        }
        #[cfg(feature = "postgres-backend")]
        DbDriver::Postgres { url } => {
            info!(url = %"[redacted]", "using PostgreSQL storage");
            Arc::new(
                imds_storage::PostgresQuerier::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL storage")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        DbDriver::Postgres { .. } => {
            anyhow::bail!(
                "PostgreSQL backend requested but feature 'postgres-backend' is not enabled"
            );
        }
    };

    Ok(querier)
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
