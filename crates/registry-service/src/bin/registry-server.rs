//! Standalone registry server.
//!
//! ```text
//! PORT=8080 DATABASE_URL=sqlite://registry.db registry-server
//! registry-server --port 9000 --database-url :memory: --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use registry_service::{config::ServerArgs, RegistryServer, SqliteStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    initialize_logging(args.log_level());

    info!("Registry server starting...");
    info!("Retrieved port: {}", args.port);

    let store = SqliteStore::from_url(&args.database_url)
        .with_context(|| format!("Failed to open database: {}", args.database_url))?;
    info!("Opened database: {}", args.database_url);

    let server = RegistryServer::new(args.transport(), Arc::new(store));

    info!("Listening for requests... (Ctrl+C to stop)");
    server
        .run_until(shutdown_signal())
        .await
        .context("Registry server failed")?;

    info!("Registry server shut down");
    Ok(())
}

fn initialize_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    use tokio::signal;

    #[cfg(unix)]
    {
        use signal::unix::{signal as unix_signal, SignalKind};

        match (
            unix_signal(SignalKind::terminate()),
            unix_signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM signal"),
                    _ = sigint.recv() => info!("Received SIGINT signal"),
                }
                return;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to install Unix signal handlers, using Ctrl+C only: {}", e);
            }
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C signal");
}
