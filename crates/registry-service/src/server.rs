//! Registry server implementation.
//!
//! # Rust Learning Note
//!
//! ## Graceful Shutdown
//!
//! ```rust,ignore
//! axum::serve(listener, router)
//!     .with_graceful_shutdown(shutdown)
//!     .await?;
//! ```
//!
//! `shutdown` is any future; when it resolves the server stops accepting
//! connections and waits for in-flight requests to finish.

use crate::{
    api::{create_router, SharedStore},
    transport::TransportConfig,
};
use axum::Router;
use registry_common::{Error, Result};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

#[cfg(unix)]
use tokio::net::UnixListener;

/// Registry server.
///
/// Owns the transport to bind and the router built over the storage
/// handle.
pub struct RegistryServer {
    transport: TransportConfig,
    router: Router,
}

impl RegistryServer {
    /// Creates a new registry server over the given store.
    pub fn new(transport: TransportConfig, store: SharedStore) -> Self {
        Self {
            transport,
            router: create_router(store),
        }
    }

    /// Returns the configured transport.
    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Starts the server and runs until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting registry server: {}", self.transport.describe());

        if let Some(addr) = self.transport.bind_address() {
            info!("Binding to TCP: {}", addr);

            let listener = TcpListener::bind(&addr).await?;
            return self.serve_tcp(listener, shutdown).await;
        }

        #[cfg(unix)]
        if let TransportConfig::UnixSocket { path } = self.transport.clone() {
            return self.run_unix_socket(&path, shutdown).await;
        }

        Err(Error::Internal(format!(
            "no listener for transport: {}",
            self.transport.describe()
        )))
    }

    /// Serves on an already-bound TCP listener.
    ///
    /// Useful when the caller needs the bound address (e.g. port 0).
    pub async fn serve_tcp<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Registry server stopped");
        Ok(())
    }

    /// Runs the server on a Unix domain socket.
    ///
    /// A stale socket file left by a previous run is removed first.
    #[cfg(unix)]
    async fn run_unix_socket<F>(self, path: &std::path::Path, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Binding to Unix socket: {}", path.display());

        if path.exists() {
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        info!("Server listening on {}", path.display());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Registry server stopped");
        Ok(())
    }
}
