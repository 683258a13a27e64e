//! Command-line and environment configuration.
//!
//! Everything is read once at process start. Each flag falls back to an
//! environment variable, so a container only needs `PORT` and
//! `DATABASE_URL`.

use crate::transport::{TransportConfig, DEFAULT_PORT};
use clap::Parser;
#[cfg(unix)]
use std::path::PathBuf;

/// Default connection string: a SQLite file in the working directory.
pub const DEFAULT_DATABASE_URL: &str = "registry.db";

/// Registry server - registers and lists systems and topics over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "registry-server", author, version, about, long_about = None)]
pub struct ServerArgs {
    /// TCP port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Database connection string (`:memory:`, `sqlite://path` or a file path)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Serve on a Unix domain socket instead of TCP
    #[cfg(unix)]
    #[arg(long, value_name = "PATH")]
    pub unix_socket: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl ServerArgs {
    /// Returns the transport selected by the arguments.
    pub fn transport(&self) -> TransportConfig {
        #[cfg(unix)]
        {
            if let Some(path) = &self.unix_socket {
                return TransportConfig::unix_socket(path.clone());
            }
        }

        TransportConfig::tcp(self.port)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
