//! Transport layer for the registry server.
//!
//! # Rust Learning Note
//!
//! ## Conditional Compilation
//!
//! ```rust,ignore
//! #[cfg(unix)]
//! UnixSocket { path: PathBuf },
//! ```
//!
//! The Unix socket variant only exists on Unix targets, so a Windows build
//! can never construct one and every `match` stays exhaustive per platform.

#[cfg(unix)]
use std::path::PathBuf;

/// Default TCP port when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Transport configuration for the registry server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// TCP socket on all interfaces at the given port.
    Tcp { port: u16 },

    /// Unix domain socket (Unix only).
    #[cfg(unix)]
    UnixSocket { path: PathBuf },
}

impl TransportConfig {
    /// Creates a TCP transport config.
    pub fn tcp(port: u16) -> Self {
        Self::Tcp { port }
    }

    /// Creates a Unix domain socket config (Unix only).
    #[cfg(unix)]
    pub fn unix_socket(path: impl Into<PathBuf>) -> Self {
        Self::UnixSocket { path: path.into() }
    }

    /// Returns the address a TCP transport binds to.
    pub fn bind_address(&self) -> Option<String> {
        match self {
            TransportConfig::Tcp { port } => Some(format!("0.0.0.0:{}", port)),
            #[cfg(unix)]
            TransportConfig::UnixSocket { .. } => None,
        }
    }

    /// Returns a human-readable description of the transport.
    pub fn describe(&self) -> String {
        match self {
            TransportConfig::Tcp { port } => format!("TCP on port {}", port),

            #[cfg(unix)]
            TransportConfig::UnixSocket { path } => {
                format!("Unix domain socket at {}", path.display())
            }
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::tcp(DEFAULT_PORT)
    }
}
