//! Error types for the registry.
//!
//! # Rust Learning Note
//!
//! Rust doesn't have exceptions - it uses `Result<T, E>` for error handling.
//! Storage and validation failures are variants of a single enum so callers
//! can match on the class of failure and map it to an HTTP status.
//!
//! ```rust
//! use registry_common::{Error, Result};
//!
//! fn check(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::validation("name must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input that decoded but does not satisfy the entity invariants.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// A read or write was attempted against a table that was never created.
    #[error("Table does not exist: {table}")]
    TableMissing {
        table: &'static str,
    },

    /// The backing store rejected or failed a statement.
    ///
    /// `operation` names what was being done (e.g. "insert system") so the
    /// log line is useful without exposing the cause to clients.
    #[error("Storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Internal error (shouldn't happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error (wraps std::io::Error).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a TableMissing error.
    pub fn table_missing(table: &'static str) -> Self {
        Self::TableMissing { table }
    }

    /// Creates a Storage error from any displayable cause.
    pub fn storage(operation: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Storage {
            operation,
            message: cause.to_string(),
        }
    }

    /// Returns true for failures caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}
