//! # Registry Service
//!
//! HTTP registry of systems and topics, persisted in a relational store.
//!
//! This crate provides:
//! - Wire/entity types for systems and topics
//! - A storage capability (`RegistryStore`) with SQLite and in-memory backends
//! - The HTTP API for registering and listing entities
//! - Transport selection (TCP, Unix Domain Sockets) and the server runner
//! - Command-line / environment configuration for the `registry-server` binary

pub mod types;
pub mod storage;
pub mod api;
pub mod transport;
pub mod server;
pub mod config;

// Re-export commonly used items
pub use types::{System, Topic};
pub use storage::{MemoryStore, RegistryStore, SqliteStore};
pub use server::RegistryServer;
