//! Storage layer for the registry.
//!
//! # Rust Learning Note
//!
//! Handlers never see a concrete database. They receive the storage
//! capability as a trait object:
//!
//! ```rust,ignore
//! let store: Arc<dyn RegistryStore> = Arc::new(SqliteStore::open_in_memory()?);
//! let app = create_router(store);
//! ```
//!
//! Swapping `SqliteStore` for `MemoryStore` in tests is a one-line change,
//! and there is no process-wide database handle.
//!
//! ## Schema lifecycle
//!
//! Tables are created lazily: writers call `ensure_*_table()` before every
//! insert. Readers never create tables; a table that does not exist yet
//! reads as empty.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::types::{System, Topic};
use async_trait::async_trait;
use registry_common::Result;

/// Name of the systems table.
pub const SYSTEMS_TABLE: &str = "systems";

/// Name of the topics table.
pub const TOPICS_TABLE: &str = "topics";

/// Persistent registry of systems and topics.
///
/// Every method is a single statement against the backing store; there is
/// no transaction spanning `ensure_*_table` and the following insert.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Creates the `systems` table if it does not exist. Idempotent.
    async fn ensure_systems_table(&self) -> Result<()>;

    /// Inserts one system row.
    ///
    /// Fails with a storage error if a system with the same name exists;
    /// the existing row is left untouched.
    async fn insert_system(&self, system: &System) -> Result<()>;

    /// Returns every registered system in insertion order.
    async fn list_systems(&self) -> Result<Vec<System>>;

    /// Creates the `topics` table if it does not exist. Idempotent.
    async fn ensure_topics_table(&self) -> Result<()>;

    /// Inserts one topic row. `subscribers` is never written.
    async fn insert_topic(&self, topic: &Topic) -> Result<()>;

    /// Returns every registered topic in insertion order.
    async fn list_topics(&self) -> Result<Vec<Topic>>;
}
