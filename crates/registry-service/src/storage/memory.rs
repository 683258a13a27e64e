//! In-memory backend for the registry.
//!
//! # Rust Learning Note
//!
//! ## DashMap vs Mutex<HashMap>
//!
//! `DashMap` shards its entries across several locks, so concurrent
//! registrations of different names rarely contend. The `entry` API gives
//! an atomic check-and-insert, which is exactly the primary-key rule:
//!
//! ```rust,ignore
//! match self.systems.entry(name) {
//!     Entry::Occupied(_) => Err(/* duplicate */),
//!     Entry::Vacant(slot) => { slot.insert(row); Ok(()) }
//! }
//! ```

use super::{RegistryStore, SYSTEMS_TABLE, TOPICS_TABLE};
use crate::types::{System, Topic};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use registry_common::{Error, Result, SystemName, TopicName};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A stored row plus its insertion sequence (stands in for SQLite's rowid).
struct Row<T> {
    seq: u64,
    value: T,
}

/// In-memory registry store.
///
/// Follows the same contract as [`super::SqliteStore`]: inserts fail until
/// the table has been ensured, duplicate names are rejected, topic
/// structures must be valid JSON and subscribers are dropped on write.
/// Nothing survives the process.
pub struct MemoryStore {
    systems: DashMap<SystemName, Row<System>>,
    topics: DashMap<TopicName, Row<Topic>>,
    systems_table: AtomicBool,
    topics_table: AtomicBool,
    next_seq: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store with no tables.
    pub fn new() -> Self {
        Self {
            systems: DashMap::new(),
            topics: DashMap::new(),
            systems_table: AtomicBool::new(false),
            topics_table: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Returns the number of stored systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns true once `ensure_systems_table` has run.
    pub fn has_systems_table(&self) -> bool {
        self.systems_table.load(Ordering::Acquire)
    }

    /// Returns true once `ensure_topics_table` has run.
    pub fn has_topics_table(&self) -> bool {
        self.topics_table.load(Ordering::Acquire)
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn sorted<K, T: Clone>(map: &DashMap<K, Row<T>>) -> Vec<T>
    where
        K: Eq + std::hash::Hash,
    {
        let mut rows: Vec<(u64, T)> = map
            .iter()
            .map(|entry| (entry.value().seq, entry.value().value.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, value)| value).collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn ensure_systems_table(&self) -> Result<()> {
        self.systems_table.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert_system(&self, system: &System) -> Result<()> {
        if !self.has_systems_table() {
            return Err(Error::table_missing(SYSTEMS_TABLE));
        }

        match self.systems.entry(system.name.clone()) {
            Entry::Occupied(_) => Err(Error::storage(
                "insert system",
                format!("duplicate primary key: {}", system.name),
            )),
            Entry::Vacant(slot) => {
                slot.insert(Row {
                    seq: self.next_seq(),
                    value: system.clone(),
                });
                Ok(())
            }
        }
    }

    async fn list_systems(&self) -> Result<Vec<System>> {
        Ok(Self::sorted(&self.systems))
    }

    async fn ensure_topics_table(&self) -> Result<()> {
        self.topics_table.store(true, Ordering::Release);
        Ok(())
    }

    async fn insert_topic(&self, topic: &Topic) -> Result<()> {
        if !self.has_topics_table() {
            return Err(Error::table_missing(TOPICS_TABLE));
        }

        serde_json::from_str::<serde_json::Value>(&topic.structure)
            .map_err(|e| Error::storage("insert topic", format!("structure is not JSON: {}", e)))?;

        match self.topics.entry(topic.name.clone()) {
            Entry::Occupied(_) => Err(Error::storage(
                "insert topic",
                format!("duplicate primary key: {}", topic.name),
            )),
            Entry::Vacant(slot) => {
                let mut stored = topic.clone();
                stored.subscribers.clear();
                slot.insert(Row {
                    seq: self.next_seq(),
                    value: stored,
                });
                Ok(())
            }
        }
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        Ok(Self::sorted(&self.topics))
    }
}
