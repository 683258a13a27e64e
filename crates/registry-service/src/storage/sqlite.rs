//! SQLite backend for the registry.

use super::{RegistryStore, SYSTEMS_TABLE, TOPICS_TABLE};
use crate::types::{System, Topic};
use async_trait::async_trait;
use registry_common::{Error, Result, SystemName, TopicName};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const CREATE_SYSTEMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS systems (
    name TEXT PRIMARY KEY NOT NULL,
    applicationEndpoint TEXT NOT NULL
)";

const CREATE_TOPICS_TABLE: &str = "CREATE TABLE IF NOT EXISTS topics (
    name TEXT PRIMARY KEY NOT NULL,
    description TEXT NOT NULL,
    owner TEXT NOT NULL,
    structure TEXT NOT NULL CHECK (json_valid(structure)),
    subscribers TEXT
)";

/// SQLite registry store.
///
/// Thread-safe via an internal Mutex (a SQLite `Connection` is `Send` but
/// not `Sync`). Statements run on tokio's blocking pool so request tasks
/// never block on disk I/O.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE systems (
///     name TEXT PRIMARY KEY NOT NULL,
///     applicationEndpoint TEXT NOT NULL
/// );
/// CREATE TABLE topics (
///     name TEXT PRIMARY KEY NOT NULL,
///     description TEXT NOT NULL,
///     owner TEXT NOT NULL,
///     structure TEXT NOT NULL CHECK (json_valid(structure)),
///     subscribers TEXT            -- JSON array, never written
/// );
/// ```
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a file-backed database. No tables are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| Error::storage("open database", format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Creates an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage("open database", e))?;
        Ok(Self::from_connection(conn))
    }

    /// Opens a store from a connection string.
    ///
    /// Accepted forms:
    /// - `:memory:` or `sqlite::memory:` → in-memory database
    /// - `sqlite://registry.db` → file database
    /// - `registry.db` → file database
    pub fn from_url(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::validation("database connection string is empty"));
        }

        match url {
            ":memory:" | "sqlite::memory:" | "sqlite://:memory:" => Self::open_in_memory(),
            _ => {
                let path = url
                    .strip_prefix("sqlite://")
                    .or_else(|| url.strip_prefix("sqlite:"))
                    .unwrap_or(url);
                Self::open(path)
            }
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| Error::Internal("sqlite connection mutex poisoned".to_string()))?;
            f(&*conn).map_err(|e| Error::storage(operation, e))
        })
        .await
        .map_err(|e| Error::Internal(format!("storage task failed: {}", e)))?
    }

    fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn row_to_system(row: &rusqlite::Row) -> rusqlite::Result<System> {
        Ok(System {
            name: SystemName::new(row.get::<_, String>(0)?),
            application_endpoint: row.get(1)?,
        })
    }

    fn row_to_topic(row: &rusqlite::Row) -> rusqlite::Result<Topic> {
        let subscribers = match row.get::<_, Option<String>>(4)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
            })?,
            None => Vec::new(),
        };

        Ok(Topic {
            name: TopicName::new(row.get::<_, String>(0)?),
            description: row.get(1)?,
            owner: row.get(2)?,
            structure: row.get(3)?,
            subscribers,
        })
    }
}

#[async_trait]
impl RegistryStore for SqliteStore {
    async fn ensure_systems_table(&self) -> Result<()> {
        self.with_conn("create systems table", |conn| {
            conn.execute(CREATE_SYSTEMS_TABLE, [])?;
            Ok(())
        })
        .await
    }

    async fn insert_system(&self, system: &System) -> Result<()> {
        let name = system.name.as_str().to_string();
        let endpoint = system.application_endpoint.clone();

        self.with_conn("insert system", move |conn| {
            conn.execute(
                "INSERT INTO systems (name, applicationEndpoint) VALUES (?1, ?2)",
                params![name, endpoint],
            )?;
            debug!("Inserted system row: {}", name);
            Ok(())
        })
        .await
    }

    async fn list_systems(&self) -> Result<Vec<System>> {
        self.with_conn("query systems", |conn| {
            if !Self::table_exists(conn, SYSTEMS_TABLE)? {
                return Ok(Vec::new());
            }

            let mut stmt =
                conn.prepare("SELECT name, applicationEndpoint FROM systems ORDER BY rowid")?;
            let systems = stmt
                .query_map([], Self::row_to_system)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(systems)
        })
        .await
    }

    async fn ensure_topics_table(&self) -> Result<()> {
        self.with_conn("create topics table", |conn| {
            conn.execute(CREATE_TOPICS_TABLE, [])?;
            Ok(())
        })
        .await
    }

    async fn insert_topic(&self, topic: &Topic) -> Result<()> {
        let topic = topic.clone();

        self.with_conn("insert topic", move |conn| {
            conn.execute(
                "INSERT INTO topics (name, description, owner, structure) VALUES (?1, ?2, ?3, ?4)",
                params![
                    topic.name.as_str(),
                    topic.description,
                    topic.owner,
                    topic.structure,
                ],
            )?;
            debug!("Inserted topic row: {}", topic.name);
            Ok(())
        })
        .await
    }

    async fn list_topics(&self) -> Result<Vec<Topic>> {
        self.with_conn("query topics", |conn| {
            if !Self::table_exists(conn, TOPICS_TABLE)? {
                return Ok(Vec::new());
            }

            let mut stmt = conn.prepare(
                "SELECT name, description, owner, structure, subscribers \
                 FROM topics ORDER BY rowid",
            )?;
            let topics = stmt
                .query_map([], Self::row_to_topic)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(topics)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing() -> System {
        System::new("billing", "http://billing.local")
    }

    #[tokio::test]
    async fn test_sqlite_store_insert_and_list() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.ensure_systems_table().await.unwrap();
        store.insert_system(&billing()).await.unwrap();
        store
            .insert_system(&System::new("search", "search.internal:9200"))
            .await
            .unwrap();

        let systems = store.list_systems().await.unwrap();
        assert_eq!(systems.len(), 2);
        assert_eq!(systems[0], billing());
        assert_eq!(systems[1].name.as_str(), "search");
    }

    #[tokio::test]
    async fn test_sqlite_store_stores_caller_values() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.ensure_systems_table().await.unwrap();
        store.insert_system(&billing()).await.unwrap();

        let systems = store.list_systems().await.unwrap();
        assert_eq!(systems[0].name.as_str(), "billing");
        assert_eq!(systems[0].application_endpoint, "http://billing.local");
    }

    #[tokio::test]
    async fn test_sqlite_store_ensure_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.ensure_systems_table().await.unwrap();
        store.insert_system(&billing()).await.unwrap();
        store.ensure_systems_table().await.unwrap();

        assert_eq!(store.list_systems().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_store_list_without_table_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();

        assert!(store.list_systems().await.unwrap().is_empty());
        assert!(store.list_topics().await.unwrap().is_empty());

        // Reading must not have created the table.
        let err = store.insert_system(&billing()).await.unwrap_err();
        assert!(matches!(err, Error::Storage { operation: "insert system", .. }));
    }

    #[tokio::test]
    async fn test_sqlite_store_duplicate_name_keeps_original() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.ensure_systems_table().await.unwrap();
        store.insert_system(&billing()).await.unwrap();

        let err = store
            .insert_system(&System::new("billing", "http://elsewhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));

        let systems = store.list_systems().await.unwrap();
        assert_eq!(systems, vec![billing()]);
    }

    #[tokio::test]
    async fn test_sqlite_store_topics() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut topic = Topic::new(
            "orders.created",
            "Emitted when an order is placed",
            "billing",
            r#"{"type": "object"}"#,
        );
        topic.subscribers = vec!["shipping".to_string()];

        store.ensure_topics_table().await.unwrap();
        store.insert_topic(&topic).await.unwrap();

        let topics = store.list_topics().await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].name.as_str(), "orders.created");
        assert_eq!(topics[0].structure, r#"{"type": "object"}"#);
        // Subscribers are never persisted.
        assert!(topics[0].subscribers.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_store_duplicate_topic_keeps_original() {
        let store = SqliteStore::open_in_memory().unwrap();
        let original = Topic::new("orders", "Order events", "billing", "{}");

        store.ensure_topics_table().await.unwrap();
        store.insert_topic(&original).await.unwrap();

        let err = store
            .insert_topic(&Topic::new("orders", "replaced", "shipping", "[]"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage { operation: "insert topic", .. }));

        let topics = store.list_topics().await.unwrap();
        assert_eq!(topics, vec![original]);
    }

    #[tokio::test]
    async fn test_sqlite_store_rejects_non_json_structure() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.ensure_topics_table().await.unwrap();
        let result = store
            .insert_topic(&Topic::new("orders", "d", "billing", "not json"))
            .await;

        assert!(matches!(result, Err(Error::Storage { operation: "insert topic", .. })));
        assert!(store.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_store_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.ensure_systems_table().await.unwrap();
            store.insert_system(&billing()).await.unwrap();
        }

        let reopened = SqliteStore::from_url(&format!("sqlite://{}", path.display())).unwrap();
        assert_eq!(reopened.list_systems().await.unwrap(), vec![billing()]);
    }

    #[test]
    fn test_from_url_rejects_empty() {
        assert!(matches!(
            SqliteStore::from_url("  "),
            Err(Error::Validation { .. })
        ));
        assert!(SqliteStore::from_url(":memory:").is_ok());
    }
}
