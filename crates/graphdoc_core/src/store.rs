//! Store facade.

use crate::collection::{Collection, Record, TypedCollection};
use crate::config::Config;
use crate::error::CoreResult;
use crate::metrics::{MetricsSnapshot, StoreMetrics};
use crate::query::validate_table_name;
use graphdoc_storage::{SqliteEngine, StorageEngine};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// The document store of one storage unit.
///
/// A `Store` owns the storage engine, the physical document table, and
/// the map of collection handles created so far. Every collection lives
/// in the same table, keyed by `(collection, id)`, with an index on
/// `(collection, updated_at)`.
///
/// # Opening a Store
///
/// ```rust,ignore
/// use graphdoc_core::Store;
///
/// let store = Store::open_path("unit.db")?;
/// let users = store.collection("users");
/// users.put("u1", &serde_json::json!({"name": "Ada"}))?;
/// ```
///
/// For tests, use `Store::open_in_memory()`.
pub struct Store {
    config: Config,
    table: Arc<str>,
    engine: Arc<dyn StorageEngine>,
    metrics: Arc<StoreMetrics>,
    collections: RwLock<HashMap<String, Collection>>,
}

impl Store {
    /// Opens a store on an engine, creating the document table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured table name is invalid or the
    /// schema cannot be created.
    pub fn open(engine: Arc<dyn StorageEngine>, config: Config) -> CoreResult<Self> {
        validate_table_name(&config.table_name)?;
        let table: Arc<str> = Arc::from(config.table_name.as_str());

        engine.exec_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            );
            CREATE INDEX IF NOT EXISTS {table}_updated_idx ON {table} (collection, updated_at);"
        ))?;
        tracing::debug!(table = %table, "document schema ready");

        Ok(Self {
            config,
            table,
            engine,
            metrics: Arc::new(StoreMetrics::new()),
            collections: RwLock::new(HashMap::new()),
        })
    }

    /// Opens a store in a SQLite file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_path_with_config(path, Config::default())
    }

    /// Opens a store in a SQLite file with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open_path_with_config(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let engine = SqliteEngine::open(path)?;
        Self::open(Arc::new(engine), config)
    }

    /// Opens a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be initialized.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_in_memory_with_config(Config::default())
    }

    /// Opens a private in-memory store with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be initialized.
    pub fn open_in_memory_with_config(config: Config) -> CoreResult<Self> {
        let engine = SqliteEngine::open_in_memory()?;
        Self::open(Arc::new(engine), config)
    }

    /// Returns the handle for a named collection, creating it on first use.
    ///
    /// Collections need no declaration; a collection exists once a
    /// document has been put into it.
    pub fn collection(&self, name: &str) -> Collection {
        if let Some(existing) = self.collections.read().get(name) {
            return existing.clone();
        }

        let mut collections = self.collections.write();
        collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Collection::new(
                    name.to_string(),
                    Arc::clone(&self.table),
                    self.config.strict_filters,
                    Arc::clone(&self.engine),
                    Arc::clone(&self.metrics),
                )
            })
            .clone()
    }

    /// Returns a typed view of a named collection.
    pub fn typed_collection<T: Record>(&self, name: &str) -> TypedCollection<T> {
        TypedCollection::new(self.collection(name))
    }

    /// Returns the names of every collection holding at least one document.
    pub fn collections(&self) -> CoreResult<Vec<String>> {
        let cursor = self.engine.exec(
            &format!(
                "SELECT DISTINCT collection FROM {} ORDER BY collection ASC",
                self.table
            ),
            &[],
        )?;
        Ok(cursor
            .into_rows()
            .into_iter()
            .filter_map(|row| row.text("collection").map(str::to_string))
            .collect())
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the storage engine.
    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Returns a snapshot of the operation counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("table", &self.table)
            .field("collections", &self.collections.read().len())
            .finish_non_exhaustive()
    }
}
