//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use graphdoc_core::{Config, Graph, SemanticMatcher, Store};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
    path: Option<PathBuf>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self::memory_with_config(Config::default())
    }

    /// Creates a new in-memory test store with custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        Self {
            store: Store::open_in_memory_with_config(config)
                .expect("Failed to open in-memory store"),
            _temp_dir: None,
            path: None,
        }
    }

    /// Creates a new file-backed test store.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("unit.db");
        let store = Store::open_path(&path).expect("Failed to open file store");

        Self {
            store,
            _temp_dir: Some(temp_dir),
            path: Some(path),
        }
    }

    /// Returns the database file if file-backed, None if in-memory.
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Wraps the store in a graph.
    pub fn into_graph(self) -> TestGraph {
        TestGraph {
            graph: Graph::new(self.store),
            _temp_dir: self._temp_dir,
        }
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// A test graph with automatic cleanup.
pub struct TestGraph {
    /// The graph instance.
    pub graph: Graph,
    _temp_dir: Option<TempDir>,
}

impl TestGraph {
    /// Creates a graph over a new in-memory store.
    pub fn memory() -> Self {
        TestStore::memory().into_graph()
    }

    /// Injects a semantic matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Arc<dyn SemanticMatcher>) -> Self {
        self.graph = self.graph.with_matcher(matcher);
        self
    }
}

impl std::ops::Deref for TestGraph {
    type Target = Graph;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

/// Runs a test with a temporary in-memory store.
///
/// # Example
///
/// ```rust,ignore
/// use graphdoc_testkit::with_temp_store;
///
/// #[test]
/// fn my_test() {
///     with_temp_store(|store| {
///         let users = store.collection("users");
///         // ... test operations
///     });
/// }
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store, &std::path::Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store
        .path()
        .expect("File store should have a path")
        .to_path_buf();
    f(&test_store.store, &path)
}

/// Runs a test with a temporary in-memory graph.
pub fn with_temp_graph<F, R>(f: F) -> R
where
    F: FnOnce(&Graph) -> R,
{
    let test_graph = TestGraph::memory();
    f(&test_graph.graph)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use serde_json::json;

    /// The five-product catalog used throughout the query tests, priced
    /// 999, 599, 149, 299, and 399.
    pub fn product_catalog() -> TestStore {
        let test_store = TestStore::memory();
        let products = test_store.collection("products");
        let rows = [
            ("laptop", "Laptop", 999, "electronics", true),
            ("phone", "Phone", 599, "electronics", true),
            ("headphones", "Headphones", 149, "audio", false),
            ("monitor", "Monitor", 299, "electronics", true),
            ("speaker", "Speaker", 399, "audio", true),
        ];
        for (id, name, price, category, in_stock) in rows {
            products
                .put(
                    id,
                    &json!({
                        "name": name,
                        "price": price,
                        "category": category,
                        "inStock": in_stock,
                        "tags": [category],
                    }),
                )
                .expect("Failed to put product");
        }
        test_store
    }

    /// Creates a store with `count` documents `{"index": i}` in `collection`.
    pub fn populated_store(collection: &str, count: usize) -> TestStore {
        let test_store = TestStore::memory();
        let handle = test_store.collection(collection);
        for i in 0..count {
            handle
                .put(&format!("doc_{i:04}"), &json!({ "index": i }))
                .expect("Failed to put document");
        }
        test_store
    }

    /// Creates a graph with users working at companies.
    ///
    /// `ada` and `grace` work at `acme`; `linus` works at `initech`.
    pub fn org_chart() -> TestGraph {
        let test_graph = TestGraph::memory();
        let things = test_graph.things();
        for (id, name) in [("ada", "Ada"), ("grace", "Grace"), ("linus", "Linus")] {
            things
                .create("User", json!({ "name": name }), Some(id))
                .expect("Failed to create user");
        }
        for (id, name) in [("acme", "Acme"), ("initech", "Initech")] {
            things
                .create("Company", json!({ "name": name }), Some(id))
                .expect("Failed to create company");
        }
        let rels = test_graph.relationships();
        for (from, to) in [("ada", "acme"), ("grace", "acme"), ("linus", "initech")] {
            rels.relate(from, "worksAt", to, graphdoc_core::RelateOptions::new())
                .expect("Failed to relate");
        }
        test_graph
    }
}
