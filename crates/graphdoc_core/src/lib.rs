//! # GraphDoc Core
//!
//! Document collections and a typed graph layer for GraphDoc.
//!
//! This crate provides:
//! - Identifier validation for field and sort names
//! - A MongoDB-style filter language compiled to parameterized SQL
//! - Named JSON document collections over a [`StorageEngine`](graphdoc_storage::StorageEngine)
//! - A graph model: nouns, verbs, versioned things, an append-only audit
//!   log, typed relationships, traversal, and fuzzy relate
//!
//! ## Example
//!
//! ```rust
//! use graphdoc_core::{QueryOptions, Store};
//! use serde_json::json;
//!
//! let store = Store::open_in_memory().unwrap();
//! let products = store.collection("products");
//! for (id, price) in [("a", 999), ("b", 599), ("c", 149)] {
//!     products.put(id, &json!({ "price": price })).unwrap();
//! }
//!
//! let pricey = products
//!     .find(&json!({"price": {"$gt": 500}}), &QueryOptions::new().sort("-price"))
//!     .unwrap();
//! assert_eq!(pricey, vec![json!({"price": 999}), json!({"price": 599})]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod error;
mod graph;
mod ids;
mod metrics;
mod query;
mod store;

pub use collection::{Collection, Document, Record, TypedCollection};
pub use config::{Config, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TABLE_NAME};
pub use error::{CoreError, CoreResult};
pub use graph::{
    Action, ActionEntry, Actions, CascadeKind, FuzzyOptions, FuzzyRelation, Graph, GraphStats,
    Noun, NounDefinition, Nouns, RelateOptions, Relationship, Relationships, SemanticMatcher,
    SimilarMatch, Thing, Things, Verb, VerbDefinition, Verbs, ACTIONS, NOUNS, RELATIONSHIPS,
    THINGS, VERBS,
};
pub use ids::{now_millis, IdGenerator};
pub use metrics::{MetricsSnapshot, StoreMetrics};
pub use query::{
    compile, parse_sort, validate_field, ComparisonOp, Filter, MembershipOp, Predicate,
    QueryOptions,
};
pub use store::Store;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
