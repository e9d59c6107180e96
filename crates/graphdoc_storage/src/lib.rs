//! # GraphDoc Storage
//!
//! Storage engine trait and implementations for GraphDoc.
//!
//! This crate provides the lowest-level abstraction GraphDoc runs on: a
//! relational engine that executes parameterized statements and hands back
//! rows. The engine does not know about collections, filters, or graph
//! records; `graphdoc_core` owns all of that.
//!
//! ## Design Principles
//!
//! - One engine per storage unit, single writer
//! - Parameters are always bound, never interpolated into statement text
//! - The engine exposes JSON-path extraction (`json_extract`) and a
//!   `regexp(pattern, value)` predicate
//! - Must be `Send + Sync` so a store can be shared across threads
//!
//! ## Available Engines
//!
//! - [`SqliteEngine`] - SQLite, in memory or backed by a file
//!
//! ## Example
//!
//! ```rust
//! use graphdoc_storage::{SqlValue, SqliteEngine, StorageEngine};
//!
//! let engine = SqliteEngine::open_in_memory().unwrap();
//! engine.exec_batch("CREATE TABLE t (v TEXT)").unwrap();
//! let cursor = engine.exec("INSERT INTO t (v) VALUES (?1)", &[SqlValue::from("a")]).unwrap();
//! assert_eq!(cursor.rows_written(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod engine;
mod error;
mod sqlite;
mod value;

pub use cursor::{Cursor, Row};
pub use engine::StorageEngine;
pub use error::{StorageError, StorageResult};
pub use sqlite::{SqliteEngine, SqliteOptions};
pub use value::SqlValue;
