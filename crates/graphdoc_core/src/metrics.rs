//! Store operation counters.
//!
//! Every collection operation bumps one of these counters. They are
//! process-local and reset when the store is reopened.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Store::open_in_memory()?;
//! store.collection("users").put("u1", &json!({"name": "Ada"}))?;
//!
//! let snap = store.metrics();
//! println!("writes: {}", snap.writes);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic operation counters for one store.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Point reads (`get`, `has`).
    reads: AtomicU64,
    /// Upserts.
    writes: AtomicU64,
    /// Deletes, single or bulk.
    deletes: AtomicU64,
    /// Filtered queries (`find`, `count`, `keys`).
    queries: AtomicU64,
    /// Documents returned by queries and reads.
    documents_read: AtomicU64,
    /// Operations that returned an error.
    errors: AtomicU64,
}

impl StoreMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self, found: bool) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if found {
            self.documents_read.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self, returned: usize) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.documents_read
            .fetch_add(returned as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of point reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of upserts.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of delete operations.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of filtered queries.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the number of documents handed back to callers.
    pub fn documents_read(&self) -> u64 {
        self.documents_read.load(Ordering::Relaxed)
    }

    /// Returns the number of failed operations.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            deletes: self.deletes(),
            queries: self.queries(),
            documents_read: self.documents_read(),
            errors: self.errors(),
        }
    }
}

/// A point-in-time copy of [`StoreMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Point reads.
    pub reads: u64,
    /// Upserts.
    pub writes: u64,
    /// Delete operations.
    pub deletes: u64,
    /// Filtered queries.
    pub queries: u64,
    /// Documents handed back to callers.
    pub documents_read: u64,
    /// Failed operations.
    pub errors: u64,
}
