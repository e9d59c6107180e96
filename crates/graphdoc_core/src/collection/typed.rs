//! Typed collection implementation.

use crate::collection::document::Collection;
use crate::collection::record::Record;
use crate::error::{CoreError, CoreResult};
use crate::query::{Filter, QueryOptions};
use serde_json::Value;
use std::marker::PhantomData;

/// A collection of records of type `T`.
///
/// `TypedCollection<T>` wraps a [`Collection`] and converts between `T`
/// and JSON documents. The graph layer keeps every one of its record
/// kinds in one of these.
pub struct TypedCollection<T: Record> {
    collection: Collection,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Clone for TypedCollection<T> {
    fn clone(&self) -> Self {
        Self::new(self.collection.clone())
    }
}

impl<T: Record> TypedCollection<T> {
    /// Wraps an untyped collection.
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying untyped collection.
    pub fn untyped(&self) -> &Collection {
        &self.collection
    }

    /// Inserts or replaces a record under its own id.
    pub fn put(&self, record: &T) -> CoreResult<()> {
        let doc = serde_json::to_value(record)?;
        self.collection.put(record.record_id(), &doc)
    }

    /// Gets a record by id.
    pub fn get(&self, id: &str) -> CoreResult<Option<T>> {
        match self.collection.get(id)? {
            Some(doc) => Ok(Some(self.decode(id, doc)?)),
            None => Ok(None),
        }
    }

    /// Returns true if a record with this id exists.
    pub fn has(&self, id: &str) -> CoreResult<bool> {
        self.collection.has(id)
    }

    /// Deletes a record. Returns true if it existed.
    pub fn delete(&self, id: &str) -> CoreResult<bool> {
        self.collection.delete(id)
    }

    /// Returns the records matching a filter.
    pub fn find(&self, filter: &Filter, options: &QueryOptions) -> CoreResult<Vec<T>> {
        self.collection
            .find_documents(filter, options)?
            .into_iter()
            .map(|doc| self.decode(&doc.id, doc.data))
            .collect()
    }

    /// Counts the records matching a filter.
    pub fn count(&self, filter: &Filter) -> CoreResult<u64> {
        self.collection.count_where(filter)
    }

    /// Deletes the records matching a filter. Returns how many were removed.
    pub fn delete_where(&self, filter: &Filter) -> CoreResult<u64> {
        self.collection.delete_where(filter)
    }

    fn decode(&self, id: &str, doc: Value) -> CoreResult<T> {
        serde_json::from_value(doc).map_err(|e| {
            tracing::warn!(collection = %self.collection.name(), id, error = %e, "undecodable record");
            CoreError::Corrupted {
                collection: self.collection.name().to_string(),
                id: id.to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl<T: Record> std::fmt::Debug for TypedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCollection")
            .field("collection", &self.collection)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
