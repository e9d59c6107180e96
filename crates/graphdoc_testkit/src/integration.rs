//! Model-checking harness for collections.
//!
//! Mirrors every write into an in-memory model so tests can verify the
//! store against it after arbitrary operation sequences.

use crate::generators::DocumentOperation;
use graphdoc_core::{Collection, QueryOptions, Store};
use serde_json::Value;
use std::collections::BTreeMap;

/// A test harness for integration testing.
pub struct CollectionHarness {
    /// The store instance.
    pub store: Store,
    collection: Collection,
    model: BTreeMap<String, Value>,
}

impl CollectionHarness {
    /// Creates a new harness over an in-memory store.
    pub fn new(name: &str) -> Self {
        let store = Store::open_in_memory().expect("Failed to open store");
        let collection = store.collection(name);
        Self {
            store,
            collection,
            model: BTreeMap::new(),
        }
    }

    /// Puts a document and tracks it for later verification.
    pub fn put(&mut self, id: &str, doc: Value) {
        self.collection.put(id, &doc).expect("Failed to put document");
        self.model.insert(id.to_string(), doc);
    }

    /// Gets a document and verifies it matches the tracked value.
    pub fn get_and_verify(&self, id: &str) -> Option<Value> {
        let actual = self.collection.get(id).expect("Failed to get document");
        assert_eq!(
            actual.as_ref(),
            self.model.get(id),
            "Document mismatch for {id:?}"
        );
        actual
    }

    /// Deletes a document, checking the reported existence against the model.
    pub fn delete(&mut self, id: &str) {
        let existed = self.collection.delete(id).expect("Failed to delete document");
        assert_eq!(
            existed,
            self.model.remove(id).is_some(),
            "Delete result mismatch for {id:?}"
        );
    }

    /// Applies a generated operation.
    pub fn apply(&mut self, op: &DocumentOperation) {
        match op {
            DocumentOperation::Put { id, doc } => self.put(id, doc.clone()),
            DocumentOperation::Delete { id } => self.delete(id),
            DocumentOperation::Get { id } => {
                self.get_and_verify(id);
            }
        }
    }

    /// Verifies the collection holds exactly the tracked documents.
    pub fn verify_all(&self) {
        for (id, expected) in &self.model {
            let actual = self.collection.get(id).expect("Failed to get document");
            assert_eq!(actual.as_ref(), Some(expected), "Document mismatch for {id:?}");
            assert!(self.collection.has(id).expect("Failed to check document"));
        }

        let keys = self.collection.keys().expect("Failed to list keys");
        let expected: Vec<_> = self.model.keys().cloned().collect();
        assert_eq!(keys, expected, "Key listing mismatch");

        let listed = self
            .collection
            .list(&QueryOptions::new())
            .expect("Failed to list documents");
        assert_eq!(listed.len(), self.model.len(), "List length mismatch");
        assert_eq!(
            self.collection.count(&Value::Null).expect("Failed to count"),
            self.model.len() as u64
        );
    }

    /// Returns the count of tracked documents.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }

    /// Returns the collection under test.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }
}
