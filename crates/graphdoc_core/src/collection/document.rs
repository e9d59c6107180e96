//! Document collection implementation.

use crate::error::{CoreError, CoreResult};
use crate::ids::now_millis;
use crate::metrics::StoreMetrics;
use crate::query::{compile, type_name, Filter, Predicate, QueryOptions};
use graphdoc_storage::{Row, SqlValue, StorageEngine};
use serde_json::Value;
use std::sync::Arc;

/// Name of the JSON payload column.
pub(crate) const DATA_COLUMN: &str = "data";

/// A stored document with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// JSON object payload.
    pub data: Value,
    /// Milliseconds since the epoch when the id was first written.
    pub created_at: i64,
    /// Milliseconds since the epoch of the latest write.
    pub updated_at: i64,
}

/// A named partition of JSON documents keyed by string id.
///
/// Collections are cheap handles: clones share the same engine and
/// counters. Obtain them from [`crate::Store::collection`].
///
/// # Example
///
/// ```rust,ignore
/// let products = store.collection("products");
/// products.put("p1", &json!({"name": "Widget", "price": 999}))?;
///
/// let pricey = products.find(&json!({"price": {"$gt": 500}}), &QueryOptions::new().sort("-price"))?;
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: String,
    table: Arc<str>,
    strict_filters: bool,
    engine: Arc<dyn StorageEngine>,
    metrics: Arc<StoreMetrics>,
}

impl Collection {
    pub(crate) fn new(
        name: String,
        table: Arc<str>,
        strict_filters: bool,
        engine: Arc<dyn StorageEngine>,
        metrics: Arc<StoreMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(CollectionInner {
                name,
                table,
                strict_filters,
                engine,
                metrics,
            }),
        }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts or fully replaces the document stored under `id`.
    ///
    /// Replacing keeps the original creation time and the document's
    /// position in insertion order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidId`] if `id` is empty
    /// - [`CoreError::InvalidDocument`] if `doc` is not a JSON object
    pub fn put(&self, id: &str, doc: &Value) -> CoreResult<()> {
        validate_id(id)?;
        validate_document(doc)?;
        let payload = serde_json::to_string(doc)?;
        let now = now_millis();

        let sql = format!(
            "INSERT INTO {} (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            self.inner.table
        );
        let params = [
            self.name_param(),
            SqlValue::from(id),
            SqlValue::Text(payload),
            SqlValue::Integer(now),
            SqlValue::Integer(now),
        ];
        self.observe(self.inner.engine.exec(&sql, &params).map_err(CoreError::from))?;
        self.inner.metrics.record_write();
        tracing::trace!(collection = %self.name(), id, "put");
        Ok(())
    }

    /// Returns the document stored under `id`.
    pub fn get(&self, id: &str) -> CoreResult<Option<Value>> {
        Ok(self.get_document(id)?.map(|doc| doc.data))
    }

    /// Returns the document stored under `id` with its timestamps.
    pub fn get_document(&self, id: &str) -> CoreResult<Option<Document>> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE collection = ? AND id = ?",
            self.inner.table
        );
        let cursor = self.observe(
            self.inner
                .engine
                .exec(&sql, &[self.name_param(), SqlValue::from(id)])
                .map_err(CoreError::from),
        )?;
        let doc = cursor
            .one()
            .map(|row| self.decode_document(&row))
            .transpose()?;
        self.inner.metrics.record_read(doc.is_some());
        Ok(doc)
    }

    /// Returns true if a document is stored under `id`.
    pub fn has(&self, id: &str) -> CoreResult<bool> {
        let sql = format!(
            "SELECT 1 AS present FROM {} WHERE collection = ? AND id = ?",
            self.inner.table
        );
        let cursor = self.observe(
            self.inner
                .engine
                .exec(&sql, &[self.name_param(), SqlValue::from(id)])
                .map_err(CoreError::from),
        )?;
        let found = cursor.rows_read() > 0;
        self.inner.metrics.record_read(found);
        Ok(found)
    }

    /// Deletes the document stored under `id`. Returns true if it existed.
    pub fn delete(&self, id: &str) -> CoreResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE collection = ? AND id = ?",
            self.inner.table
        );
        let cursor = self.observe(
            self.inner
                .engine
                .exec(&sql, &[self.name_param(), SqlValue::from(id)])
                .map_err(CoreError::from),
        )?;
        self.inner.metrics.record_delete();
        tracing::trace!(collection = %self.name(), id, "delete");
        Ok(cursor.rows_written() > 0)
    }

    /// Returns every document matching a JSON filter. `Value::Null` matches all.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidFieldName`] for an unsafe filter key or sort field
    /// - [`CoreError::InvalidQueryOptions`] for `offset` without `limit`
    pub fn find(&self, filter: &Value, options: &QueryOptions) -> CoreResult<Vec<Value>> {
        let filter = Filter::parse(filter, self.inner.strict_filters)?;
        self.find_where(&filter, options)
    }

    /// Returns every document matching a parsed filter.
    pub fn find_where(&self, filter: &Filter, options: &QueryOptions) -> CoreResult<Vec<Value>> {
        Ok(self
            .find_documents(filter, options)?
            .into_iter()
            .map(|doc| doc.data)
            .collect())
    }

    /// Returns every matching document with its timestamps.
    pub fn find_documents(
        &self,
        filter: &Filter,
        options: &QueryOptions,
    ) -> CoreResult<Vec<Document>> {
        let Predicate { sql: predicate, mut params } = compile(filter, DATA_COLUMN)?;
        params.insert(0, self.name_param());
        let tail = options.render(DATA_COLUMN, &mut params)?;

        let sql = format!(
            "SELECT id, data, created_at, updated_at FROM {} WHERE collection = ? AND ({predicate}){tail}",
            self.inner.table
        );
        tracing::debug!(collection = %self.name(), %sql, "find");

        let cursor = self.observe(self.inner.engine.exec(&sql, &params).map_err(CoreError::from))?;
        let docs = cursor
            .rows()
            .iter()
            .map(|row| self.decode_document(row))
            .collect::<CoreResult<Vec<_>>>()?;
        self.inner.metrics.record_query(docs.len());
        Ok(docs)
    }

    /// Returns every document, equivalent to `find(&Value::Null, options)`.
    pub fn list(&self, options: &QueryOptions) -> CoreResult<Vec<Value>> {
        self.find_where(&Filter::all(), options)
    }

    /// Counts documents matching a JSON filter. `Value::Null` counts all.
    pub fn count(&self, filter: &Value) -> CoreResult<u64> {
        let filter = Filter::parse(filter, self.inner.strict_filters)?;
        self.count_where(&filter)
    }

    /// Counts documents matching a parsed filter.
    pub fn count_where(&self, filter: &Filter) -> CoreResult<u64> {
        let Predicate { sql: predicate, mut params } = compile(filter, DATA_COLUMN)?;
        params.insert(0, self.name_param());
        let sql = format!(
            "SELECT COUNT(*) AS n FROM {} WHERE collection = ? AND ({predicate})",
            self.inner.table
        );
        let cursor = self.observe(self.inner.engine.exec(&sql, &params).map_err(CoreError::from))?;
        self.inner.metrics.record_query(0);
        let n = cursor.one().and_then(|row| row.integer("n")).unwrap_or(0);
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Returns every id in the collection, sorted lexicographically.
    pub fn keys(&self) -> CoreResult<Vec<String>> {
        let sql = format!(
            "SELECT id FROM {} WHERE collection = ? ORDER BY id ASC",
            self.inner.table
        );
        let cursor = self.observe(
            self.inner
                .engine
                .exec(&sql, &[self.name_param()])
                .map_err(CoreError::from),
        )?;
        let keys: Vec<String> = cursor
            .into_rows()
            .into_iter()
            .filter_map(|row| row.text("id").map(str::to_string))
            .collect();
        self.inner.metrics.record_query(keys.len());
        Ok(keys)
    }

    /// Deletes every document in the collection. Returns how many were removed.
    pub fn clear(&self) -> CoreResult<u64> {
        self.delete_where(&Filter::all())
    }

    /// Deletes every document matching a parsed filter. Returns how many
    /// were removed.
    pub fn delete_where(&self, filter: &Filter) -> CoreResult<u64> {
        let Predicate { sql: predicate, mut params } = compile(filter, DATA_COLUMN)?;
        params.insert(0, self.name_param());
        let sql = format!(
            "DELETE FROM {} WHERE collection = ? AND ({predicate})",
            self.inner.table
        );
        let cursor = self.observe(self.inner.engine.exec(&sql, &params).map_err(CoreError::from))?;
        self.inner.metrics.record_delete();
        tracing::debug!(collection = %self.name(), removed = cursor.rows_written(), "delete where");
        Ok(cursor.rows_written())
    }

    fn name_param(&self) -> SqlValue {
        SqlValue::from(self.inner.name.as_str())
    }

    fn observe<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if result.is_err() {
            self.inner.metrics.record_error();
        }
        result
    }

    fn decode_document(&self, row: &Row) -> CoreResult<Document> {
        let id = row.text("id").unwrap_or_default().to_string();
        let text = row.text("data").unwrap_or("null");
        let data: Value = serde_json::from_str(text).map_err(|e| CoreError::Corrupted {
            collection: self.inner.name.clone(),
            id: id.clone(),
            message: e.to_string(),
        })?;
        Ok(Document {
            id,
            data,
            created_at: row.integer("created_at").unwrap_or(0),
            updated_at: row.integer("updated_at").unwrap_or(0),
        })
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("table", &self.inner.table)
            .finish_non_exhaustive()
    }
}

pub(crate) fn validate_id(id: &str) -> CoreResult<()> {
    if id.is_empty() {
        return Err(CoreError::invalid_id("id must be a non-empty string"));
    }
    Ok(())
}

pub(crate) fn validate_document(doc: &Value) -> CoreResult<()> {
    if !doc.is_object() {
        return Err(CoreError::invalid_document(format!(
            "expected a JSON object, got {}",
            type_name(doc)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::error::CoreError;
    use crate::query::{Filter, QueryOptions};
    use crate::store::Store;
    use serde_json::{json, Value};

    fn products(store: &Store) -> crate::Collection {
        let products = store.collection("products");
        for (id, name, price) in [
            ("p1", "Laptop", 999),
            ("p2", "Phone", 599),
            ("p3", "Headphones", 149),
            ("p4", "Keyboard", 299),
            ("p5", "Monitor", 399),
        ] {
            products
                .put(id, &json!({"name": name, "price": price, "tags": ["tech"]}))
                .unwrap();
        }
        products
    }

    #[test]
    fn put_get_roundtrip_preserves_nulls() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        let doc = json!({
            "a": null,
            "nested": {"b": [1, 2.5, "x", null, {"c": true}]},
            "s": "quote ' \" and unicode ✓"
        });
        docs.put("d1", &doc).unwrap();
        let back = docs.get("d1").unwrap().unwrap();
        assert_eq!(back, doc);
        assert!(back.as_object().unwrap().contains_key("a"));
    }

    #[test]
    fn put_get_roundtrip_preserves_float_bits() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        for (i, f) in [-986485355.4013916_f64, -130721546.84503305, 0.1 + 0.2, 1e-300]
            .into_iter()
            .enumerate()
        {
            let id = format!("f{i}");
            docs.put(&id, &json!({"a": [f]})).unwrap();
            let back = docs.get(&id).unwrap().unwrap();
            assert_eq!(back["a"][0].as_f64().unwrap().to_bits(), f.to_bits());
        }
    }

    #[test]
    fn put_is_full_replace() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("d1", &json!({"a": 1, "b": 2})).unwrap();
        docs.put("d1", &json!({"c": 3})).unwrap();
        assert_eq!(docs.get("d1").unwrap(), Some(json!({"c": 3})));
    }

    #[test]
    fn replace_keeps_created_at() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("d1", &json!({"v": 1})).unwrap();
        let first = docs.get_document("d1").unwrap().unwrap();
        docs.put("d1", &json!({"v": 2})).unwrap();
        let second = docs.get_document("d1").unwrap().unwrap();
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn put_rejects_bad_input() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");

        let err = docs.put("", &json!({})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidId { .. }));

        for bad in [Value::Null, json!([1, 2]), json!(3), json!("x")] {
            let err = docs.put("d1", &bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDocument { .. }));
        }
        assert!(!docs.has("d1").unwrap());
    }

    #[test]
    fn has_and_delete() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("d1", &json!({})).unwrap();
        assert!(docs.has("d1").unwrap());
        assert!(docs.delete("d1").unwrap());
        assert!(!docs.delete("d1").unwrap());
        assert!(!docs.has("d1").unwrap());
        assert_eq!(docs.get("d1").unwrap(), None);
    }

    #[test]
    fn collections_are_isolated() {
        let store = Store::open_in_memory().unwrap();
        store.collection("a").put("x", &json!({"v": 1})).unwrap();
        store.collection("b").put("x", &json!({"v": 2})).unwrap();
        assert_eq!(store.collection("a").get("x").unwrap(), Some(json!({"v": 1})));
        assert_eq!(store.collection("b").count(&Value::Null).unwrap(), 1);
        store.collection("a").clear().unwrap();
        assert_eq!(store.collection("b").get("x").unwrap(), Some(json!({"v": 2})));
    }

    #[test]
    fn find_price_greater_than() {
        let store = Store::open_in_memory().unwrap();
        let products = products(&store);
        let found = products
            .find(&json!({"price": {"$gt": 500}}), &QueryOptions::new())
            .unwrap();
        let prices: Vec<_> = found.iter().map(|d| d["price"].as_i64().unwrap()).collect();
        assert_eq!(prices, vec![999, 599]);
    }

    #[test]
    fn find_all_equals_list() {
        let store = Store::open_in_memory().unwrap();
        let products = products(&store);
        let all = products.find(&json!({}), &QueryOptions::new()).unwrap();
        let listed = products.list(&QueryOptions::new()).unwrap();
        assert_eq!(all, listed);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn sort_limit_offset() {
        let store = Store::open_in_memory().unwrap();
        let products = products(&store);

        let asc = products.list(&QueryOptions::new().sort("price")).unwrap();
        let prices: Vec<_> = asc.iter().map(|d| d["price"].as_i64().unwrap()).collect();
        assert_eq!(prices, vec![149, 299, 399, 599, 999]);

        let page = products
            .list(&QueryOptions::new().sort("-price").limit(2).offset(1))
            .unwrap();
        let prices: Vec<_> = page.iter().map(|d| d["price"].as_i64().unwrap()).collect();
        assert_eq!(prices, vec![599, 399]);

        let err = products.list(&QueryOptions::new().offset(1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQueryOptions { .. }));
    }

    #[test]
    fn operators_against_engine() {
        let store = Store::open_in_memory().unwrap();
        let products = products(&store);
        let count = |filter: Value| products.count(&filter).unwrap();

        assert_eq!(count(json!({"price": {"$gte": 299, "$lte": 599}})), 3);
        assert_eq!(count(json!({"price": {"$ne": 999}})), 4);
        assert_eq!(count(json!({"price": {"$in": [149, 999]}})), 2);
        assert_eq!(count(json!({"price": {"$in": []}})), 0);
        assert_eq!(count(json!({"price": {"$nin": [149, 999]}})), 3);
        assert_eq!(count(json!({"name": {"$regex": "^(Laptop|Phone)$"}})), 2);
        assert_eq!(count(json!({"name": {"$regex": "^laptop"}})), 0);
        assert_eq!(count(json!({"name": {"$regex": "(["}})), 0);
        assert_eq!(count(json!({"$or": [{"name": "Phone"}, {"price": 149}]})), 2);
        assert_eq!(count(json!({"$and": []})), 5);
        assert_eq!(count(json!({"$or": []})), 5);
        assert_eq!(count(json!({"tags": ["tech"]})), 5);
    }

    #[test]
    fn exists_covers_null_and_absent() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("a", &json!({"v": 1})).unwrap();
        docs.put("b", &json!({"v": null})).unwrap();
        docs.put("c", &json!({})).unwrap();

        assert_eq!(docs.count(&json!({"v": {"$exists": true}})).unwrap(), 1);
        assert_eq!(docs.count(&json!({"v": {"$exists": false}})).unwrap(), 2);
        assert_eq!(docs.count(&json!({"v": null})).unwrap(), 2);
    }

    #[test]
    fn unknown_operator_compares_literally() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("a", &json!({"v": {"$near": 3}})).unwrap();
        docs.put("b", &json!({"v": 3})).unwrap();
        let found = docs.find(&json!({"v": {"$near": 3}}), &QueryOptions::new()).unwrap();
        assert_eq!(found, vec![json!({"v": {"$near": 3}})]);
    }

    #[test]
    fn nested_object_equality_ignores_key_order() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("a", &json!({"meta": {"x": 1, "y": [1, 2]}})).unwrap();
        let n = docs.count(&json!({"meta": {"y": [1, 2], "x": 1}})).unwrap();
        assert_eq!(n, 1);
        let n = docs.count(&json!({"meta.y": [1, 2]})).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn equality_respects_json_types() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        docs.put("arr", &json!({"v": [1, 2]})).unwrap();
        docs.put("arr_text", &json!({"v": "[1,2]"})).unwrap();
        docs.put("obj", &json!({"v": {"a": 1}})).unwrap();
        docs.put("obj_text", &json!({"v": "{\"a\":1}"})).unwrap();
        docs.put("yes", &json!({"v": true})).unwrap();
        docs.put("one", &json!({"v": 1})).unwrap();
        docs.put("none", &json!({})).unwrap();

        let ids = |filter: Value| -> Vec<String> {
            docs.find_documents(&Filter::parse(&filter, false).unwrap(), &QueryOptions::new())
                .unwrap()
                .into_iter()
                .map(|doc| doc.id)
                .collect()
        };

        assert_eq!(ids(json!({"v": [1, 2]})), vec!["arr"]);
        assert_eq!(ids(json!({"v": "[1,2]"})), vec!["arr_text"]);
        assert_eq!(ids(json!({"v": {"a": 1}})), vec!["obj"]);
        assert_eq!(ids(json!({"v": "{\"a\":1}"})), vec!["obj_text"]);
        assert_eq!(ids(json!({"v": true})), vec!["yes"]);
        assert_eq!(ids(json!({"v": 1})), vec!["one"]);
        assert_eq!(ids(json!({"v": {"$in": [true, "[1,2]"]}})), vec!["arr_text", "yes"]);
        assert_eq!(
            ids(json!({"v": {"$ne": 1}})),
            vec!["arr", "arr_text", "obj", "obj_text", "yes", "none"]
        );
        assert_eq!(
            ids(json!({"v": {"$nin": [[1, 2], true]}})),
            vec!["arr_text", "obj", "obj_text", "one", "none"]
        );
    }

    #[test]
    fn keys_sorted_and_clear_counts() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        for id in ["b", "a", "c"] {
            docs.put(id, &json!({})).unwrap();
        }
        assert_eq!(docs.keys().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(docs.clear().unwrap(), 3);
        assert!(docs.keys().unwrap().is_empty());
    }

    #[test]
    fn invalid_field_names_rejected() {
        let store = Store::open_in_memory().unwrap();
        let docs = store.collection("docs");
        let err = docs.find(&json!({"a b": 1}), &QueryOptions::new()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFieldName { .. }));
        let err = docs
            .find(&Value::Null, &QueryOptions::new().sort("x)"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFieldName { .. }));

        for name in ["a..b", "a.", ".a"] {
            let mut filter = serde_json::Map::new();
            filter.insert(name.to_string(), json!(1));
            let err = docs.count(&Value::Object(filter)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidFieldName { .. }), "{name}");
        }
    }
}
