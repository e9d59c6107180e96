//! Collection queries against the product catalog.

use graphdoc_core::{Config, CoreError, QueryOptions};
use graphdoc_testkit::prelude::*;
use serde_json::{json, Value};

fn ids(docs: &[Value]) -> Vec<&str> {
    docs.iter().filter_map(|d| d["name"].as_str()).collect()
}

#[test]
fn price_comparison() {
    let store = scenarios::product_catalog();
    let products = store.collection("products");

    let found = products
        .find(&json!({"price": {"$gt": 500}}), &QueryOptions::new())
        .unwrap();
    assert_eq!(ids(&found), vec!["Laptop", "Phone"]);

    let mid = products
        .find(
            &json!({"price": {"$gte": 299, "$lte": 599}}),
            &QueryOptions::new().sort("price"),
        )
        .unwrap();
    assert_eq!(ids(&mid), vec!["Monitor", "Speaker", "Phone"]);
}

#[test]
fn logical_operators() {
    let store = scenarios::product_catalog();
    let products = store.collection("products");

    let either = products
        .find(
            &json!({"$or": [{"category": "audio"}, {"price": {"$gt": 900}}]}),
            &QueryOptions::new().sort("name"),
        )
        .unwrap();
    assert_eq!(ids(&either), vec!["Headphones", "Laptop", "Speaker"]);

    let both = products
        .count(&json!({"$and": [{"category": "electronics"}, {"inStock": true}]}))
        .unwrap();
    assert_eq!(both, 3);

    assert_eq!(products.count(&json!({"$and": []})).unwrap(), 5);
    assert_eq!(products.count(&json!({"$or": []})).unwrap(), 5);
}

#[test]
fn membership_and_existence() {
    let store = scenarios::product_catalog();
    let products = store.collection("products");

    assert_eq!(
        products
            .count(&json!({"category": {"$in": ["audio", "toys"]}}))
            .unwrap(),
        2
    );
    assert_eq!(products.count(&json!({"category": {"$in": []}})).unwrap(), 0);
    assert_eq!(
        products
            .count(&json!({"category": {"$nin": ["audio"]}}))
            .unwrap(),
        3
    );
    assert_eq!(products.count(&json!({"discount": {"$exists": false}})).unwrap(), 5);
    assert_eq!(products.count(&json!({"price": {"$exists": true}})).unwrap(), 5);
}

#[test]
fn regex_is_case_sensitive() {
    let store = scenarios::product_catalog();
    let products = store.collection("products");

    assert_eq!(products.count(&json!({"name": {"$regex": "^Ph"}})).unwrap(), 1);
    assert_eq!(products.count(&json!({"name": {"$regex": "^ph"}})).unwrap(), 0);
    assert_eq!(products.count(&json!({"name": {"$regex": "("}})).unwrap(), 0);
}

#[test]
fn structural_equality_on_objects_and_arrays() {
    with_temp_store(|store| {
        let docs = store.collection("docs");
        docs.put("a", &json!({"meta": {"x": 1, "y": [1, 2]}})).unwrap();
        docs.put("b", &json!({"meta": {"x": 2}})).unwrap();

        let hits = docs
            .find(&json!({"meta": {"y": [1, 2], "x": 1}}), &QueryOptions::new())
            .unwrap();
        assert_eq!(hits, vec![json!({"meta": {"x": 1, "y": [1, 2]}})]);
    });
}

#[test]
fn unknown_operators_fall_through_to_literal() {
    with_temp_store(|store| {
        let docs = store.collection("docs");
        docs.put("odd", &json!({"v": {"$near": 3}})).unwrap();
        docs.put("plain", &json!({"v": 3})).unwrap();

        let hits = docs
            .find(&json!({"v": {"$near": 3}}), &QueryOptions::new())
            .unwrap();
        assert_eq!(hits, vec![json!({"v": {"$near": 3}})]);
    });
}

#[test]
fn strict_mode_rejects_unknown_operators() {
    let store = TestStore::memory_with_config(Config::new().strict_filters(true));
    let err = store
        .collection("docs")
        .find(&json!({"v": {"$near": 3}}), &QueryOptions::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownOperator { .. }));
}

#[test]
fn pagination() {
    let store = scenarios::populated_store("docs", 10);
    let docs = store.collection("docs");

    let page = docs
        .list(&QueryOptions::new().sort("-index").limit(3).offset(2))
        .unwrap();
    let indexes: Vec<_> = page.iter().map(|d| d["index"].as_i64().unwrap()).collect();
    assert_eq!(indexes, vec![7, 6, 5]);

    let err = docs.list(&QueryOptions::new().offset(2)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidQueryOptions { .. }));
}

#[test]
fn unsafe_names_are_rejected() {
    with_temp_store(|store| {
        let docs = store.collection("docs");
        docs.put("a", &json!({"v": 1})).unwrap();

        let err = docs
            .find(&json!({"v') OR 1=1 --": 1}), &QueryOptions::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFieldName { .. }));

        let err = docs
            .list(&QueryOptions::new().sort("v; DROP TABLE documents"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidFieldName { .. }));

        assert_eq!(docs.keys().unwrap(), vec!["a"]);
    });
}

#[test]
fn validation_happens_before_writes() {
    with_temp_store(|store| {
        let docs = store.collection("docs");
        for bad in [json!(null), json!([1, 2]), json!("text"), json!(7)] {
            let err = docs.put("x", &bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidDocument { .. }));
        }
        assert!(matches!(
            docs.put("", &json!({})),
            Err(CoreError::InvalidId { .. })
        ));
        assert!(store.collections().unwrap().is_empty());
    });
}

#[test]
fn collections_are_isolated() {
    with_temp_store(|store| {
        store.collection("a").put("k", &json!({"from": "a"})).unwrap();
        store.collection("b").put("k", &json!({"from": "b"})).unwrap();

        assert_eq!(store.collection("a").get("k").unwrap(), Some(json!({"from": "a"})));
        assert_eq!(store.collection("b").clear().unwrap(), 1);
        assert!(store.collection("a").has("k").unwrap());
    });
}

#[test]
fn file_store_persists_documents() {
    let test_store = TestStore::file();
    test_store
        .collection("docs")
        .put("a", &json!({"nested": {"list": [1, null, "x"]}}))
        .unwrap();
    let path = test_store.path().unwrap().to_path_buf();

    let reopened = graphdoc_core::Store::open_path(&path).unwrap();
    assert_eq!(
        reopened.collection("docs").get("a").unwrap(),
        Some(json!({"nested": {"list": [1, null, "x"]}}))
    );
}
