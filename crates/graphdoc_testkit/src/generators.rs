//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random documents, identifiers,
//! and operation sequences.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

/// Strategy for generating valid field names (`[A-Za-z0-9_.]`, no empty
/// path segments).
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,11}(\\.[a-zA-Z_][a-zA-Z0-9_]{0,7}){0,2}")
        .expect("Invalid regex")
}

/// Strategy for generating field names containing at least one character
/// outside `[A-Za-z0-9_.]`. The bad character never comes first, so the
/// names are invalid as sort tokens too.
pub fn invalid_field_name_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-z]{1,6}").expect("Invalid regex"),
        prop::sample::select(vec![
            '\'', '"', '(', ')', ' ', ';', '-', '$', '[', ']', '*', '\n', 'é',
        ]),
        prop::string::string_regex("[a-z]{0,6}").expect("Invalid regex"),
    )
        .prop_map(|(head, bad, tail)| format!("{head}{bad}{tail}"))
}

/// Strategy for generating valid document ids.
pub fn document_id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-]{1,24}").expect("Invalid regex")
}

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating JSON scalars, including explicit nulls.
pub fn json_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9f64)
            .prop_filter_map("finite", Number::from_f64)
            .prop_map(Value::Number),
        ".{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for generating arbitrary JSON values nested up to `depth`
/// levels.
pub fn json_value_strategy(depth: u32) -> impl Strategy<Value = Value> {
    json_scalar_strategy().prop_recursive(depth, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for generating documents: JSON objects with arbitrary nested
/// content.
pub fn document_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-zA-Z_]{1,8}", json_value_strategy(3), 0..8)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

/// Strategy for generating flat documents with a numeric `n` field used
/// by the sort and pagination properties.
pub fn numbered_documents_strategy(max: usize) -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map("[a-z0-9]{1,10}", -1000i64..1000, 0..max)
        .prop_map(|m| m.into_iter().collect())
}

/// An operation against a single collection.
#[derive(Debug, Clone)]
pub enum DocumentOperation {
    /// Put a document
    Put {
        /// Document id
        id: String,
        /// Document body
        doc: Value,
    },
    /// Delete a document
    Delete {
        /// Document id
        id: String,
    },
    /// Get a document
    Get {
        /// Document id
        id: String,
    },
}

/// Strategy for generating document operations over a small id space so
/// that puts, gets, and deletes collide.
pub fn document_operation_strategy() -> impl Strategy<Value = DocumentOperation> {
    let id = prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(String::from);
    prop_oneof![
        3 => (id.clone(), document_strategy())
            .prop_map(|(id, doc)| DocumentOperation::Put { id, doc }),
        1 => id.clone().prop_map(|id| DocumentOperation::Delete { id }),
        2 => id.prop_map(|id| DocumentOperation::Get { id }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<DocumentOperation>> {
    prop::collection::vec(document_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
