//! Filter expressions.
//!
//! A filter is written as a JSON object in the familiar document-store
//! style and parsed into [`Filter`], a closed tree that the compiler
//! walks once:
//!
//! ```json
//! { "status": "active",
//!   "price": { "$gte": 100, "$lt": 500 },
//!   "$or": [ { "tags": { "$in": ["a", "b"] } }, { "name": { "$regex": "^W" } } ] }
//! ```
//!
//! A bare value is an implicit equality. An object value is an operator
//! object only when it is non-empty and every key is a known operator;
//! otherwise the whole object is compared structurally.

use crate::error::{CoreError, CoreResult};
use crate::query::ident::validate_field;
use serde_json::{Map, Value};

/// Ordering comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
}

impl ComparisonOp {
    /// Returns the SQL operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Set membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp {
    /// `$in`
    In,
    /// `$nin`
    NotIn,
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Bare value: `{ field: value }`.
    Implicit {
        /// Field path.
        field: String,
        /// Literal compared structurally.
        value: Value,
    },
    /// `$eq` / `$ne`.
    Equality {
        /// Field path.
        field: String,
        /// Literal operand.
        value: Value,
        /// True for `$ne`.
        negated: bool,
    },
    /// `$gt`, `$gte`, `$lt`, `$lte`.
    Comparison {
        /// Field path.
        field: String,
        /// Operator.
        op: ComparisonOp,
        /// Literal operand.
        value: Value,
    },
    /// `$in` / `$nin`.
    Membership {
        /// Field path.
        field: String,
        /// Operator.
        op: MembershipOp,
        /// Candidate literals.
        values: Vec<Value>,
    },
    /// `$exists`.
    Existence {
        /// Field path.
        field: String,
        /// Whether the field must be present and non-null.
        exists: bool,
    },
    /// `$regex`.
    Pattern {
        /// Field path.
        field: String,
        /// Regular expression, matched case-sensitively.
        pattern: String,
    },
    /// `$and`, or several conditions in one object.
    And(Vec<Filter>),
    /// `$or`.
    Or(Vec<Filter>),
}

const OPERATORS: &[&str] = &[
    "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin", "$exists", "$regex",
];

fn is_operator(key: &str) -> bool {
    OPERATORS.contains(&key)
}

impl Filter {
    /// A filter matching every document.
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Implicit equality on a field.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Implicit {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Conjunction of filters.
    pub fn and(children: Vec<Filter>) -> Self {
        Self::And(children)
    }

    /// Disjunction of filters.
    pub fn or(children: Vec<Filter>) -> Self {
        Self::Or(children)
    }

    /// Parses a JSON filter object. `null` matches everything.
    ///
    /// With `strict` set, an operator object holding a `$`-prefixed key that
    /// is not a known operator is rejected instead of being compared
    /// literally.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidFieldName`] for a key outside `[A-Za-z0-9_.]`
    /// - [`CoreError::InvalidQueryOptions`] if the filter, or a `$and`/`$or`
    ///   operand, has the wrong shape
    /// - [`CoreError::UnknownOperator`] in strict mode
    pub fn parse(value: &Value, strict: bool) -> CoreResult<Self> {
        match value {
            Value::Null => Ok(Self::all()),
            Value::Object(map) => Self::parse_object(map, strict),
            other => Err(CoreError::invalid_query_options(format!(
                "filter must be an object, got {}",
                type_name(other)
            ))),
        }
    }

    fn parse_object(map: &Map<String, Value>, strict: bool) -> CoreResult<Self> {
        let mut clauses = Vec::with_capacity(map.len());
        for (key, value) in map {
            let clause = match key.as_str() {
                "$and" => Self::And(Self::parse_children(key, value, strict)?),
                "$or" => Self::Or(Self::parse_children(key, value, strict)?),
                field => {
                    validate_field(field)?;
                    Self::parse_field(field, value, strict)?
                }
            };
            clauses.push(clause);
        }

        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Self::And(clauses))
        }
    }

    fn parse_children(key: &str, value: &Value, strict: bool) -> CoreResult<Vec<Self>> {
        let items = value.as_array().ok_or_else(|| {
            CoreError::invalid_query_options(format!("{key} expects an array of filters"))
        })?;
        items.iter().map(|item| Self::parse(item, strict)).collect()
    }

    fn parse_field(field: &str, value: &Value, strict: bool) -> CoreResult<Self> {
        let ops = match value {
            Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| is_operator(k)) => ops,
            Value::Object(ops) => {
                if strict {
                    if let Some(bad) = ops.keys().find(|k| k.starts_with('$') && !is_operator(k)) {
                        return Err(CoreError::UnknownOperator {
                            operator: bad.clone(),
                        });
                    }
                }
                return Ok(Self::eq(field, value.clone()));
            }
            _ => return Ok(Self::eq(field, value.clone())),
        };

        let mut clauses = Vec::with_capacity(ops.len());
        for (op, operand) in ops {
            let field = field.to_string();
            let clause = match op.as_str() {
                "$eq" | "$ne" => Self::Equality {
                    field,
                    value: operand.clone(),
                    negated: op == "$ne",
                },
                "$gt" => Self::comparison(field, ComparisonOp::Gt, operand),
                "$gte" => Self::comparison(field, ComparisonOp::Gte, operand),
                "$lt" => Self::comparison(field, ComparisonOp::Lt, operand),
                "$lte" => Self::comparison(field, ComparisonOp::Lte, operand),
                "$in" | "$nin" => Self::Membership {
                    field,
                    op: if op == "$in" {
                        MembershipOp::In
                    } else {
                        MembershipOp::NotIn
                    },
                    values: match operand {
                        Value::Array(items) => items.clone(),
                        single => vec![single.clone()],
                    },
                },
                "$exists" => Self::Existence {
                    field,
                    exists: truthy(operand),
                },
                // "$regex", the only operator left
                _ => Self::Pattern {
                    field,
                    pattern: match operand {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                },
            };
            clauses.push(clause);
        }

        if clauses.len() == 1 {
            Ok(clauses.remove(0))
        } else {
            Ok(Self::And(clauses))
        }
    }

    fn comparison(field: String, op: ComparisonOp, operand: &Value) -> Self {
        Self::Comparison {
            field,
            op,
            value: operand.clone(),
        }
    }

    /// Rewrites every field path as `prefix.field`.
    ///
    /// Used to scope a caller's filter to a nested object, such as the
    /// `data` of a thing.
    #[must_use]
    pub fn prefixed(self, prefix: &str) -> Self {
        let join = |field: String| format!("{prefix}.{field}");
        match self {
            Self::Implicit { field, value } => Self::Implicit {
                field: join(field),
                value,
            },
            Self::Equality {
                field,
                value,
                negated,
            } => Self::Equality {
                field: join(field),
                value,
                negated,
            },
            Self::Comparison { field, op, value } => Self::Comparison {
                field: join(field),
                op,
                value,
            },
            Self::Membership { field, op, values } => Self::Membership {
                field: join(field),
                op,
                values,
            },
            Self::Existence { field, exists } => Self::Existence {
                field: join(field),
                exists,
            },
            Self::Pattern { field, pattern } => Self::Pattern {
                field: join(field),
                pattern,
            },
            Self::And(children) => {
                Self::And(children.into_iter().map(|c| c.prefixed(prefix)).collect())
            }
            Self::Or(children) => {
                Self::Or(children.into_iter().map(|c| c.prefixed(prefix)).collect())
            }
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
