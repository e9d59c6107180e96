//! Filter compilation.
//!
//! Turns a [`Filter`] into a where-clause fragment plus the ordered list
//! of values bound to its `?` placeholders. Literals are always bound;
//! only validated field paths are written into the fragment.

use crate::error::CoreResult;
use crate::query::filter::{Filter, MembershipOp};
use crate::query::ident::{json_path, validate_field};
use graphdoc_storage::SqlValue;
use serde_json::Value;

/// A compiled where-clause fragment and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Fragment using anonymous `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub params: Vec<SqlValue>,
}

impl Predicate {
    fn constant(truth: bool) -> Self {
        Self {
            sql: if truth { "1" } else { "0" }.to_string(),
            params: Vec::new(),
        }
    }
}

/// Compiles a filter against the JSON column `column`.
///
/// # Errors
///
/// Returns [`crate::CoreError::InvalidFieldName`] if a field path in the
/// tree is unsafe. Filters built by [`Filter::parse`] are already valid.
pub fn compile(filter: &Filter, column: &str) -> CoreResult<Predicate> {
    let mut compiler = Compiler {
        column,
        params: Vec::new(),
    };
    let sql = compiler.visit(filter)?;
    Ok(Predicate {
        sql,
        params: compiler.params,
    })
}

struct Compiler<'a> {
    column: &'a str,
    params: Vec<SqlValue>,
}

impl Compiler<'_> {
    fn visit(&mut self, filter: &Filter) -> CoreResult<String> {
        match filter {
            Filter::Implicit { field, value } => self.equality(field, value, false),
            Filter::Equality {
                field,
                value,
                negated,
            } => self.equality(field, value, *negated),
            Filter::Comparison { field, op, value } => {
                let extract = self.extract(field)?;
                let placeholder = self.bind(value);
                Ok(format!("{extract} {} {placeholder}", op.as_sql()))
            }
            Filter::Membership { field, op, values } => self.membership(field, *op, values),
            Filter::Existence { field, exists } => {
                let extract = self.extract(field)?;
                let test = if *exists { "IS NOT NULL" } else { "IS NULL" };
                Ok(format!("{extract} {test}"))
            }
            Filter::Pattern { field, pattern } => {
                let extract = self.extract(field)?;
                self.params.push(SqlValue::Text(pattern.clone()));
                Ok(format!("{extract} REGEXP ?"))
            }
            Filter::And(children) => self.combine(children, " AND "),
            Filter::Or(children) => self.combine(children, " OR "),
        }
    }

    fn combine(&mut self, children: &[Filter], joiner: &str) -> CoreResult<String> {
        // An empty conjunction or disjunction matches everything.
        if children.is_empty() {
            return Ok(Predicate::constant(true).sql);
        }
        let parts = children
            .iter()
            .map(|child| self.visit(child).map(|sql| format!("({sql})")))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(parts.join(joiner))
    }

    fn equality(&mut self, field: &str, value: &Value, negated: bool) -> CoreResult<String> {
        if value.is_null() {
            let extract = self.extract(field)?;
            let test = if negated { "IS NOT NULL" } else { "IS NULL" };
            return Ok(format!("{extract} {test}"));
        }
        let matches = self.typed_match(field, value)?;
        if negated {
            Ok(negate(&matches))
        } else {
            Ok(matches)
        }
    }

    fn membership(&mut self, field: &str, op: MembershipOp, values: &[Value]) -> CoreResult<String> {
        let extract = self.extract(field)?;
        let mut parts = Vec::with_capacity(values.len());
        for value in values {
            if value.is_null() {
                parts.push(format!("{extract} IS NULL"));
            } else {
                parts.push(self.typed_match(field, value)?);
            }
        }

        let any = match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(
                parts
                    .iter()
                    .map(|part| format!("({part})"))
                    .collect::<Vec<_>>()
                    .join(" OR "),
            ),
        };
        let sql = match (op, any) {
            (MembershipOp::In, None) => Predicate::constant(false).sql,
            (MembershipOp::NotIn, None) => Predicate::constant(true).sql,
            (MembershipOp::In, Some(any)) => any,
            (MembershipOp::NotIn, Some(any)) => negate(&any),
        };
        Ok(sql)
    }

    /// Structural equality against a non-null literal.
    ///
    /// `json_extract` returns strings, arrays, and objects all as SQL text
    /// and booleans as integers, so the JSON type of the field is checked
    /// alongside the value. The result is NULL when the field is absent.
    fn typed_match(&mut self, field: &str, value: &Value) -> CoreResult<String> {
        let extract = self.extract(field)?;
        let json_type = format!("json_type({}, '{}')", self.column, json_path(field));
        let sql = match value {
            Value::Bool(true) => format!("{json_type} = 'true'"),
            Value::Bool(false) => format!("{json_type} = 'false'"),
            Value::Number(_) => {
                let placeholder = self.bind(value);
                format!("{json_type} IN ('integer', 'real') AND {extract} = {placeholder}")
            }
            Value::String(_) => {
                let placeholder = self.bind(value);
                format!("{json_type} = 'text' AND {extract} = {placeholder}")
            }
            Value::Array(_) => {
                let placeholder = self.bind(value);
                format!("{json_type} = 'array' AND {extract} = {placeholder}")
            }
            Value::Object(_) => {
                let placeholder = self.bind(value);
                format!("{json_type} = 'object' AND {extract} = {placeholder}")
            }
            Value::Null => format!("{extract} IS NULL"),
        };
        Ok(sql)
    }

    fn extract(&self, field: &str) -> CoreResult<String> {
        validate_field(field)?;
        Ok(format!("json_extract({}, '{}')", self.column, json_path(field)))
    }

    /// Binds a literal and returns its placeholder expression.
    ///
    /// Objects and arrays are bound as JSON text and normalized with
    /// `json(?)` so they compare equal to what `json_extract` returns.
    fn bind(&mut self, value: &Value) -> String {
        match value {
            Value::Object(_) | Value::Array(_) => {
                self.params.push(SqlValue::Text(value.to_string()));
                "json(?)".to_string()
            }
            scalar => {
                self.params.push(scalar_param(scalar));
                "?".to_string()
            }
        }
    }
}

/// Negates a match that may be NULL for an absent field, so that absent
/// fields satisfy the negation.
fn negate(matches: &str) -> String {
    format!("NOT COALESCE({matches}, 0)")
}

/// Converts a JSON scalar to the value `json_extract` would produce for it.
fn scalar_param(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::from(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Object(_) | Value::Array(_) => SqlValue::Text(value.to_string()),
    }
}
