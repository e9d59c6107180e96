//! Query options: sort, limit, offset.

use crate::error::{CoreError, CoreResult};
use crate::query::ident::{json_path, parse_sort};
use graphdoc_storage::SqlValue;

/// Sort, limit, and offset for `find` and `list`.
///
/// `sort` is a field name, ascending unless prefixed with `-`.
/// `offset` requires `limit`, because the engine needs a bound to skip
/// rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Sort token, e.g. `"price"` or `"-price"`.
    pub sort: Option<String>,
    /// Maximum number of documents returned.
    pub limit: Option<u64>,
    /// Number of matching documents skipped.
    pub offset: Option<u64>,
}

impl QueryOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sort token.
    #[must_use]
    pub fn sort(mut self, token: impl Into<String>) -> Self {
        self.sort = Some(token.into());
        self
    }

    /// Sets the limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Validates the options and renders the `ORDER BY ... LIMIT ... OFFSET`
    /// tail, appending limit and offset to `params`.
    ///
    /// Without a sort, documents come back in insertion order. Sorted
    /// results break ties by insertion order.
    pub(crate) fn render(&self, column: &str, params: &mut Vec<SqlValue>) -> CoreResult<String> {
        if self.offset.is_some() && self.limit.is_none() {
            return Err(CoreError::invalid_query_options("offset requires limit"));
        }

        let mut tail = match &self.sort {
            Some(token) => {
                let (field, descending) = parse_sort(token)?;
                format!(
                    " ORDER BY json_extract({column}, '{}') {}, rowid ASC",
                    json_path(field),
                    if descending { "DESC" } else { "ASC" }
                )
            }
            None => " ORDER BY rowid ASC".to_string(),
        };

        if let Some(limit) = self.limit {
            tail.push_str(" LIMIT ?");
            params.push(SqlValue::Integer(clamp(limit)));
            if let Some(offset) = self.offset {
                tail.push_str(" OFFSET ?");
                params.push(SqlValue::Integer(clamp(offset)));
            }
        }

        Ok(tail)
    }
}

fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
