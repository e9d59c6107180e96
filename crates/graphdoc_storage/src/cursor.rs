//! Statement results.

use crate::value::SqlValue;
use std::sync::Arc;

/// One result row with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from shared column names and its values.
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Returns the value of the named column.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Returns the value at a column index.
    pub fn get_index(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// Returns the named column as text.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_text)
    }

    /// Returns the named column as an integer.
    pub fn integer(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_integer)
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Consumes the row, returning its values in column order.
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// The result of executing one statement.
///
/// Read statements fill `rows` and `rows_read`; write statements
/// (insert/update/delete/schema) report `rows_written`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    rows: Vec<Row>,
    rows_read: u64,
    rows_written: u64,
}

impl Cursor {
    /// Creates a cursor over read rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let rows_read = rows.len() as u64;
        Self {
            rows,
            rows_read,
            rows_written: 0,
        }
    }

    /// Creates a cursor for a write statement.
    pub fn written(rows_written: u64) -> Self {
        Self {
            rows: Vec::new(),
            rows_read: 0,
            rows_written,
        }
    }

    /// Consumes the cursor, returning every row.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Consumes the cursor, returning the first row if any.
    pub fn one(self) -> Option<Row> {
        self.rows.into_iter().next()
    }

    /// Returns the rows without consuming the cursor.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows the statement produced.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Number of rows the statement changed.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}
