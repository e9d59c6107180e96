//! Storage engine trait definition.

use crate::cursor::Cursor;
use crate::error::StorageResult;
use crate::value::SqlValue;

/// A relational storage engine for GraphDoc.
///
/// Engines execute one statement at a time and serialize statements
/// issued against the same storage unit. GraphDoc owns all statement
/// text; engines do not understand collections or graph records.
///
/// # Invariants
///
/// - `params` are bound positionally (`?1`, `?2`, ...) and never
///   spliced into statement text
/// - Statements that return columns yield rows; others report the
///   number of rows they changed in [`Cursor::rows_written`]
/// - `json_extract(json, path)` is available in statement text
/// - `value REGEXP pattern` is available and never fails on a bad
///   pattern (it yields false)
/// - Engines must be `Send + Sync` so a store can be shared
///
/// # Implementors
///
/// - [`super::SqliteEngine`]
pub trait StorageEngine: Send + Sync {
    /// Executes a single statement with bound parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be prepared or fails,
    /// including constraint violations raised by the engine.
    fn exec(&self, sql: &str, params: &[SqlValue]) -> StorageResult<Cursor>;

    /// Executes a batch of parameterless statements, such as schema setup.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    fn exec_batch(&self, sql: &str) -> StorageResult<()>;
}
