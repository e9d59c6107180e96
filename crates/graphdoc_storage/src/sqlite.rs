//! SQLite storage engine.

use crate::cursor::{Cursor, Row};
use crate::engine::StorageEngine;
use crate::error::{StorageError, StorageResult};
use crate::value::SqlValue;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Connection settings applied when a SQLite engine is opened.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// Journal mode (`WAL`, `DELETE`, `MEMORY`, ...). Ignored for in-memory engines.
    pub journal_mode: String,

    /// `synchronous` pragma (`FULL`, `NORMAL`, `OFF`).
    pub synchronous: String,

    /// How long a statement waits on a locked database file.
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl SqliteOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the journal mode.
    #[must_use]
    pub fn journal_mode(mut self, mode: impl Into<String>) -> Self {
        self.journal_mode = mode.into();
        self
    }

    /// Sets the `synchronous` pragma.
    #[must_use]
    pub fn synchronous(mut self, value: impl Into<String>) -> Self {
        self.synchronous = value.into();
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// A storage engine backed by one SQLite connection.
///
/// The connection sits behind a mutex, so statements from any number of
/// threads are executed one at a time against the storage unit.
///
/// # Example
///
/// ```rust
/// use graphdoc_storage::{SqliteEngine, StorageEngine};
///
/// let engine = SqliteEngine::open_in_memory().unwrap();
/// let row = engine
///     .exec("SELECT json_extract('{\"a\":{\"b\":2}}', '$.a.b') AS v", &[])
///     .unwrap()
///     .one()
///     .unwrap();
/// assert_eq!(row.integer("v"), Some(2));
/// ```
pub struct SqliteEngine {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteEngine {
    /// Opens (or creates) a database file with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or configured.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_options(path, SqliteOptions::default())
    }

    /// Opens (or creates) a database file with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or configured.
    pub fn open_with_options(path: impl AsRef<Path>, options: SqliteOptions) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        let mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            options.journal_mode.as_str(),
            |row| row.get(0),
        )?;
        conn.pragma_update(None, "synchronous", options.synchronous.as_str())?;
        conn.busy_timeout(options.busy_timeout)?;
        register_regexp(&conn)?;

        tracing::debug!(path = %path.display(), journal_mode = %mode, "opened sqlite engine");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be created.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        register_regexp(&conn)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    /// Returns the database file path, or `None` for in-memory engines.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }

    /// Closes the connection. Later statements fail with [`StorageError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite refuses to close the connection.
    pub fn close(&self) -> StorageResult<()> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
        }
        Ok(())
    }
}

impl StorageEngine for SqliteEngine {
    fn exec(&self, sql: &str, params: &[SqlValue]) -> StorageResult<Cursor> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StorageError::Closed)?;
        tracing::trace!(sql, params = params.len(), "exec");
        Ok(run_statement(conn, sql, params)?)
    }

    fn exec_batch(&self, sql: &str) -> StorageResult<()> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StorageError::Closed)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn run_statement(conn: &Connection, sql: &str, params: &[SqlValue]) -> rusqlite::Result<Cursor> {
    let mut stmt = conn.prepare_cached(sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        let changed = stmt.execute(params_from_iter(params.iter()))?;
        return Ok(Cursor::written(changed as u64));
    }

    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(SqlValue::from_value_ref(row.get_ref(idx)?));
        }
        out.push(Row::new(Arc::clone(&columns), values));
    }

    Ok(Cursor::from_rows(out))
}

/// Registers `regexp(pattern, value)`, which backs `value REGEXP pattern`.
///
/// Matching is case-sensitive. A NULL value or an invalid pattern yields
/// false instead of an error. Compiled patterns are cached per statement.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex = match ctx.get_or_create_aux(0, |vr| -> Result<Regex, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            }) {
                Ok(regex) => regex,
                Err(_) => return Ok(false),
            };

            let matched = match ctx.get_raw(1) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map(|text| regex.is_match(text))
                    .unwrap_or(false),
                ValueRef::Integer(i) => regex.is_match(&i.to_string()),
                ValueRef::Real(f) => regex.is_match(&f.to_string()),
                ValueRef::Null | ValueRef::Blob(_) => false,
            };
            Ok(matched)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine_with_table() -> SqliteEngine {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .exec_batch("CREATE TABLE t (id TEXT PRIMARY KEY, body TEXT NOT NULL)")
            .unwrap();
        engine
    }

    #[test]
    fn write_reports_rows_written() {
        let engine = engine_with_table();
        let cursor = engine
            .exec(
                "INSERT INTO t (id, body) VALUES (?1, ?2)",
                &[SqlValue::from("a"), SqlValue::from("{}")],
            )
            .unwrap();
        assert_eq!(cursor.rows_written(), 1);

        let cursor = engine.exec("DELETE FROM t WHERE id = ?1", &[SqlValue::from("zz")]).unwrap();
        assert_eq!(cursor.rows_written(), 0);
    }

    #[test]
    fn read_returns_named_rows() {
        let engine = engine_with_table();
        for id in ["a", "b"] {
            engine
                .exec(
                    "INSERT INTO t (id, body) VALUES (?1, ?2)",
                    &[SqlValue::from(id), SqlValue::from("{\"n\":1}")],
                )
                .unwrap();
        }

        let cursor = engine.exec("SELECT id FROM t ORDER BY id", &[]).unwrap();
        assert_eq!(cursor.rows_read(), 2);
        let ids: Vec<_> = cursor
            .into_rows()
            .iter()
            .map(|r| r.text("id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn json_extract_available() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let row = engine
            .exec(
                "SELECT json_extract(?1, '$.a.b') AS v",
                &[SqlValue::from("{\"a\":{\"b\":\"deep\"}}")],
            )
            .unwrap()
            .one()
            .unwrap();
        assert_eq!(row.text("v"), Some("deep"));
    }

    fn regexp(engine: &SqliteEngine, value: SqlValue, pattern: &str) -> i64 {
        engine
            .exec("SELECT (?1 REGEXP ?2) AS m", &[value, SqlValue::from(pattern)])
            .unwrap()
            .one()
            .unwrap()
            .integer("m")
            .unwrap()
    }

    #[test]
    fn regexp_is_case_sensitive() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        assert_eq!(regexp(&engine, SqlValue::from("Widget"), "^Wid"), 1);
        assert_eq!(regexp(&engine, SqlValue::from("widget"), "^Wid"), 0);
    }

    #[test]
    fn regexp_invalid_pattern_is_no_match() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        assert_eq!(regexp(&engine, SqlValue::from("abc"), "(unclosed"), 0);
    }

    #[test]
    fn regexp_null_and_numbers() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let row = engine
            .exec("SELECT (NULL REGEXP 'a') AS m", &[])
            .unwrap()
            .one()
            .unwrap();
        // NULL operand short-circuits to NULL, which filters like false.
        assert!(row.integer("m").unwrap_or(0) == 0);
        assert_eq!(regexp(&engine, SqlValue::Integer(12345), "^123"), 1);
    }

    #[test]
    fn constraint_violation_propagates() {
        let engine = engine_with_table();
        let insert = "INSERT INTO t (id, body) VALUES (?1, ?2)";
        engine
            .exec(insert, &[SqlValue::from("a"), SqlValue::from("{}")])
            .unwrap();
        let err = engine
            .exec(insert, &[SqlValue::from("a"), SqlValue::from("{}")])
            .unwrap_err();
        assert!(matches!(err, StorageError::Sqlite(_)));
    }

    #[test]
    fn closed_engine_rejects_statements() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine.close().unwrap();
        assert!(engine.is_closed());
        assert!(matches!(engine.exec("SELECT 1", &[]), Err(StorageError::Closed)));
    }

    #[test]
    fn file_engine_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("unit.db");
        {
            let engine = SqliteEngine::open(&path).unwrap();
            engine.exec_batch("CREATE TABLE t (v INTEGER)").unwrap();
            engine.exec("INSERT INTO t (v) VALUES (?1)", &[SqlValue::Integer(9)]).unwrap();
            assert_eq!(engine.path(), Some(path.as_path()));
        }
        let engine = SqliteEngine::open(&path).unwrap();
        let row = engine.exec("SELECT v FROM t", &[]).unwrap().one().unwrap();
        assert_eq!(row.integer("v"), Some(9));
    }
}
