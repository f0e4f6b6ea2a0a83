//! SQLite handle over `rusqlite`.
//!
//! Statements run synchronously on the calling task; the connection sits
//! behind a mutex so one handle can be shared across tasks.

use crate::cursor::MemoryCursor;
use crate::db::{Database, Dialect, ExecResult};
use crate::error::{CrudError, CrudResult};
use crate::value::SqlValue;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A SQLite database handle.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Mutex<Connection>,
}

impl SqliteClient {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> CrudResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened sqlite database");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> CrudResult<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("opened in-memory sqlite database");
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> CrudResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CrudError::database("sqlite connection mutex poisoned"))
    }

    fn execute_sync(&self, sql: &str, params: &[SqlValue]) -> CrudResult<ExecResult> {
        let conn = self.lock()?;
        let changed = conn.execute(sql, params_from_iter(params.iter().map(Param)))?;

        Ok(ExecResult {
            rows_affected: changed as u64,
            last_insert_id: Some(conn.last_insert_rowid()),
        })
    }

    fn prepare_sync(&self, sql: &str) -> CrudResult<()> {
        let conn = self.lock()?;
        conn.prepare(sql)?;
        Ok(())
    }

    fn query_sync(&self, sql: &str, params: &[SqlValue]) -> CrudResult<MemoryCursor> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let width = stmt.column_count();
        let mut cursor = MemoryCursor::new(stmt.column_names());

        let mut rows = stmt.query(params_from_iter(params.iter().map(Param)))?;
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|i| from_value_ref(row.get_ref(i)?))
                .collect::<CrudResult<Vec<_>>>()?;
            cursor.push_row(values);
        }

        Ok(cursor)
    }
}

impl Database for SqliteClient {
    type Cursor = MemoryCursor;

    fn dialect(&self) -> Dialect {
        Dialect::SQLITE
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> CrudResult<ExecResult> {
        self.execute_sync(sql, params)
    }

    async fn prepare(&self, sql: &str) -> CrudResult<()> {
        self.prepare_sync(sql)
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> CrudResult<MemoryCursor> {
        self.query_sync(sql, params)
    }
}

/// Bind adapter: timestamps go in as RFC 3339 text, booleans as 0/1.
struct Param<'a>(&'a SqlValue);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self.0 {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            SqlValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            SqlValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            SqlValue::Timestamp(v) => ToSqlOutput::Owned(Value::Text(v.to_rfc3339())),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> CrudResult<SqlValue> {
    Ok(match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Int(v),
        ValueRef::Real(v) => SqlValue::Float(v),
        ValueRef::Text(bytes) => SqlValue::Text(
            std::str::from_utf8(bytes)
                .map_err(CrudError::database)?
                .to_string(),
        ),
        ValueRef::Blob(_) => return Err(CrudError::database("blob columns are not supported")),
    })
}
