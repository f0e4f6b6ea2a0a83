//! Database handle capability.

use crate::cursor::Cursor;
use crate::error::CrudResult;
use crate::value::SqlValue;

/// Bind placeholder syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` (SQLite, MySQL)
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
}

impl Placeholder {
    /// Render the placeholder for the 1-based parameter position `n`.
    pub fn render(self, n: usize) -> String {
        match self {
            Self::Question => "?".to_string(),
            Self::Numbered => format!("${n}"),
        }
    }
}

/// How INSERT learns the generated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Ask the execution result for the driver-assigned id.
    LastInsertId,
    /// Append `RETURNING <id>` and read the first row's single column.
    Returning,
}

/// SQL flavor of a database handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub placeholder: Placeholder,
    pub id_strategy: IdStrategy,
}

impl Dialect {
    pub const POSTGRES: Self = Self {
        placeholder: Placeholder::Numbered,
        id_strategy: IdStrategy::Returning,
    };

    pub const SQLITE: Self = Self {
        placeholder: Placeholder::Question,
        id_strategy: IdStrategy::LastInsertId,
    };

    pub const MYSQL: Self = Self {
        placeholder: Placeholder::Question,
        id_strategy: IdStrategy::LastInsertId,
    };
}

/// Outcome of [`Database::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Driver-assigned id of the last inserted row, if the driver reports one.
    pub last_insert_id: Option<i64>,
}

/// A database handle the writer and reader operate on.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`
/// (feature `postgres`) and [`SqliteClient`](crate::SqliteClient)
/// (feature `sqlite`). Anything exposing execute / prepare / query over
/// [`SqlValue`] parameters can implement it.
pub trait Database: Send + Sync {
    /// Row cursor returned by [`Database::query`].
    type Cursor: Cursor + Send;

    /// Placeholder syntax and id strategy.
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return the affected rows / last insert id.
    fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = CrudResult<ExecResult>> + Send;

    /// Prepare a statement without executing it.
    ///
    /// Surfaces syntax errors and unknown tables/columns early.
    fn prepare(&self, sql: &str) -> impl std::future::Future<Output = CrudResult<()>> + Send;

    /// Execute a query and return a cursor over its rows.
    fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = CrudResult<Self::Cursor>> + Send;
}
