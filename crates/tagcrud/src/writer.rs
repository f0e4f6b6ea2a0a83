//! INSERT and UPDATE derived from a record's field mapping.

use crate::config::CrudConfig;
use crate::cursor::{Cursor, CursorGuard, Slot};
use crate::db::{Database, Dialect, IdStrategy};
use crate::error::{CrudError, CrudResult};
use crate::record::Record;
use crate::tag::{self, FieldMeta};
use crate::value::SqlValue;

/// A rendered statement and its bind parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Read a mapped field as a bind parameter, applying the `unix` conversion.
///
/// A null (absent) timestamp is bound as-is.
fn bind_value<R: Record + ?Sized>(record: &R, meta: &FieldMeta) -> SqlValue {
    match record.get_field(meta.index) {
        SqlValue::Timestamp(t) if meta.unix => SqlValue::Int(t.timestamp()),
        value => value,
    }
}

/// Read the identity field. `Null` counts as zero.
fn identity_value<R: Record + ?Sized>(record: &R, meta: &FieldMeta) -> CrudResult<i64> {
    match record.get_field(meta.index) {
        SqlValue::Int(id) => Ok(id),
        SqlValue::Null => Ok(0),
        other => Err(CrudError::type_mismatch(meta.name, "integer", other.kind())),
    }
}

/// Render `INSERT INTO table (cols...) VALUES (...)` for every mapped column
/// except `id_column`.
///
/// Under [`IdStrategy::Returning`] a `RETURNING id_column` clause is appended
/// (unless `id_column` is empty).
pub fn build_insert<R: Record + ?Sized>(
    dialect: Dialect,
    table: &str,
    id_column: &str,
    record: &R,
) -> Statement {
    let map = tag::resolve(record);

    let mut columns = Vec::with_capacity(map.len());
    let mut placeholders = Vec::with_capacity(map.len());
    let mut params = Vec::with_capacity(map.len());

    for (column, meta) in map.iter() {
        if column == id_column {
            continue;
        }

        columns.push(column);
        params.push(bind_value(record, meta));
        placeholders.push(dialect.placeholder.render(params.len()));
    }

    let mut sql = if columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    if dialect.id_strategy == IdStrategy::Returning && !id_column.is_empty() {
        sql.push_str(" RETURNING ");
        sql.push_str(id_column);
    }

    Statement { sql, params }
}

/// Render `UPDATE table SET col = ph, ... WHERE id_column = ph`.
///
/// Fails with [`CrudError::MissingIdentity`] when the identity field is zero
/// or `id_column` is not mapped at all.
pub fn build_update<R: Record + ?Sized>(
    dialect: Dialect,
    table: &str,
    id_column: &str,
    record: &R,
) -> CrudResult<Statement> {
    let map = tag::resolve(record);

    let mut assignments = Vec::with_capacity(map.len());
    let mut params = Vec::with_capacity(map.len() + 1);
    let mut id = 0;

    for (column, meta) in map.iter() {
        if column == id_column {
            id = identity_value(record, meta)?;
        } else {
            params.push(bind_value(record, meta));
            assignments.push(format!(
                "{} = {}",
                column,
                dialect.placeholder.render(params.len())
            ));
        }
    }

    if id == 0 {
        return Err(CrudError::MissingIdentity {
            column: id_column.to_string(),
        });
    }

    if assignments.is_empty() {
        return Err(CrudError::NothingToUpdate {
            table: table.to_string(),
            id_column: id_column.to_string(),
        });
    }

    params.push(SqlValue::Int(id));
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        table,
        assignments.join(", "),
        id_column,
        dialect.placeholder.render(params.len())
    );

    Ok(Statement { sql, params })
}

/// Executes INSERT / UPDATE statements built from records.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    config: CrudConfig,
}

impl Writer {
    pub fn new(config: CrudConfig) -> Self {
        Self { config }
    }

    fn log(&self, op: &'static str, table: &str, stmt: &Statement) {
        tracing::debug!(
            target: "tagcrud.sql",
            op,
            table,
            params = stmt.params.len(),
            sql = %self.config.truncate_sql(&stmt.sql),
            "executing statement"
        );
    }

    /// Insert `record` into `table` and return the generated identity.
    ///
    /// The `id_column` is left out of the column list. Under
    /// [`IdStrategy::Returning`], an empty `id_column` or a statement that
    /// returns no row yields `0`.
    pub async fn insert<D, R>(
        &self,
        db: &D,
        table: &str,
        id_column: &str,
        record: &R,
    ) -> CrudResult<i64>
    where
        D: Database,
        R: Record + ?Sized,
    {
        let dialect = db.dialect();
        let stmt = build_insert(dialect, table, id_column, record);
        self.log("insert", table, &stmt);

        match dialect.id_strategy {
            IdStrategy::LastInsertId => {
                let result = db.execute(&stmt.sql, &stmt.params).await?;
                result.last_insert_id.ok_or_else(|| CrudError::NoInsertId {
                    table: table.to_string(),
                })
            }
            IdStrategy::Returning if id_column.is_empty() => {
                db.execute(&stmt.sql, &stmt.params).await?;
                Ok(0)
            }
            IdStrategy::Returning => {
                let cursor = db.query(&stmt.sql, &stmt.params).await?;
                read_returned_id(CursorGuard::new(cursor), id_column)
            }
        }
    }

    /// Update the row of `table` whose `id_column` equals the record's identity.
    pub async fn update<D, R>(
        &self,
        db: &D,
        table: &str,
        id_column: &str,
        record: &R,
    ) -> CrudResult<()>
    where
        D: Database,
        R: Record + ?Sized,
    {
        let stmt = build_update(db.dialect(), table, id_column, record)?;
        self.log("update", table, &stmt);

        db.execute(&stmt.sql, &stmt.params).await?;
        Ok(())
    }
}

/// Read the first column of the first returned row as the new identity.
fn read_returned_id<C: Cursor>(mut cursor: CursorGuard<C>, id_column: &str) -> CrudResult<i64> {
    if !cursor.next_row().map_err(CrudError::Database)? {
        return Ok(0);
    }

    let slots: Vec<Slot> = (0..cursor.columns().len())
        .map(|i| if i == 0 { Slot::Value } else { Slot::Discard })
        .collect();
    let columns = cursor.columns().to_vec();
    let values = cursor
        .scan_row(&slots)
        .map_err(|source| CrudError::Scan { columns, source })?;

    match values.into_iter().next() {
        Some(SqlValue::Int(id)) => Ok(id),
        Some(SqlValue::Null) | None => Ok(0),
        Some(other) => Err(CrudError::type_mismatch(id_column, "integer", other.kind())),
    }
}

/// Insert with the default [`Writer`]. See [`Writer::insert`].
pub async fn insert<D, R>(db: &D, table: &str, id_column: &str, record: &R) -> CrudResult<i64>
where
    D: Database,
    R: Record + ?Sized,
{
    Writer::default().insert(db, table, id_column, record).await
}

/// Update with the default [`Writer`]. See [`Writer::update`].
pub async fn update<D, R>(db: &D, table: &str, id_column: &str, record: &R) -> CrudResult<()>
where
    D: Database,
    R: Record + ?Sized,
{
    Writer::default().update(db, table, id_column, record).await
}
