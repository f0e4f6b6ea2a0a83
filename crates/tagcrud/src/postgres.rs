//! PostgreSQL support over `tokio-postgres`.
//!
//! [`Database`] is implemented for `tokio_postgres::Client` and
//! `tokio_postgres::Transaction`, so the writer and reader run inside a
//! transaction just as well as on a bare connection.
//!
//! Bind parameters are encoded against the types the server inferred for the
//! prepared statement: an [`SqlValue::Int`] bound to an `int4` column is sent
//! as `i32`, a timestamp bound to `timestamp` (without time zone) is sent as
//! its UTC wall-clock time.

use crate::cursor::{Cursor, Slot};
use crate::db::{Database, Dialect, ExecResult};
use crate::error::{BoxError, CrudResult};
use crate::value::SqlValue;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use tokio_postgres::{Row, Statement};

/// A bind parameter encoded according to the server-side parameter type.
#[derive(Debug)]
struct PgParam<'a>(&'a SqlValue);

fn encode<T: ToSql>(value: T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(format!("cannot bind {} as {ty}", std::any::type_name::<T>()).into());
    }
    value.to_sql(ty, out)
}

impl ToSql for PgParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self.0 {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Int(v) => match *ty {
                Type::INT2 => encode(i16::try_from(*v)?, ty, out),
                Type::INT4 => encode(i32::try_from(*v)?, ty, out),
                Type::FLOAT4 => encode(*v as f32, ty, out),
                Type::FLOAT8 => encode(*v as f64, ty, out),
                Type::BOOL => encode(*v != 0, ty, out),
                _ => encode(*v, ty, out),
            },
            SqlValue::Float(v) => match *ty {
                Type::FLOAT4 => encode(*v as f32, ty, out),
                _ => encode(*v, ty, out),
            },
            SqlValue::Text(v) => encode(v.as_str(), ty, out),
            SqlValue::Bool(v) => encode(*v, ty, out),
            SqlValue::Timestamp(v) => match *ty {
                Type::TIMESTAMP => encode(v.naive_utc(), ty, out),
                _ => encode(*v, ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// A cursor over the rows of a finished PostgreSQL query.
///
/// Values are decoded lazily, per [`Slot`], when a row is scanned.
#[derive(Debug)]
pub struct PgCursor {
    columns: Vec<String>,
    types: Vec<Type>,
    rows: Vec<Row>,
    current: Option<usize>,
    closed: bool,
}

impl PgCursor {
    fn new(statement: &Statement, rows: Vec<Row>) -> Self {
        Self {
            columns: statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            types: statement.columns().iter().map(|c| c.type_().clone()).collect(),
            rows,
            current: None,
            closed: false,
        }
    }
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, BoxError> {
    Ok(row.try_get::<_, Option<T>>(idx)?)
}

fn decode_value(row: &Row, idx: usize, ty: &Type) -> Result<SqlValue, BoxError> {
    let value = match *ty {
        Type::INT2 => get::<i16>(row, idx)?.map(|v| SqlValue::Int(v.into())),
        Type::INT4 => get::<i32>(row, idx)?.map(|v| SqlValue::Int(v.into())),
        Type::INT8 => get::<i64>(row, idx)?.map(SqlValue::Int),
        Type::OID => get::<u32>(row, idx)?.map(|v| SqlValue::Int(v.into())),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| SqlValue::Float(v.into())),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(SqlValue::Float),
        Type::BOOL => get::<bool>(row, idx)?.map(SqlValue::Bool),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx)?.map(SqlValue::Text)
        }
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx)?.map(SqlValue::Timestamp),
        Type::TIMESTAMP => {
            get::<NaiveDateTime>(row, idx)?.map(|v| SqlValue::Timestamp(v.and_utc()))
        }
        _ => return Err(format!("column {idx}: unsupported type {ty}").into()),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

fn decode_unix(row: &Row, idx: usize, ty: &Type) -> Result<SqlValue, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => decode_value(row, idx, ty),
        _ => Err(format!("column {idx}: cannot read {ty} as epoch seconds").into()),
    }
}

impl Cursor for PgCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<bool, BoxError> {
        if self.closed {
            return Err("cursor is closed".into());
        }
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn scan_row(&self, slots: &[Slot]) -> Result<Vec<SqlValue>, BoxError> {
        let row = self
            .current
            .and_then(|i| self.rows.get(i))
            .ok_or("scan called without a current row")?;

        if slots.len() != self.types.len() {
            return Err(format!(
                "expected {} destination slots, got {}",
                self.types.len(),
                slots.len()
            )
            .into());
        }

        slots
            .iter()
            .zip(&self.types)
            .enumerate()
            .map(|(idx, (slot, ty))| match slot {
                Slot::Discard => Ok(SqlValue::Null),
                Slot::Value => decode_value(row, idx, ty),
                Slot::UnixSeconds => decode_unix(row, idx, ty),
            })
            .collect()
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }
}

fn bind(params: &[SqlValue]) -> Vec<PgParam<'_>> {
    params.iter().map(PgParam).collect()
}

fn as_refs<'a>(params: &'a [PgParam<'a>]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

macro_rules! impl_database {
    ($ty:ty) => {
        impl Database for $ty {
            type Cursor = PgCursor;

            fn dialect(&self) -> Dialect {
                Dialect::POSTGRES
            }

            async fn execute(&self, sql: &str, params: &[SqlValue]) -> CrudResult<ExecResult> {
                let params = bind(params);
                let rows_affected = self.execute(sql, &as_refs(&params)).await?;
                Ok(ExecResult {
                    rows_affected,
                    last_insert_id: None,
                })
            }

            async fn prepare(&self, sql: &str) -> CrudResult<()> {
                self.prepare(sql).await?;
                Ok(())
            }

            async fn query(&self, sql: &str, params: &[SqlValue]) -> CrudResult<PgCursor> {
                let statement = self.prepare(sql).await?;
                let params = bind(params);
                let rows = self.query(&statement, &as_refs(&params)).await?;
                Ok(PgCursor::new(&statement, rows))
            }
        }
    };
}

impl_database!(tokio_postgres::Client);
impl_database!(tokio_postgres::Transaction<'_>);
