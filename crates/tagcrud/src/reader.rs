//! Scanning result rows into records.
//!
//! One row can fill several records at once. A string argument sets a
//! column-name prefix for the next record only:
//!
//! ```ignore
//! // SELECT u.id AS user_id, p.id AS post_id, ... FROM users u JOIN posts p ...
//! let mut user = User::default();
//! let mut post = Post::default();
//! while cursor.next_row()? {
//!     tagcrud::scan(&cursor, tagcrud::scan_args!["user_", &mut user, "post_", &mut post])?;
//! }
//! ```
//!
//! Result columns without a mapped field are discarded; mapped fields
//! missing from the result, or whose column is NULL, are left untouched.
//! [`CrudConfig::strict`] turns unmapped columns and missing fields into an
//! error.

use crate::config::{CrudConfig, DuplicateColumns};
use crate::cursor::{Cursor, CursorGuard, Slot};
use crate::db::Database;
use crate::error::{CrudError, CrudResult};
use crate::record::Record;
use crate::tag::{self, FieldMeta};
use crate::value::{self, SqlValue};
use indexmap::IndexMap;

/// One argument of [`scan`]: a record to fill, or the prefix for the next record.
pub enum ScanArg<'a> {
    Prefix(&'a str),
    Record(&'a mut dyn Record),
}

impl<'a> From<&'a str> for ScanArg<'a> {
    fn from(prefix: &'a str) -> Self {
        Self::Prefix(prefix)
    }
}

impl<'a, R: Record + 'a> From<&'a mut R> for ScanArg<'a> {
    fn from(record: &'a mut R) -> Self {
        Self::Record(record)
    }
}

/// Build an array of [`ScanArg`]s from records and prefix strings.
#[macro_export]
macro_rules! scan_args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::ScanArg::from($arg)),*]
    };
}

/// Where a result column goes.
#[derive(Debug, Clone, Copy)]
struct Binding {
    target: usize,
    meta: FieldMeta,
}

/// Extracts rows into records.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: CrudConfig,
}

impl Scanner {
    pub fn new(config: CrudConfig) -> Self {
        Self { config }
    }

    /// Fill the given records from the cursor's current row.
    ///
    /// The caller drives [`Cursor::next_row`] and releases the cursor.
    pub fn scan<'a, C, I>(&self, cursor: &C, args: I) -> CrudResult<()>
    where
        C: Cursor + ?Sized,
        I: IntoIterator<Item = ScanArg<'a>>,
    {
        let mut targets: Vec<&'a mut dyn Record> = Vec::new();
        let mut bindings: IndexMap<String, Binding> = IndexMap::new();
        let mut prefix = "";

        for arg in args {
            let record = match arg {
                ScanArg::Prefix(p) => {
                    prefix = p;
                    continue;
                }
                ScanArg::Record(record) => record,
            };

            let target = targets.len();
            for (column, meta) in tag::resolve(&*record).iter() {
                let column = format!("{prefix}{column}");
                let binding = Binding {
                    target,
                    meta: *meta,
                };

                match self.config.duplicate_columns {
                    _ if !bindings.contains_key(&column) => {
                        bindings.insert(column, binding);
                    }
                    DuplicateColumns::FirstWins => {}
                    DuplicateColumns::LastWins => {
                        bindings.insert(column, binding);
                    }
                    DuplicateColumns::Error => return Err(CrudError::DuplicateColumn(column)),
                }
            }

            targets.push(record);
            prefix = "";
        }

        let columns = cursor.columns();

        if self.config.strict {
            check_strict(columns, &bindings)?;
        }

        let slots: Vec<Slot> = columns
            .iter()
            .map(|column| match bindings.get(column) {
                Some(b) if b.meta.unix => Slot::UnixSeconds,
                Some(_) => Slot::Value,
                None => Slot::Discard,
            })
            .collect();

        let values = cursor.scan_row(&slots).map_err(|source| {
            tracing::warn!(columns = ?columns, error = %source, "scan failed");
            CrudError::Scan {
                columns: columns.to_vec(),
                source,
            }
        })?;

        for (column, value) in columns.iter().zip(values) {
            let Some(binding) = bindings.get(column) else {
                continue;
            };
            // NULL keeps whatever the field held before.
            if value.is_null() {
                continue;
            }
            let record = &mut *targets[binding.target];

            if binding.meta.unix {
                write_unix(record, &binding.meta, value)?;
            } else {
                record.set_field(binding.meta.index, value)?;
            }
        }

        Ok(())
    }

    /// Drain the cursor into `out`, one fresh `T` per row.
    ///
    /// The cursor is released on every exit path. On a mid-stream error, the
    /// rows scanned so far stay in `out`.
    pub fn scan_all<T, C>(&self, cursor: C, out: &mut Vec<T>) -> CrudResult<()>
    where
        T: Record + Default,
        C: Cursor,
    {
        let mut cursor = CursorGuard::new(cursor);

        while cursor.next_row().map_err(CrudError::Database)? {
            let mut record = T::default();
            self.scan(&*cursor, [ScanArg::from(&mut record)])?;
            out.push(record);
        }

        Ok(())
    }

    /// Run `sql` and scan every row into a `T`.
    pub async fn query_all<D, T>(
        &self,
        db: &D,
        sql: &str,
        params: &[SqlValue],
    ) -> CrudResult<Vec<T>>
    where
        D: Database,
        T: Record + Default,
    {
        tracing::debug!(
            target: "tagcrud.sql",
            op = "query",
            params = params.len(),
            sql = %self.config.truncate_sql(sql),
            "executing statement"
        );

        let cursor = db.query(sql, params).await?;
        let mut out = Vec::new();
        self.scan_all(cursor, &mut out)?;
        Ok(out)
    }
}

fn check_strict(columns: &[String], bindings: &IndexMap<String, Binding>) -> CrudResult<()> {
    let unmapped_columns: Vec<String> = columns
        .iter()
        .filter(|c| !bindings.contains_key(*c))
        .cloned()
        .collect();
    let missing_fields: Vec<String> = bindings
        .keys()
        .filter(|k| !columns.contains(*k))
        .cloned()
        .collect();

    if unmapped_columns.is_empty() && missing_fields.is_empty() {
        return Ok(());
    }

    Err(CrudError::Unmatched {
        unmapped_columns,
        missing_fields,
    })
}

/// Rebuild a timestamp from epoch seconds.
///
/// Whether the field can hold a timestamp is only known once a non-NULL
/// value arrives.
fn write_unix(record: &mut dyn Record, meta: &FieldMeta, value: SqlValue) -> CrudResult<()> {
    let SqlValue::Int(secs) = value else {
        return Err(CrudError::type_mismatch(
            meta.name,
            "epoch seconds",
            value.kind(),
        ));
    };

    let ts = value::from_unix_seconds(secs).ok_or_else(|| {
        CrudError::type_mismatch(meta.name, "epoch seconds", "out-of-range integer")
    })?;

    record
        .set_field(meta.index, SqlValue::Timestamp(ts))
        .map_err(|err| match err {
            CrudError::Decode { source, .. } => {
                CrudError::type_mismatch(meta.name, source.expected, "timestamp")
            }
            other => other,
        })
}

/// Scan with the default [`Scanner`]. See [`Scanner::scan`].
pub fn scan<'a, C, I>(cursor: &C, args: I) -> CrudResult<()>
where
    C: Cursor + ?Sized,
    I: IntoIterator<Item = ScanArg<'a>>,
{
    Scanner::default().scan(cursor, args)
}

/// Scan every row with the default [`Scanner`]. See [`Scanner::scan_all`].
pub fn scan_all<T, C>(cursor: C, out: &mut Vec<T>) -> CrudResult<()>
where
    T: Record + Default,
    C: Cursor,
{
    Scanner::default().scan_all(cursor, out)
}

/// Query and scan with the default [`Scanner`]. See [`Scanner::query_all`].
pub async fn query_all<D, T>(db: &D, sql: &str, params: &[SqlValue]) -> CrudResult<Vec<T>>
where
    D: Database,
    T: Record + Default,
{
    Scanner::default().query_all(db, sql, params).await
}

#[cfg(test)]
mod tests;
