//! Result cursor capability.

use crate::error::BoxError;
use crate::value::SqlValue;
use std::ops::{Deref, DerefMut};

/// What the bulk extraction should produce for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Not mapped: skip decoding, yield `Null`.
    Discard,
    /// Decode the column into its natural [`SqlValue`].
    Value,
    /// Decode the column as nullable epoch seconds (`Int` or `Null`).
    UnixSeconds,
}

/// A sequential reader over query results.
///
/// The cursor starts before the first row; call [`Cursor::next_row`] before
/// each [`Cursor::scan_row`].
pub trait Cursor {
    /// Column names of the result, in result order.
    fn columns(&self) -> &[String];

    /// Advance to the next row. Returns `false` when exhausted.
    fn next_row(&mut self) -> Result<bool, BoxError>;

    /// Extract the current row, one value per column, as directed by `slots`.
    ///
    /// `slots` has exactly one entry per column.
    fn scan_row(&self, slots: &[Slot]) -> Result<Vec<SqlValue>, BoxError>;

    /// Release the cursor. Calling it more than once has no effect.
    fn close(&mut self) {}
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn columns(&self) -> &[String] {
        (**self).columns()
    }

    fn next_row(&mut self) -> Result<bool, BoxError> {
        (**self).next_row()
    }

    fn scan_row(&self, slots: &[Slot]) -> Result<Vec<SqlValue>, BoxError> {
        (**self).scan_row(slots)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Releases the wrapped cursor when dropped.
#[derive(Debug)]
pub struct CursorGuard<C: Cursor> {
    cursor: C,
}

impl<C: Cursor> CursorGuard<C> {
    pub fn new(cursor: C) -> Self {
        Self { cursor }
    }
}

impl<C: Cursor> Deref for CursorGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.cursor
    }
}

impl<C: Cursor> DerefMut for CursorGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: Cursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// A cursor over rows already held in memory.
///
/// Handy for feeding precomputed results through [`scan`](crate::scan), and
/// used by the backends that materialize their results up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    /// Index of the current row; `None` before the first `next_row`.
    current: Option<usize>,
    closed: bool,
}

impl MemoryCursor {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a row. Must have one value per column.
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.push_row(values);
        self
    }

    pub fn push_row(&mut self, values: Vec<SqlValue>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(values);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Cursor for MemoryCursor {
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

        if slots.len() != row.len() {
            return Err(format!(
                "expected {} destination slots, got {}",
                row.len(),
                slots.len()
            )
            .into());
        }

        row.iter()
            .zip(slots)
            .enumerate()
            .map(|(i, (value, slot))| match slot {
                Slot::Discard => Ok(SqlValue::Null),
                Slot::Value => Ok(value.clone()),
                Slot::UnixSeconds => match value {
                    SqlValue::Null | SqlValue::Int(_) => Ok(value.clone()),
                    other => Err(format!(
                        "column {} ({}): cannot read {} as epoch seconds",
                        i,
                        self.columns[i],
                        other.kind()
                    )
                    .into()),
                },
            })
            .collect()
    }

    fn close(&mut self) {
        self.closed = true;
        self.rows.clear();
    }
}
