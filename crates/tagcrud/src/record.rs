//! The record capability trait.

use crate::error::CrudResult;
use crate::tag::FieldDef;
use crate::value::SqlValue;

/// A struct whose fields map to SQL columns.
///
/// This trait should typically be derived using `#[derive(Record)]`
/// from the `tagcrud-derive` crate. The trait is object safe, so records of
/// different types can be scanned together as `&mut dyn Record`.
///
/// # Example
///
/// ```ignore
/// use tagcrud::Record;
///
/// #[derive(Default, Record)]
/// struct Foo {
///     #[crud("foo_id")]
///     id: i64,
///     #[crud("foo_num")]
///     num: i64,
///     #[crud("foo_time,unix")]
///     time: chrono::DateTime<chrono::Utc>,
///     // not mapped
///     scratch: Vec<u8>,
/// }
/// ```
///
/// Writing the trait by hand:
///
/// ```
/// use tagcrud::{CrudError, CrudResult, FieldDef, FromSqlValue, Record, SqlValue, ToSqlValue};
///
/// struct Foo {
///     id: i64,
///     label: Option<String>,
/// }
///
/// static FOO_FIELDS: &[FieldDef] = &[
///     FieldDef::new("id", "foo_id"),
///     FieldDef::new("label", "foo_label"),
/// ];
///
/// impl Record for Foo {
///     fn fields(&self) -> &'static [FieldDef] {
///         FOO_FIELDS
///     }
///
///     fn get_field(&self, index: usize) -> SqlValue {
///         match index {
///             0 => self.id.to_sql_value(),
///             1 => self.label.to_sql_value(),
///             _ => SqlValue::Null,
///         }
///     }
///
///     fn set_field(&mut self, index: usize, value: SqlValue) -> CrudResult<()> {
///         match index {
///             0 => {
///                 self.id = FromSqlValue::from_sql_value(value)
///                     .map_err(|e| CrudError::decode("foo_id", e))?
///             }
///             1 => {
///                 self.label = FromSqlValue::from_sql_value(value)
///                     .map_err(|e| CrudError::decode("foo_label", e))?
///             }
///             _ => return Err(tagcrud::record::unknown_field(index)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Record {
    /// The declared field table, in declaration order.
    fn fields(&self) -> &'static [FieldDef];

    /// Read field `index` (position in [`Record::fields`]).
    fn get_field(&self, index: usize) -> SqlValue;

    /// Write field `index` (position in [`Record::fields`]).
    fn set_field(&mut self, index: usize, value: SqlValue) -> CrudResult<()>;
}

/// Error for an index outside a record's field table.
pub fn unknown_field(index: usize) -> crate::CrudError {
    crate::CrudError::decode(
        format!("#{index}"),
        crate::value::ValueError::new("declared field", "unknown field index"),
    )
}

impl<R: Record + ?Sized> Record for &mut R {
    fn fields(&self) -> &'static [FieldDef] {
        (**self).fields()
    }

    fn get_field(&self, index: usize) -> SqlValue {
        (**self).get_field(index)
    }

    fn set_field(&mut self, index: usize, value: SqlValue) -> CrudResult<()> {
        (**self).set_field(index, value)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn fields(&self) -> &'static [FieldDef] {
        (**self).fields()
    }

    fn get_field(&self, index: usize) -> SqlValue {
        (**self).get_field(index)
    }

    fn set_field(&mut self, index: usize, value: SqlValue) -> CrudResult<()> {
        (**self).set_field(index, value)
    }
}
