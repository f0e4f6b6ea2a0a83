//! Derive macro for tagcrud
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive the `Record` trait for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use tagcrud::Record;
/// use chrono::{DateTime, Utc};
///
/// #[derive(Default, Record)]
/// struct Foo {
///     #[crud("foo_id")]
///     id: i64,
///     #[crud("foo_time,unix")]
///     created: Option<DateTime<Utc>>,
///     // no attribute: not mapped
///     scratch: u8,
/// }
/// ```
///
/// # Attributes
///
/// - `#[crud("column")]` - Map the field to `column`
/// - `#[crud("column,unix")]` - Store a timestamp field as whole epoch seconds
///
/// Unknown flags after the column are ignored. Every mapped field's type must
/// implement `ToSqlValue` and `FromSqlValue`. `unix` on a plain integer, float,
/// `bool` or `String` field (or an `Option` of one) is a compile error; other
/// non-timestamp types are reported as a type mismatch when a non-NULL value
/// is scanned into them.
#[proc_macro_derive(Record, attributes(crud))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
