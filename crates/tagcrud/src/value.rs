//! SQL values exchanged between records and database handles.
//!
//! [`SqlValue`] is the only currency crossing the [`Database`](crate::Database)
//! and [`Cursor`](crate::Cursor) seams. Record fields convert into it through
//! [`ToSqlValue`] and back through [`FromSqlValue`].

use chrono::{DateTime, NaiveDateTime, Utc};

/// A single bind parameter or extracted column value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    #[default]
    Null,
    /// Any integer column
    Int(i64),
    /// Any floating point column
    Float(f64),
    /// Text / varchar
    Text(String),
    /// Boolean
    Bool(bool),
    /// Timestamp, normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Short name of the variant, used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A value could not be converted into the requested Rust type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {found}")]
pub struct ValueError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueError {
    pub const fn new(expected: &'static str, found: &'static str) -> Self {
        Self { expected, found }
    }

    fn unexpected(expected: &'static str, value: &SqlValue) -> Self {
        Self::new(expected, value.kind())
    }
}

/// Conversion of a record field into a bind parameter.
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

/// Conversion of an extracted column value into a record field.
///
/// `Null` only converts into `Option<T>`; every other target rejects it.
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError>;
}

impl<T: ToSqlValue + ?Sized> ToSqlValue for &T {
    fn to_sql_value(&self) -> SqlValue {
        (**self).to_sql_value()
    }
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        Ok(value)
    }
}

macro_rules! impl_int {
    ($($ty:ty),*) => {$(
        impl ToSqlValue for $ty {
            fn to_sql_value(&self) -> SqlValue {
                SqlValue::Int(i64::from(*self))
            }
        }

        impl FromSqlValue for $ty {
            fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
                match value {
                    SqlValue::Int(v) => <$ty>::try_from(v)
                        .map_err(|_| ValueError::new(stringify!($ty), "out-of-range integer")),
                    other => Err(ValueError::unexpected(stringify!($ty), &other)),
                }
            }
        }
    )*};
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(*self)
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Float(v) => Ok(v),
            SqlValue::Int(v) => Ok(v as f64),
            other => Err(ValueError::unexpected("f64", &other)),
        }
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Float(f64::from(*self))
    }
}

impl FromSqlValue for f32 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Float(v) => Ok(v as f32),
            SqlValue::Int(v) => Ok(v as f32),
            other => Err(ValueError::unexpected("f32", &other)),
        }
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Bool(v) => Ok(v),
            // SQLite has no boolean storage class.
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Int(_) => Err(ValueError::new("bool", "out-of-range integer")),
            other => Err(ValueError::unexpected("bool", &other)),
        }
    }
}

impl ToSqlValue for str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_owned())
    }
}

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(v) => Ok(v),
            other => Err(ValueError::unexpected("String", &other)),
        }
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Timestamp(v) => Ok(v),
            SqlValue::Text(s) => parse_timestamp(&s)
                .ok_or(ValueError::new("DateTime<Utc>", "unparseable text")),
            other => Err(ValueError::unexpected("DateTime<Utc>", &other)),
        }
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(self.and_utc())
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        DateTime::<Utc>::from_sql_value(value)
            .map(|v| v.naive_utc())
            .map_err(|e| ValueError::new("NaiveDateTime", e.found))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// Parse the textual timestamp forms drivers hand back (RFC 3339 or `YYYY-MM-DD HH:MM:SS[.f]`).
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(v) = DateTime::parse_from_rfc3339(s) {
        return Some(v.with_timezone(&Utc));
    }
    if let Ok(v) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(v.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|v| v.and_utc())
}

/// Build a timestamp from whole epoch seconds.
pub fn from_unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_only_decodes_into_option() {
        assert_eq!(Option::<i64>::from_sql_value(SqlValue::Null), Ok(None));
        assert_eq!(
            i64::from_sql_value(SqlValue::Null),
            Err(ValueError::new("i64", "null"))
        );
    }

    #[test]
    fn integer_narrowing_is_checked() {
        assert_eq!(i8::from_sql_value(SqlValue::Int(-12)), Ok(-12));
        assert_eq!(
            i8::from_sql_value(SqlValue::Int(300)),
            Err(ValueError::new("i8", "out-of-range integer"))
        );
        assert!(u32::from_sql_value(SqlValue::Int(-1)).is_err());
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::from_sql_value(SqlValue::Int(3)), Ok(3.0));
        assert_eq!(f32::from_sql_value(SqlValue::Float(1.5)), Ok(1.5));
    }

    #[test]
    fn bool_accepts_sqlite_integers() {
        assert_eq!(bool::from_sql_value(SqlValue::Int(1)), Ok(true));
        assert_eq!(bool::from_sql_value(SqlValue::Int(0)), Ok(false));
        assert!(bool::from_sql_value(SqlValue::Int(2)).is_err());
    }

    #[test]
    fn timestamps_parse_from_text() {
        let expected = from_unix_seconds(1338).unwrap();
        for text in [
            "1970-01-01T00:22:18Z",
            "1970-01-01T00:22:18+00:00",
            "1970-01-01 00:22:18",
            "1970-01-01 00:22:18+00:00",
        ] {
            assert_eq!(
                DateTime::<Utc>::from_sql_value(SqlValue::Text(text.into())),
                Ok(expected),
                "{text}"
            );
        }
        assert!(DateTime::<Utc>::from_sql_value(SqlValue::Text("yesterday".into())).is_err());
    }

    #[test]
    fn option_round_trips_through_sql_value() {
        let some: Option<String> = Some("x".into());
        assert_eq!(some.to_sql_value(), SqlValue::Text("x".into()));
        let none: Option<String> = None;
        assert_eq!(none.to_sql_value(), SqlValue::Null);
    }

    #[test]
    fn kind_names_variants() {
        assert_eq!(SqlValue::Int(1).kind(), "integer");
        assert_eq!(SqlValue::Null.kind(), "null");
        assert_eq!(SqlValue::Timestamp(Utc::now()).kind(), "timestamp");
    }
}
