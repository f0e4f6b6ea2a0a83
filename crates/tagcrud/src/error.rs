//! Error types for tagcrud

use crate::value::ValueError;
use thiserror::Error;

/// Boxed error produced by a database backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for tagcrud operations
pub type CrudResult<T> = Result<T, CrudError>;

/// Error types for mapping, writing and scanning records
#[derive(Debug, Error)]
pub enum CrudError {
    /// UPDATE on a record whose identity column is zero or not mapped
    #[error("{column} is 0 or not set, cannot update")]
    MissingIdentity { column: String },

    /// UPDATE on a record with no columns besides the identity
    #[error("Nothing to update in {table}: no mapped columns besides {id_column}")]
    NothingToUpdate { table: String, id_column: String },

    /// The driver did not report a generated identity after INSERT
    #[error("Driver returned no last insert id for {table}")]
    NoInsertId { table: String },

    /// The bulk extraction of a row failed
    #[error("Scan failed (columns: {columns:?}): {source}")]
    Scan {
        columns: Vec<String>,
        #[source]
        source: BoxError,
    },

    /// A field's type cannot hold the value its flags produce (e.g. `unix` on a non-timestamp)
    #[error("Type mismatch on field '{field}': expected {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Value decode/conversion error
    #[error("Decode error on column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: ValueError,
    },

    /// Two scan targets map the same result column
    #[error("Column '{0}' is mapped by more than one scan target")]
    DuplicateColumn(String),

    /// Strict mode: result columns and mapped fields do not line up
    #[error("Unmatched columns {unmapped_columns:?} and fields {missing_fields:?}")]
    Unmatched {
        unmapped_columns: Vec<String>,
        missing_fields: Vec<String>,
    },

    /// Error reported by the underlying database handle
    #[error("Database error: {0}")]
    Database(#[source] BoxError),
}

impl CrudError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, source: ValueError) -> Self {
        Self::Decode {
            column: column.into(),
            source,
        }
    }

    /// Create a type mismatch error for a field
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            found,
        }
    }

    /// Wrap a backend error
    pub fn database<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Database(err.into())
    }

    /// Check if this is a missing identity error
    pub fn is_missing_identity(&self) -> bool {
        matches!(self, Self::MissingIdentity { .. })
    }

    /// Check if this is a scan (extraction) error
    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan { .. })
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for CrudError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Database(Box::new(err))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for CrudError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(Box::new(err))
    }
}
