//! Convenient imports for typical `tagcrud` usage.
//!
//! ```ignore
//! use tagcrud::prelude::*;
//! ```

pub use crate::{
    CrudConfig, CrudError, CrudResult, Cursor, Database, Record, ScanArg, Scanner, SqlValue,
    Writer, insert, query_all, scan, scan_all, scan_args, update,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteClient;

pub use chrono::{DateTime, Utc};
