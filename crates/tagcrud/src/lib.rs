//! # tagcrud
//!
//! Minimal struct-tag CRUD over SQL databases.
//!
//! A struct declares which of its fields map to which columns through a tag
//! of the form `column[,unix]`. From that single declaration tagcrud renders
//! INSERT and UPDATE statements, binds the field values, and scans result
//! rows back into one or several structs at once.
//!
//! ## Features
//!
//! - **Tags, not schemas**: `#[crud("foo_id")]` is the whole mapping
//! - **Epoch seconds**: `#[crud("created,unix")]` stores a timestamp as an integer
//! - **Multi-record scans**: fill a `User` and a `Post` from one joined row,
//!   with per-record column prefixes
//! - **Backend neutral**: anything implementing [`Database`] works; PostgreSQL
//!   (`tokio-postgres`) and SQLite (`rusqlite`) handles ship behind features
//!
//! ## Example
//!
//! ```ignore
//! use tagcrud::prelude::*;
//!
//! #[derive(Debug, Default, Record)]
//! struct Foo {
//!     #[crud("foo_id")]
//!     id: i64,
//!     #[crud("foo_num")]
//!     num: i64,
//!     #[crud("foo_time,unix")]
//!     time: Option<DateTime<Utc>>,
//! }
//!
//! let db = SqliteClient::open_in_memory()?;
//! let mut foo = Foo { num: 42, ..Default::default() };
//! foo.id = tagcrud::insert(&db, "foo", "foo_id", &foo).await?;
//!
//! foo.num = 43;
//! tagcrud::update(&db, "foo", "foo_id", &foo).await?;
//!
//! let foos: Vec<Foo> = tagcrud::query_all(&db, "SELECT * FROM foo", &[]).await?;
//! ```

pub mod config;
pub mod cursor;
pub mod db;
pub mod error;
pub mod prelude;
pub mod reader;
pub mod record;
pub mod tag;
pub mod value;
pub mod writer;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod testing;

pub use config::{CrudConfig, DuplicateColumns};
pub use cursor::{Cursor, CursorGuard, MemoryCursor, Slot};
pub use db::{Database, Dialect, ExecResult, IdStrategy, Placeholder};
pub use error::{BoxError, CrudError, CrudResult};
pub use reader::{ScanArg, Scanner, query_all, scan, scan_all};
pub use record::Record;
pub use tag::{FieldDef, FieldMap, FieldMeta, FieldTag, resolve};
pub use value::{FromSqlValue, SqlValue, ToSqlValue, ValueError};
pub use writer::{Statement, Writer, build_insert, build_update, insert, update};

#[cfg(feature = "postgres")]
pub use postgres::PgCursor;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteClient;

#[cfg(feature = "derive")]
pub use tagcrud_derive::Record;
