//! Records and a recording database handle shared by unit tests.

use crate::cursor::MemoryCursor;
use crate::db::{Database, Dialect, ExecResult};
use crate::error::CrudResult;
use crate::value::SqlValue;
use crate::writer::Statement;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Hand-written `Record` impl; the derive is not available inside this crate's unit tests.
macro_rules! test_record {
    ($ty:ident { $($field:ident : $fty:ty => $tag:literal),* $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub(crate) struct $ty {
            $(pub $field: $fty),*
        }

        impl $crate::Record for $ty {
            fn fields(&self) -> &'static [$crate::FieldDef] {
                static FIELDS: &[$crate::FieldDef] =
                    &[$($crate::FieldDef::new(stringify!($field), $tag)),*];
                FIELDS
            }

            #[allow(unused_assignments)]
            fn get_field(&self, index: usize) -> $crate::SqlValue {
                let mut i = 0usize;
                $(
                    if i == index {
                        return $crate::ToSqlValue::to_sql_value(&self.$field);
                    }
                    i += 1;
                )*
                $crate::SqlValue::Null
            }

            #[allow(unused_assignments)]
            fn set_field(
                &mut self,
                index: usize,
                value: $crate::SqlValue,
            ) -> $crate::CrudResult<()> {
                let mut i = 0usize;
                $(
                    if i == index {
                        self.$field = $crate::FromSqlValue::from_sql_value(value)
                            .map_err(|e| $crate::CrudError::decode(stringify!($field), e))?;
                        return Ok(());
                    }
                    i += 1;
                )*
                Err($crate::record::unknown_field(index))
            }
        }
    };
}

test_record!(Foo {
    id: i64 => "foo_id",
    num: i64 => "foo_num",
    label: Option<String> => "foo_label",
    time: Option<DateTime<Utc>> => "foo_time,unix",
    scratch: u8 => "",
});

test_record!(Bar {
    id: i64 => "bar_id",
    name: String => "name",
});

test_record!(OnlyId {
    id: i64 => "id",
});

test_record!(Stamp {
    id: i64 => "id",
    at: DateTime<Utc> => "at,unix",
});

test_record!(WrongUnix {
    when: i64 => "when,unix",
});

test_record!(Twice {
    first: i64 => "n",
    second: i64 => "n",
});

/// Records every statement; answers with canned results.
pub(crate) struct FakeDb {
    dialect: Dialect,
    last_insert_id: Option<i64>,
    rows: MemoryCursor,
    pub executed: Mutex<Vec<Statement>>,
}

impl FakeDb {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            last_insert_id: None,
            rows: MemoryCursor::default(),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }

    pub fn with_rows(mut self, rows: MemoryCursor) -> Self {
        self.rows = rows;
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.executed.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[SqlValue]) {
        self.executed.lock().unwrap().push(Statement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

impl Database for FakeDb {
    type Cursor = MemoryCursor;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> CrudResult<ExecResult> {
        self.record(sql, params);
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: self.last_insert_id,
        })
    }

    async fn prepare(&self, _sql: &str) -> CrudResult<()> {
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[SqlValue]) -> CrudResult<MemoryCursor> {
        self.record(sql, params);
        Ok(self.rows.clone())
    }
}
