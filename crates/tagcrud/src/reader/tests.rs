use super::*;
use crate::cursor::MemoryCursor;
use crate::scan_args;
use crate::testing::{Bar, Foo, Stamp, Twice, WrongUnix};
use crate::value::from_unix_seconds;

fn foo_cursor() -> MemoryCursor {
    MemoryCursor::new(["foo_id", "foo_num", "foo_label", "foo_time", "extra"])
        .row(vec![
            SqlValue::Int(1),
            SqlValue::Int(42),
            SqlValue::Text("x".into()),
            SqlValue::Int(1338),
            SqlValue::Text("ignored".into()),
        ])
        .row(vec![
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Null,
            SqlValue::Null,
            SqlValue::Null,
        ])
}

#[test]
fn scan_fills_mapped_fields_and_discards_the_rest() {
    let mut cursor = foo_cursor();
    assert!(cursor.next_row().unwrap());

    let mut foo = Foo::default();
    scan(&cursor, [ScanArg::from(&mut foo)]).unwrap();

    assert_eq!(foo.id, 1);
    assert_eq!(foo.num, 42);
    assert_eq!(foo.label.as_deref(), Some("x"));
    assert_eq!(foo.time, from_unix_seconds(1338));
    assert_eq!(foo.scratch, 0);
}

#[test]
fn scan_leaves_nullable_fields_unset_on_null() {
    let mut cursor = foo_cursor();
    cursor.next_row().unwrap();
    cursor.next_row().unwrap();

    let mut foo = Foo::default();
    scan(&cursor, [ScanArg::from(&mut foo)]).unwrap();

    assert_eq!(foo.id, 2);
    assert_eq!(foo.label, None);
    assert_eq!(foo.time, None);
}

#[test]
fn scan_null_unix_keeps_previous_timestamp() {
    let mut cursor =
        MemoryCursor::new(["id", "at"]).row(vec![SqlValue::Int(1), SqlValue::Null]);
    cursor.next_row().unwrap();

    let before = from_unix_seconds(5).unwrap();
    let mut stamp = Stamp { id: 0, at: before };
    scan(&cursor, [ScanArg::from(&mut stamp)]).unwrap();
    assert_eq!(stamp.at, before);
}

#[test]
fn scan_null_keeps_prior_optional_value() {
    let mut cursor = MemoryCursor::new(["foo_id", "foo_label"])
        .row(vec![SqlValue::Int(1), SqlValue::Null]);
    cursor.next_row().unwrap();

    let mut foo = Foo {
        label: Some("prior".into()),
        ..Foo::default()
    };
    scan(&cursor, [ScanArg::from(&mut foo)]).unwrap();

    assert_eq!(foo.id, 1);
    assert_eq!(foo.label.as_deref(), Some("prior"));
}

#[test]
fn scan_null_leaves_non_nullable_field_untouched() {
    let mut cursor = MemoryCursor::new(["bar_id", "name"])
        .row(vec![SqlValue::Int(1), SqlValue::Null]);
    cursor.next_row().unwrap();

    let mut bar = Bar {
        id: 0,
        name: "kept".into(),
    };
    scan(&cursor, [ScanArg::from(&mut bar)]).unwrap();
    assert_eq!((bar.id, bar.name.as_str()), (1, "kept"));
}

#[test]
fn null_unix_column_skips_field_type_check() {
    let mut cursor = MemoryCursor::new(["when"]).row(vec![SqlValue::Null]);
    cursor.next_row().unwrap();

    let mut wrong = WrongUnix { when: 3 };
    scan(&cursor, [ScanArg::from(&mut wrong)]).unwrap();
    assert_eq!(wrong.when, 3);
}

#[test]
fn scan_leaves_fields_missing_from_result_untouched() {
    let mut cursor = MemoryCursor::new(["foo_num"]).row(vec![SqlValue::Int(8)]);
    cursor.next_row().unwrap();

    let mut foo = Foo {
        id: 77,
        ..Foo::default()
    };
    scan(&cursor, [ScanArg::from(&mut foo)]).unwrap();
    assert_eq!(foo.id, 77);
    assert_eq!(foo.num, 8);
}

#[test]
fn prefix_applies_to_next_record_only() {
    let mut cursor = MemoryCursor::new(["bar_id", "name", "b_bar_id", "b_name", "foo_id"])
        .row(vec![
            SqlValue::Int(1),
            SqlValue::Text("plain".into()),
            SqlValue::Int(2),
            SqlValue::Text("prefixed".into()),
            SqlValue::Int(3),
        ]);
    cursor.next_row().unwrap();

    let mut plain = Bar::default();
    let mut prefixed = Bar::default();
    let mut foo = Foo::default();
    scan(&cursor, scan_args![&mut plain, "b_", &mut prefixed, &mut foo]).unwrap();

    assert_eq!((plain.id, plain.name.as_str()), (1, "plain"));
    assert_eq!((prefixed.id, prefixed.name.as_str()), (2, "prefixed"));
    assert_eq!(foo.id, 3);
}

fn shared_column_cursor() -> MemoryCursor {
    let mut cursor = MemoryCursor::new(["bar_id", "name"])
        .row(vec![SqlValue::Int(9), SqlValue::Text("n".into())]);
    cursor.next_row().unwrap();
    cursor
}

#[test]
fn duplicate_columns_first_wins_by_default() {
    let cursor = shared_column_cursor();
    let mut a = Bar::default();
    let mut b = Bar::default();
    scan(&cursor, scan_args![&mut a, &mut b]).unwrap();
    assert_eq!(a.id, 9);
    assert_eq!(b.id, 0);
}

#[test]
fn duplicate_columns_last_wins_when_configured() {
    let cursor = shared_column_cursor();
    let mut a = Bar::default();
    let mut b = Bar::default();
    Scanner::new(CrudConfig::new().with_duplicate_columns(DuplicateColumns::LastWins))
        .scan(&cursor, scan_args![&mut a, &mut b])
        .unwrap();
    assert_eq!(a.id, 0);
    assert_eq!(b.id, 9);
}

#[test]
fn duplicate_columns_error_when_configured() {
    let cursor = shared_column_cursor();
    let mut a = Bar::default();
    let mut b = Bar::default();
    let err = Scanner::new(CrudConfig::new().with_duplicate_columns(DuplicateColumns::Error))
        .scan(&cursor, scan_args![&mut a, &mut b])
        .unwrap_err();
    assert!(matches!(err, CrudError::DuplicateColumn(c) if c == "bar_id"));
}

#[test]
fn duplicate_columns_within_one_record_last_field_wins() {
    let mut cursor = MemoryCursor::new(["n"]).row(vec![SqlValue::Int(4)]);
    cursor.next_row().unwrap();
    let mut twice = Twice::default();
    scan(&cursor, [ScanArg::from(&mut twice)]).unwrap();
    assert_eq!((twice.first, twice.second), (0, 4));
}

#[test]
fn strict_mode_reports_mismatches() {
    let mut cursor = MemoryCursor::new(["bar_id", "extra"])
        .row(vec![SqlValue::Int(1), SqlValue::Int(2)]);
    cursor.next_row().unwrap();

    let mut bar = Bar::default();
    let err = Scanner::new(CrudConfig::new().strict())
        .scan(&cursor, [ScanArg::from(&mut bar)])
        .unwrap_err();

    match err {
        CrudError::Unmatched {
            unmapped_columns,
            missing_fields,
        } => {
            assert_eq!(unmapped_columns, vec!["extra".to_string()]);
            assert_eq!(missing_fields, vec!["name".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(bar.id, 0, "strict check runs before extraction");
}

#[test]
fn strict_mode_accepts_exact_match() {
    let cursor = shared_column_cursor();
    let mut bar = Bar::default();
    Scanner::new(CrudConfig::new().strict())
        .scan(&cursor, [ScanArg::from(&mut bar)])
        .unwrap();
    assert_eq!(bar.name, "n");
}

#[test]
fn unix_on_non_timestamp_field_is_type_mismatch() {
    let mut cursor = MemoryCursor::new(["when"]).row(vec![SqlValue::Int(10)]);
    cursor.next_row().unwrap();

    let mut wrong = WrongUnix::default();
    let err = scan(&cursor, [ScanArg::from(&mut wrong)]).unwrap_err();
    assert!(
        matches!(
            &err,
            CrudError::TypeMismatch { field, expected: "i64", found: "timestamp" }
                if field == "when"
        ),
        "{err}"
    );
}

#[test]
fn extraction_failure_is_scan_error_with_columns() {
    let mut cursor = MemoryCursor::new(["id", "at"])
        .row(vec![SqlValue::Int(1), SqlValue::Text("not seconds".into())]);
    cursor.next_row().unwrap();

    let mut stamp = Stamp::default();
    let err = scan(&cursor, [ScanArg::from(&mut stamp)]).unwrap_err();
    match err {
        CrudError::Scan { columns, .. } => assert_eq!(columns, vec!["id", "at"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn scan_all_collects_rows_in_order_and_closes() {
    let mut cursor = foo_cursor();
    let mut foos: Vec<Foo> = Vec::new();
    scan_all(&mut cursor, &mut foos).unwrap();

    assert_eq!(foos.len(), 2);
    assert_eq!(foos[0].id, 1);
    assert_eq!(foos[1].id, 2);
    assert_eq!(foos[1].num, 3);
    assert!(cursor.is_closed());
}

#[test]
fn scan_all_on_empty_result_is_empty() {
    let mut cursor = MemoryCursor::new(["bar_id", "name"]);
    let mut bars: Vec<Bar> = Vec::new();
    scan_all(&mut cursor, &mut bars).unwrap();
    assert!(bars.is_empty());
    assert!(cursor.is_closed());
}

#[test]
fn scan_all_keeps_partial_output_and_closes_on_error() {
    let mut cursor = MemoryCursor::new(["bar_id", "name"])
        .row(vec![SqlValue::Int(1), SqlValue::Text("ok".into())])
        .row(vec![SqlValue::Text("bad".into()), SqlValue::Text("row".into())]);
    let mut bars: Vec<Bar> = Vec::new();

    assert!(scan_all(&mut cursor, &mut bars).is_err());
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].name, "ok");
    assert!(cursor.is_closed());
}

#[tokio::test]
async fn query_all_scans_cursor_from_database() {
    use crate::db::Dialect;
    use crate::testing::FakeDb;

    let db = FakeDb::new(Dialect::SQLITE).with_rows(foo_cursor());
    let foos: Vec<Foo> = query_all(&db, "SELECT * FROM foo", &[]).await.unwrap();
    assert_eq!(foos.len(), 2);
    assert_eq!(db.statements()[0].sql, "SELECT * FROM foo");
}
