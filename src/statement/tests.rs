use chrono::NaiveDate;

use super::*;
use crate::impl_record;
use crate::model::Video;
use crate::store::SqliteStore;

struct Movie {
    id: i64,
    title: String,
    tags: Vec<String>,
    released: Option<chrono::NaiveDateTime>,
}

impl_record!(Movie { id, title, tags, released });

struct Opaque {
    payload: FieldValue,
}

impl_record!(Opaque { payload });

fn say_it_aint_so() -> Movie {
    Movie {
        id: 7,
        title: "Say It Ain't So".to_string(),
        tags: vec!["a".to_string(), "b".to_string()],
        released: None,
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|ch| !ch.is_whitespace()).collect()
}

#[test]
fn build_named_renders_compact_conditional_insert() {
    let builder = StatementBuilder::default();
    let movie = say_it_aint_so();
    let condition = where_not_exists("movies", "id", "7");

    let statement = builder
        .build_named(&movie, &condition)
        .expect("statement builds");

    assert!(statement.starts_with(
        "INSERT INTO movies(id,title,tags,released) SELECT 7,$delim$Say It Ain't So$delim$,"
    ));
    assert_eq!(
        statement,
        "INSERT INTO movies(id,title,tags,released) SELECT 7,$delim$Say It Ain't So$delim$,\
         $delim${\"a\",\"b\"}$delim$,NULL WHERE NOT EXISTS (SELECT 1 FROM movies WHERE id=7);"
    );
}

#[test]
fn pretty_and_compact_differ_only_in_whitespace() {
    let builder = StatementBuilder::default();
    let movie = say_it_aint_so();
    let condition = "WHERE NOT EXISTS (SELECT 1 FROM movies WHERE id=7)";

    let pretty = builder
        .build("movies", &movie, condition, true)
        .expect("pretty builds");
    let compact = builder
        .build("movies", &movie, condition, false)
        .expect("compact builds");

    assert_ne!(pretty, compact);
    assert_eq!(strip_whitespace(&pretty), strip_whitespace(&compact));
    assert_eq!(
        pretty,
        "INSERT INTO movies\n(id,title,tags,released)\n SELECT 7,\n$delim$Say It Ain't So$delim$,\n\
         $delim${\"a\",\"b\"}$delim$,\nNULL \nWHERE NOT EXISTS (SELECT 1 FROM movies WHERE id=7)"
    );
}

#[test]
fn empty_condition_is_omitted() {
    let builder = StatementBuilder::default();

    let statement = builder
        .build("movies", &say_it_aint_so(), "  ", false)
        .expect("statement builds");

    assert!(statement.ends_with(",NULL"), "statement: {statement}");
}

#[test]
fn record_without_columns_is_rejected() {
    let builder = StatementBuilder::new(EncoderConfig::tolerant());
    let opaque = Opaque {
        payload: FieldValue::Unsupported { type_name: "Blob" },
    };

    let err = builder
        .build_named(&opaque, "")
        .expect_err("no columns to insert");
    assert!(matches!(err, EncodeError::EmptyRecord(_)));

    let err = builder.plan(&opaque).expect_err("no columns to plan");
    assert!(matches!(err, EncodeError::EmptyRecord(_)));
}

#[test]
fn plan_binds_values_in_column_order() {
    let builder = StatementBuilder::default();
    let plan = builder.plan(&say_it_aint_so()).expect("plan builds");

    assert_eq!(plan.table, "movies");
    assert_eq!(plan.columns, vec!["id", "title", "tags", "released"]);
    assert_eq!(
        plan.sql("WHERE 1=1"),
        "INSERT INTO movies(id,title,tags,released) SELECT ?1,?2,?3,?4 WHERE 1=1"
    );
    assert_eq!(
        plan.value_of("title"),
        Some(&FieldValue::Text("Say It Ain't So".to_string()))
    );
    assert_eq!(plan.value_of("missing"), None);
}

#[test]
fn insert_record_is_idempotent_under_not_exists_guard() {
    let store = SqliteStore::open_in_memory().expect("in-memory DB should open");
    store
        .connection()
        .execute_batch(
            "
            CREATE TABLE csnvideos (
              id INTEGER PRIMARY KEY,
              title TEXT,
              artists TEXT,
              authors TEXT,
              topics TEXT,
              thumbnail TEXT,
              producer TEXT,
              downloads INTEGER,
              plays INTEGER,
              formats TEXT,
              href TEXT,
              is_lyric INTEGER,
              lyric TEXT,
              date_released TEXT,
              date_created TEXT,
              type INTEGER,
              checktime TEXT
            );
            ",
        )
        .expect("schema should apply");

    let video = Video {
        id: 1213739,
        title: "Thương Vợ".to_string(),
        artists: vec!["Lý Hải".to_string()],
        authors: vec!["Phi Bằng".to_string()],
        topics: vec!["Video Clip".to_string(), "Việt Nam".to_string()],
        plays: 168297,
        downloads: 5541,
        is_lyric: 1,
        lyric: "Muốn chơi cho hoài tôi cứ để vợ lo hoài\nSáng trưa hay chiều".to_string(),
        date_released: "2014".to_string(),
        date_created: "2014-02-06 10:47:00".to_string(),
        checktime: NaiveDate::from_ymd_opt(2013, 11, 21).and_then(|date| date.and_hms_opt(0, 0, 0)),
        ..Video::default()
    };
    let builder = StatementBuilder::default();
    let condition = where_not_exists("csnvideos", "id", &video.id.to_string());

    let first = insert_record(&store, &builder, &video, &condition).expect("first insert");
    let second = insert_record(&store, &builder, &video, &condition).expect("second insert");
    assert_eq!(first, 1);
    assert_eq!(second, 0);

    let (title, topics, checktime, kind): (String, String, String, i64) = store
        .connection()
        .query_row(
            "SELECT title, topics, checktime, type FROM csnvideos WHERE id = ?1",
            [video.id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .expect("row should exist");
    assert_eq!(title, "Thương Vợ");
    assert_eq!(topics, r#"{"Video Clip","Việt Nam"}"#);
    assert_eq!(checktime, "2013-11-21 00:00:00");
    assert_eq!(kind, 0);
}

#[test]
fn textual_statement_is_postgres_only_while_bound_insert_runs_on_sqlite() {
    let store = SqliteStore::open_in_memory().expect("in-memory DB should open");
    store
        .connection()
        .execute_batch(
            "CREATE TABLE movies (id INTEGER PRIMARY KEY, title TEXT, tags TEXT, released TEXT);",
        )
        .expect("schema should apply");
    let builder = StatementBuilder::default();
    let movie = say_it_aint_so();
    let condition = where_not_exists("movies", "id", "7");

    let statement = builder
        .build_named(&movie, &condition)
        .expect("statement builds");
    let err = store
        .exec(&statement)
        .expect_err("sqlite does not understand dollar quoting");
    assert!(matches!(err, crate::error::StoreError::Sqlite(_)));

    let affected = insert_record(&store, &builder, &movie, &condition).expect("bound insert");
    assert_eq!(affected, 1);

    let (title, tags, released): (String, String, Option<String>) = store
        .connection()
        .query_row(
            "SELECT title, tags, released FROM movies WHERE id = 7",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("row should exist");
    assert_eq!(title, "Say It Ain't So");
    assert_eq!(tags, r#"{"a","b"}"#);
    assert_eq!(released, None);
}

#[test]
fn value_of_tolerates_mismatched_plan_lengths() {
    let plan = InsertPlan {
        table: "movies".to_string(),
        columns: vec!["id".to_string(), "title".to_string()],
        values: vec![FieldValue::Integer(7)],
    };

    assert_eq!(plan.value_of("id"), Some(&FieldValue::Integer(7)));
    assert_eq!(plan.value_of("title"), None);
}
