#![allow(dead_code)]

use chrono::NaiveDate;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text};
use std::path::PathBuf;
use tempfile::TempDir;
use timetable_sync::db::{connection, migrate};
use timetable_sync::{DocumentBuilder, MemoryDocument, Tag, TimetableDescriptor};

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    n: i64,
}
#[derive(QueryableByName, Debug)]
struct FkViolation {
    #[diesel(sql_type = Text)]
    table: String,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal");

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let c: Count = sql_query(format!("SELECT COUNT(*) AS n FROM {table}"))
        .get_result(conn)
        .unwrap();
    c.n
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let rows: Vec<FkViolation> = sql_query("PRAGMA foreign_key_check;").load(conn).unwrap();
    assert!(rows.is_empty(), "foreign key violations: {rows:?}");
}

pub const ALL_TABLES: [&str; 13] = [
    "timetable",
    "period",
    "day_definition",
    "week_definition",
    "subject",
    "teacher",
    "building",
    "classroom",
    "cohort",
    "lesson",
    "lesson_cohort",
    "lesson_teacher",
    "lesson_classroom",
];

pub fn assert_store_empty(conn: &mut SqliteConnection) {
    for table in ALL_TABLES {
        assert_eq!(count(conn, table), 0, "{table} should be empty");
    }
}

pub fn descriptor(name: &str) -> TimetableDescriptor {
    TimetableDescriptor::new(name, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
}

/// Reference data shared by most fixtures: two periods, two days, two
/// subjects, two teachers, two rooms, two classes.
pub fn references() -> DocumentBuilder {
    DocumentBuilder::new()
        .with(Tag::Period, [("period", "1"), ("starttime", "8:00"), ("endtime", "8:45")])
        .with(Tag::Period, [("period", "2"), ("starttime", "8:55"), ("endtime", "9:40")])
        .with(Tag::Day, [("id", "D1"), ("name", "Monday"), ("short", "Mo"), ("days", "10000")])
        .with(Tag::Day, [("id", "D2"), ("name", "Tuesday"), ("short", "Tu"), ("days", "01000")])
        .with(Tag::Subject, [("id", "S1"), ("name", "Mathematics"), ("short", "MA")])
        .with(Tag::Subject, [("id", "S2"), ("name", "History"), ("short", "HI")])
        .with(
            Tag::Teacher,
            [("id", "T1"), ("name", "Ada Lovelace"), ("short", "AL"), ("gender", "F")],
        )
        .with(Tag::Teacher, [("id", "T2"), ("name", "Alan Turing"), ("short", "AT")])
        .with(
            Tag::Classroom,
            [("id", "R1"), ("name", "Room 101"), ("short", "101"), ("capacity", "30")],
        )
        .with(Tag::Classroom, [("id", "R2"), ("name", "Hall"), ("short", "HL"), ("capacity", "*")])
        .with(Tag::Class, [("id", "C1"), ("name", "1A"), ("short", "1A"), ("teacherid", "T1")])
        .with(Tag::Class, [("id", "C2"), ("name", "1B"), ("short", "1B"), ("teacherid", "T2")])
}

/// Two periods, one of everything else, and two identical schedule entries
/// that collapse onto one lesson.
pub fn worked_example() -> MemoryDocument {
    let card = [
        ("dayid", "D1"),
        ("subjectid", "S1"),
        ("period", "1"),
        ("teacherid", "T1"),
        ("classroomid", "R1"),
        ("classid", "C1"),
    ];
    DocumentBuilder::new()
        .with(Tag::Period, [("period", "1"), ("starttime", "8:00"), ("endtime", "8:45")])
        .with(Tag::Period, [("period", "2"), ("starttime", "8:55"), ("endtime", "9:40")])
        .with(Tag::Day, [("id", "D1"), ("name", "Monday"), ("short", "Mo")])
        .with(Tag::Subject, [("id", "S1"), ("name", "Mathematics"), ("short", "MA")])
        .with(Tag::Teacher, [("id", "T1"), ("name", "Ada Lovelace"), ("short", "AL")])
        .with(
            Tag::Classroom,
            [("id", "R1"), ("name", "Room 101"), ("short", "101"), ("capacity", "30")],
        )
        .with(Tag::Class, [("id", "C1"), ("name", "1A"), ("short", "1A"), ("teacherid", "T1")])
        .with(Tag::Card, card)
        .with(Tag::Card, card)
        .build()
}

/// `references()` plus `n` schedule entries.
///
/// Subject, day, period and class are picked from the bits of the entry
/// number, so up to 16 entries all have distinct lesson keys.
pub fn with_entries(n: usize) -> MemoryDocument {
    let mut b = references();
    let subjects = ["S1", "S2"];
    let days = ["D1", "D2"];
    let periods = ["1", "2"];
    let classes = ["C1", "C2"];
    for i in 0..n {
        let ppw = (i + 1).to_string();
        b.push(
            Tag::Card,
            [
                ("subjectid", subjects[i % 2]),
                ("dayid", days[(i / 2) % 2]),
                ("period", periods[(i / 4) % 2]),
                ("classid", classes[(i / 8) % 2]),
                ("teacherid", if i % 3 == 0 { "T1" } else { "T2" }),
                ("classroomid", "R1"),
                ("periodsperweek", ppw.as_str()),
            ],
        );
    }
    b.build()
}
