use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use timetable_sync::db::connection::connect_sqlite;
use timetable_sync::models::{NewCohort, NewSubject, NewTeacher};
use timetable_sync::schema::{cohort, subject, teacher};

mod common;

#[test]
fn sqlite_connection_applies_pragmas() {
    let (db, mut conn) = common::setup_db();
    common::assert_sqlite_pragmas(&mut conn);

    let mut second = connect_sqlite(&db.path).expect("connect second");
    common::assert_sqlite_pragmas(&mut second);
}

#[test]
fn unreachable_store_names_its_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = dir.path().join("missing").join("store.db");
    let url = url.to_string_lossy().to_string();

    let Err(err) = connect_sqlite(&url) else {
        panic!("expected connect_sqlite to fail");
    };
    let msg = format!("{err:#}");
    assert!(msg.contains("failed to open timetable store"), "{msg}");
    assert!(msg.contains(&url), "{msg}");
}

#[test]
fn natural_keys_are_unique() {
    let (_db, mut conn) = common::setup_db();
    let maths = NewSubject {
        name: "Mathematics".into(),
        short: "MA".into(),
    };
    diesel::insert_into(subject::table)
        .values(&maths)
        .execute(&mut conn)
        .unwrap();

    let err = diesel::insert_into(subject::table)
        .values(&maths)
        .execute(&mut conn)
        .unwrap_err();
    assert!(matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));

    let ada = NewTeacher {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        short: "AL".into(),
    };
    diesel::insert_into(teacher::table)
        .values(&ada)
        .execute(&mut conn)
        .unwrap();
    // Same first name, different last name is a different teacher.
    diesel::insert_into(teacher::table)
        .values(&NewTeacher {
            last_name: "Byron".into(),
            ..ada.clone()
        })
        .execute(&mut conn)
        .unwrap();
    assert_eq!(common::count(&mut conn, "teacher"), 2);
}

#[test]
fn cohorts_require_an_existing_timetable() {
    let (_db, mut conn) = common::setup_db();
    let err = diesel::insert_into(cohort::table)
        .values(&NewCohort {
            timetable_id: 999,
            name: "1A".into(),
            short: "1A".into(),
            teacher_id: None,
        })
        .execute(&mut conn)
        .unwrap_err();
    assert!(matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    ));
    common::fk_check_empty(&mut conn);
}
