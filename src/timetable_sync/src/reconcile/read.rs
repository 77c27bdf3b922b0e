//! Bulk lookups of persisted reference rows by natural key.
//!
//! Each lookup is one `IN (...)` query per chunk of keys; chunking keeps the
//! statement under SQLite's bound-parameter limit for very large exports.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;

use crate::{
    ids::{
        BuildingId, ClassroomId, CohortId, DayDefinitionId, PeriodId, SubjectId, TeacherId,
        TimetableId, WeekDefinitionId,
    },
    schema::{
        building, classroom, cohort, day_definition, period, subject, teacher, week_definition,
    },
};

const LOOKUP_CHUNK: usize = 500;

/// Existing periods by ordinal.
pub fn periods(
    conn: &mut SqliteConnection,
    ordinals: &[i32],
) -> QueryResult<HashMap<i32, PeriodId>> {
    let mut out = HashMap::new();
    for chunk in ordinals.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(i32, i32)> = period::table
            .filter(period::ordinal.eq_any(chunk))
            .select((period::ordinal, period::id))
            .load(conn)?;
        out.extend(rows.into_iter().map(|(k, id)| (k, PeriodId(id))));
    }
    Ok(out)
}

/// Existing day definitions by name.
pub fn days(
    conn: &mut SqliteConnection,
    names: &[String],
) -> QueryResult<HashMap<String, DayDefinitionId>> {
    let mut out = HashMap::new();
    for chunk in names.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(String, i32)> = day_definition::table
            .filter(day_definition::name.eq_any(chunk))
            .select((day_definition::name, day_definition::id))
            .load(conn)?;
        out.extend(rows.into_iter().map(|(k, id)| (k, DayDefinitionId(id))));
    }
    Ok(out)
}

/// Existing subjects by name.
pub fn subjects(
    conn: &mut SqliteConnection,
    names: &[String],
) -> QueryResult<HashMap<String, SubjectId>> {
    let mut out = HashMap::new();
    for chunk in names.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(String, i32)> = subject::table
            .filter(subject::name.eq_any(chunk))
            .select((subject::name, subject::id))
            .load(conn)?;
        out.extend(rows.into_iter().map(|(k, id)| (k, SubjectId(id))));
    }
    Ok(out)
}

/// Existing teachers by `(first name, last name)`.
///
/// SQLite has no row-value `IN` through Diesel, so this narrows by first name
/// in SQL and checks the full pair in memory.
pub fn teachers(
    conn: &mut SqliteConnection,
    names: &[(String, String)],
) -> QueryResult<HashMap<(String, String), TeacherId>> {
    let wanted: HashSet<&(String, String)> = names.iter().collect();
    let firsts: Vec<String> = names
        .iter()
        .map(|(first, _)| first.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut out = HashMap::new();
    for chunk in firsts.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(String, String, i32)> = teacher::table
            .filter(teacher::first_name.eq_any(chunk))
            .select((teacher::first_name, teacher::last_name, teacher::id))
            .load(conn)?;
        for (first, last, id) in rows {
            let key = (first, last);
            if wanted.contains(&key) {
                out.insert(key, TeacherId(id));
            }
        }
    }
    Ok(out)
}

/// Existing classrooms by name.
pub fn classrooms(
    conn: &mut SqliteConnection,
    names: &[String],
) -> QueryResult<HashMap<String, ClassroomId>> {
    let mut out = HashMap::new();
    for chunk in names.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(String, i32)> = classroom::table
            .filter(classroom::name.eq_any(chunk))
            .select((classroom::name, classroom::id))
            .load(conn)?;
        out.extend(rows.into_iter().map(|(k, id)| (k, ClassroomId(id))));
    }
    Ok(out)
}

/// Existing cohorts of `timetable` by name.
pub fn cohorts(
    conn: &mut SqliteConnection,
    timetable: TimetableId,
    names: &[String],
) -> QueryResult<HashMap<String, CohortId>> {
    let mut out = HashMap::new();
    for chunk in names.chunks(LOOKUP_CHUNK) {
        let rows: Vec<(String, i32)> = cohort::table
            .filter(cohort::timetable_id.eq(timetable.get()))
            .filter(cohort::name.eq_any(chunk))
            .select((cohort::name, cohort::id))
            .load(conn)?;
        out.extend(rows.into_iter().map(|(k, id)| (k, CohortId(id))));
    }
    Ok(out)
}

/// The building with this name, if any.
pub fn building(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<BuildingId>> {
    building::table
        .filter(building::name.eq(name))
        .select(building::id)
        .first::<i32>(conn)
        .optional()
        .map(|id| id.map(BuildingId))
}

/// The week definition with this name, if any.
pub fn week(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<WeekDefinitionId>> {
    week_definition::table
        .filter(week_definition::name.eq(name))
        .select(week_definition::id)
        .first::<i32>(conn)
        .optional()
        .map(|id| id.map(WeekDefinitionId))
}
