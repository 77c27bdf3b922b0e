//! Insert the reference rows that did not match anything persisted.
//!
//! Every insert is a multi-row `INSERT ... RETURNING` that hands back the
//! natural-key columns next to the generated id, so results are matched to
//! wanted rows by key and not by position.

use std::collections::HashMap;

use diesel::{insert_into, prelude::*};

use crate::{
    config::NamedCfg,
    error::{ImportError, ImportResult},
    ids::{
        BuildingId, ClassroomId, CohortId, DayDefinitionId, PeriodId, SubjectId, TeacherId,
        TimetableId, WeekDefinitionId,
    },
    models::{
        NewBuilding, NewClassroom, NewCohort, NewDayDefinition, NewPeriod, NewSubject, NewTeacher,
        NewWeekDefinition,
    },
    reconcile::want::{WantedClassroom, WantedCohort},
    schema::{
        building, classroom, cohort, day_definition, period, subject, teacher, week_definition,
    },
};

/// Fails unless an insert returned exactly one row per value sent.
pub(crate) fn check_returned(
    entity: &'static str,
    expected: usize,
    returned: usize,
) -> ImportResult<()> {
    if expected == returned {
        Ok(())
    } else {
        Err(ImportError::StoreInvariant {
            entity,
            expected,
            returned,
        })
    }
}

/// Insert periods; returns ordinal → id.
pub fn periods(
    conn: &mut SqliteConnection,
    rows: &[(i32, NewPeriod)],
    chunk: usize,
) -> ImportResult<HashMap<i32, PeriodId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewPeriod> = part.iter().map(|(_, r)| r.clone()).collect();
        let got: Vec<(i32, i32)> = insert_into(period::table)
            .values(&values)
            .returning((period::ordinal, period::id))
            .get_results(conn)?;
        check_returned("period", values.len(), got.len())?;
        out.extend(got.into_iter().map(|(k, id)| (k, PeriodId(id))));
    }
    Ok(out)
}

/// Insert day definitions; returns name → id.
pub fn days(
    conn: &mut SqliteConnection,
    rows: &[(String, NewDayDefinition)],
    chunk: usize,
) -> ImportResult<HashMap<String, DayDefinitionId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewDayDefinition> = part.iter().map(|(_, r)| r.clone()).collect();
        let got: Vec<(String, i32)> = insert_into(day_definition::table)
            .values(&values)
            .returning((day_definition::name, day_definition::id))
            .get_results(conn)?;
        check_returned("day_definition", values.len(), got.len())?;
        out.extend(got.into_iter().map(|(k, id)| (k, DayDefinitionId(id))));
    }
    Ok(out)
}

/// Insert subjects; returns name → id.
pub fn subjects(
    conn: &mut SqliteConnection,
    rows: &[(String, NewSubject)],
    chunk: usize,
) -> ImportResult<HashMap<String, SubjectId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewSubject> = part.iter().map(|(_, r)| r.clone()).collect();
        let got: Vec<(String, i32)> = insert_into(subject::table)
            .values(&values)
            .returning((subject::name, subject::id))
            .get_results(conn)?;
        check_returned("subject", values.len(), got.len())?;
        out.extend(got.into_iter().map(|(k, id)| (k, SubjectId(id))));
    }
    Ok(out)
}

/// Insert teachers; returns (first, last) → id.
pub fn teachers(
    conn: &mut SqliteConnection,
    rows: &[((String, String), NewTeacher)],
    chunk: usize,
) -> ImportResult<HashMap<(String, String), TeacherId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewTeacher> = part.iter().map(|(_, r)| r.clone()).collect();
        let got: Vec<(String, String, i32)> = insert_into(teacher::table)
            .values(&values)
            .returning((teacher::first_name, teacher::last_name, teacher::id))
            .get_results(conn)?;
        check_returned("teacher", values.len(), got.len())?;
        out.extend(
            got.into_iter()
                .map(|(first, last, id)| ((first, last), TeacherId(id))),
        );
    }
    Ok(out)
}

/// Matches the configured building by name, creating it if absent.
/// Returns the id and whether it was created.
pub fn ensure_building(
    conn: &mut SqliteConnection,
    cfg: &NamedCfg,
) -> ImportResult<(BuildingId, bool)> {
    if let Some(id) = super::read::building(conn, &cfg.name)? {
        return Ok((id, false));
    }
    let got: Vec<i32> = insert_into(building::table)
        .values(&NewBuilding {
            name: &cfg.name,
            short: &cfg.short,
        })
        .returning(building::id)
        .get_results(conn)?;
    check_returned("building", 1, got.len())?;
    Ok((BuildingId(got[0]), true))
}

/// Insert classrooms into `building`; returns name → id.
pub fn classrooms(
    conn: &mut SqliteConnection,
    building: BuildingId,
    rows: &[(String, WantedClassroom)],
    chunk: usize,
) -> ImportResult<HashMap<String, ClassroomId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewClassroom> = part
            .iter()
            .map(|(name, r)| NewClassroom {
                name: name.clone(),
                short: r.short.clone(),
                capacity: r.capacity,
                building_id: building.get(),
            })
            .collect();
        let got: Vec<(String, i32)> = insert_into(classroom::table)
            .values(&values)
            .returning((classroom::name, classroom::id))
            .get_results(conn)?;
        check_returned("classroom", values.len(), got.len())?;
        out.extend(got.into_iter().map(|(k, id)| (k, ClassroomId(id))));
    }
    Ok(out)
}

/// Insert cohorts of `timetable`; returns name → id.
pub fn cohorts(
    conn: &mut SqliteConnection,
    timetable: TimetableId,
    rows: &[(String, WantedCohort)],
    chunk: usize,
) -> ImportResult<HashMap<String, CohortId>> {
    let mut out = HashMap::with_capacity(rows.len());
    for part in rows.chunks(chunk) {
        let values: Vec<NewCohort> = part
            .iter()
            .map(|(name, r)| NewCohort {
                timetable_id: timetable.get(),
                name: name.clone(),
                short: r.short.clone(),
                teacher_id: Some(r.teacher.get()),
            })
            .collect();
        let got: Vec<(String, i32)> = insert_into(cohort::table)
            .values(&values)
            .returning((cohort::name, cohort::id))
            .get_results(conn)?;
        check_returned("cohort", values.len(), got.len())?;
        out.extend(got.into_iter().map(|(k, id)| (k, CohortId(id))));
    }
    Ok(out)
}

/// Matches the configured week definition by name, creating it (with an
/// empty week list) if absent. Returns the id and whether it was created.
pub fn ensure_week(
    conn: &mut SqliteConnection,
    cfg: &NamedCfg,
) -> ImportResult<(WeekDefinitionId, bool)> {
    if let Some(id) = super::read::week(conn, &cfg.name)? {
        return Ok((id, false));
    }
    let got: Vec<i32> = insert_into(week_definition::table)
        .values(&NewWeekDefinition {
            name: &cfg.name,
            short: &cfg.short,
            weeks: "",
        })
        .returning(week_definition::id)
        .get_results(conn)?;
    check_returned("week_definition", 1, got.len())?;
    Ok((WeekDefinitionId(got[0]), true))
}
