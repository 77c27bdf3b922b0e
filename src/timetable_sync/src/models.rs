//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]. Reference tables only ever get inserted into by the
//! import, so most of them only have a `New*` form; the `Queryable` rows are
//! for reading an imported timetable back.
//!
//! Insertables that carry an `Option` opt out of "None means DEFAULT" so a
//! batch of rows compiles to one multi-row INSERT on SQLite.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::timetable`]: one import run.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = timetable, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Timetable {
    /// Primary key.
    pub id: i32,
    /// Display name supplied by the caller.
    pub name: String,
    /// First day the timetable applies.
    pub valid_from: NaiveDate,
    /// Row creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Timetable`].
#[derive(Debug, Insertable)]
#[diesel(table_name = timetable)]
pub struct NewTimetable<'a> {
    /// Display name.
    pub name: &'a str,
    /// First day the timetable applies.
    pub valid_from: NaiveDate,
}

/// A row in [`crate::schema::period`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = period, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Period {
    /// Primary key.
    pub id: i32,
    /// Position in the school day (natural key).
    pub ordinal: i32,
    /// Start time of day.
    pub start_time: NaiveTime,
    /// End time of day.
    pub end_time: NaiveTime,
}

/// Insertable form of [`Period`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = period)]
pub struct NewPeriod {
    /// Position in the school day (natural key).
    pub ordinal: i32,
    /// Start time of day.
    pub start_time: NaiveTime,
    /// End time of day.
    pub end_time: NaiveTime,
}

/// Insertable row for [`crate::schema::day_definition`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = day_definition)]
pub struct NewDayDefinition {
    /// Display name (natural key).
    pub name: String,
    /// Short code.
    pub short: String,
    /// Source day codes this definition stands for, comma-separated.
    pub days: String,
}

/// Insertable row for [`crate::schema::week_definition`].
#[derive(Debug, Insertable)]
#[diesel(table_name = week_definition)]
pub struct NewWeekDefinition<'a> {
    /// Display name (natural key).
    pub name: &'a str,
    /// Short code.
    pub short: &'a str,
    /// Week list; always empty for imported definitions.
    pub weeks: &'a str,
}

/// Insertable row for [`crate::schema::subject`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = subject)]
pub struct NewSubject {
    /// Display name (natural key).
    pub name: String,
    /// Short code.
    pub short: String,
}

/// Insertable row for [`crate::schema::teacher`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = teacher)]
pub struct NewTeacher {
    /// Given name (first half of the natural key).
    pub first_name: String,
    /// Family name (second half of the natural key).
    pub last_name: String,
    /// Short code.
    pub short: String,
}

/// Insertable row for [`crate::schema::building`].
#[derive(Debug, Insertable)]
#[diesel(table_name = building)]
pub struct NewBuilding<'a> {
    /// Display name (natural key).
    pub name: &'a str,
    /// Short code.
    pub short: &'a str,
}

/// A row in [`crate::schema::classroom`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = classroom, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Classroom {
    /// Primary key.
    pub id: i32,
    /// Display name (natural key).
    pub name: String,
    /// Short code.
    pub short: String,
    /// Seat count; `None` means unbounded.
    pub capacity: Option<i32>,
    /// Owning building.
    pub building_id: i32,
}

/// Insertable form of [`Classroom`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = classroom, treat_none_as_default_value = false)]
pub struct NewClassroom {
    /// Display name (natural key).
    pub name: String,
    /// Short code.
    pub short: String,
    /// Seat count; `None` means unbounded.
    pub capacity: Option<i32>,
    /// Owning building.
    pub building_id: i32,
}

/// A row in [`crate::schema::cohort`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = cohort, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Cohort {
    /// Primary key.
    pub id: i32,
    /// Owning timetable (half of the natural key).
    pub timetable_id: i32,
    /// Display name (other half of the natural key).
    pub name: String,
    /// Short code.
    pub short: String,
    /// Supervising teacher.
    pub teacher_id: Option<i32>,
}

/// Insertable form of [`Cohort`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = cohort, treat_none_as_default_value = false)]
pub struct NewCohort {
    /// Owning timetable.
    pub timetable_id: i32,
    /// Display name.
    pub name: String,
    /// Short code.
    pub short: String,
    /// Supervising teacher.
    pub teacher_id: Option<i32>,
}

/// A row in [`crate::schema::lesson`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = lesson, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Lesson {
    /// Primary key.
    pub id: i32,
    /// Owning timetable.
    pub timetable_id: i32,
    /// FK to `subject`.
    pub subject_id: i32,
    /// FK to `day_definition`.
    pub day_definition_id: i32,
    /// FK to `week_definition`.
    pub week_definition_id: i32,
    /// FK to `period`.
    pub period_id: i32,
    /// How many periods per week the lesson occupies.
    pub periods_per_week: i32,
}

/// Insertable form of [`Lesson`].
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = lesson)]
pub struct NewLesson {
    /// Owning timetable.
    pub timetable_id: i32,
    /// FK to `subject`.
    pub subject_id: i32,
    /// FK to `day_definition`.
    pub day_definition_id: i32,
    /// FK to `week_definition`.
    pub week_definition_id: i32,
    /// FK to `period`.
    pub period_id: i32,
    /// How many periods per week the lesson occupies.
    pub periods_per_week: i32,
}

/// Link row for [`crate::schema::lesson_cohort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = lesson_cohort)]
pub struct LessonCohort {
    /// FK to `lesson`.
    pub lesson_id: i32,
    /// FK to `cohort`.
    pub cohort_id: i32,
}

/// Link row for [`crate::schema::lesson_teacher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = lesson_teacher)]
pub struct LessonTeacher {
    /// FK to `lesson`.
    pub lesson_id: i32,
    /// FK to `teacher`.
    pub teacher_id: i32,
}

/// Link row for [`crate::schema::lesson_classroom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Insertable, Queryable)]
#[diesel(table_name = lesson_classroom)]
pub struct LessonClassroom {
    /// FK to `lesson`.
    pub lesson_id: i32,
    /// FK to `classroom`.
    pub classroom_id: i32,
}
