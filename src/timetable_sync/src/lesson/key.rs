//! Composite identity of a lesson.
//!
//! Two lessons are the same lesson when they share subject, day, week and
//! period and are attended by the same cohorts, taught by the same teachers,
//! and held in the same classrooms. Order and repetition inside those sets do
//! not matter; [`LessonKey::new`] canonicalizes them.
//!
//! The canonical string form is
//!
//! ```text
//! s<subject>|d<day>|w<week>|p<period>|c<id,id,...>|t<id,...>|r<id,...>
//! ```
//!
//! and parses back to an equal key.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::ids::{
    ClassroomId, CohortId, DayDefinitionId, PeriodId, SubjectId, TeacherId, WeekDefinitionId,
};

/// Natural key of a lesson within one timetable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonKey {
    subject: SubjectId,
    day: DayDefinitionId,
    week: WeekDefinitionId,
    period: PeriodId,
    cohorts: Vec<CohortId>,
    teachers: Vec<TeacherId>,
    classrooms: Vec<ClassroomId>,
}

impl LessonKey {
    /// Builds a key, sorting and deduplicating the three id sets.
    pub fn new(
        subject: SubjectId,
        day: DayDefinitionId,
        week: WeekDefinitionId,
        period: PeriodId,
        cohorts: impl IntoIterator<Item = CohortId>,
        teachers: impl IntoIterator<Item = TeacherId>,
        classrooms: impl IntoIterator<Item = ClassroomId>,
    ) -> Self {
        Self {
            subject,
            day,
            week,
            period,
            cohorts: canonical(cohorts),
            teachers: canonical(teachers),
            classrooms: canonical(classrooms),
        }
    }

    /// Subject taught.
    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    /// Day definition.
    pub fn day(&self) -> DayDefinitionId {
        self.day
    }

    /// Week definition.
    pub fn week(&self) -> WeekDefinitionId {
        self.week
    }

    /// Period of the day.
    pub fn period(&self) -> PeriodId {
        self.period
    }

    /// Attending cohorts, ascending.
    pub fn cohorts(&self) -> &[CohortId] {
        &self.cohorts
    }

    /// Teaching staff, ascending.
    pub fn teachers(&self) -> &[TeacherId] {
        &self.teachers
    }

    /// Rooms, ascending.
    pub fn classrooms(&self) -> &[ClassroomId] {
        &self.classrooms
    }
}

fn canonical<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut v: Vec<T> = ids.into_iter().collect();
    v.sort_unstable();
    v.dedup();
    v
}

fn write_set<T: fmt::Display>(f: &mut fmt::Formatter<'_>, ids: &[T]) -> fmt::Result {
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{id}")?;
    }
    Ok(())
}

impl fmt::Display for LessonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s{}|d{}|w{}|p{}|c",
            self.subject, self.day, self.week, self.period
        )?;
        write_set(f, &self.cohorts)?;
        f.write_str("|t")?;
        write_set(f, &self.teachers)?;
        f.write_str("|r")?;
        write_set(f, &self.classrooms)
    }
}

/// Why a string is not a canonical lesson key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLessonKeyError {
    /// Not exactly seven `|`-separated fields.
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),
    /// A field did not start with its expected tag letter.
    #[error("field {index} should start with `{expected}`")]
    Prefix {
        /// Zero-based field position.
        index: usize,
        /// Expected tag letter.
        expected: char,
    },
    /// A field held something other than a decimal id.
    #[error("field {index}: invalid id {value:?}")]
    Id {
        /// Zero-based field position.
        index: usize,
        /// Offending text.
        value: String,
    },
}

const PREFIXES: [char; 7] = ['s', 'd', 'w', 'p', 'c', 't', 'r'];

impl FromStr for LessonKey {
    type Err = ParseLessonKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('|').collect();
        if fields.len() != PREFIXES.len() {
            return Err(ParseLessonKeyError::FieldCount(fields.len()));
        }

        let mut bodies = [""; 7];
        for (index, (field, expected)) in fields.iter().zip(PREFIXES).enumerate() {
            bodies[index] = field
                .strip_prefix(expected)
                .ok_or(ParseLessonKeyError::Prefix { index, expected })?;
        }

        fn one<T: FromStr>(index: usize, body: &str) -> Result<T, ParseLessonKeyError> {
            body.parse().map_err(|_| ParseLessonKeyError::Id {
                index,
                value: body.to_string(),
            })
        }
        fn set<T: FromStr>(index: usize, body: &str) -> Result<Vec<T>, ParseLessonKeyError> {
            if body.is_empty() {
                return Ok(Vec::new());
            }
            body.split(',').map(|id| one(index, id)).collect()
        }

        Ok(Self::new(
            one(0, bodies[0])?,
            one(1, bodies[1])?,
            one(2, bodies[2])?,
            one(3, bodies[3])?,
            set::<CohortId>(4, bodies[4])?,
            set::<TeacherId>(5, bodies[5])?,
            set::<ClassroomId>(6, bodies[6])?,
        ))
    }
}
