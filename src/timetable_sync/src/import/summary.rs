use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    ids::{LessonId, TimetableId},
    lesson::{PersistOutcome, UnresolvedReference},
    reconcile::{EntityCount, ReferenceCounts, ReferenceMaps},
};

/// Lesson-level counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LessonCount {
    /// Distinct lessons that already existed in the timetable.
    pub matched: usize,
    /// Lessons inserted.
    pub created: usize,
    /// Distinct lessons the run resolved to.
    pub total: usize,
    /// Schedule entries mapped onto a lesson.
    pub entries: usize,
}

/// What an import did, by entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Timetable created for the run.
    pub timetable: TimetableId,
    /// Periods.
    pub periods: EntityCount,
    /// Day definitions.
    pub days: EntityCount,
    /// Subjects.
    pub subjects: EntityCount,
    /// Teachers.
    pub teachers: EntityCount,
    /// Classrooms.
    pub classrooms: EntityCount,
    /// Cohorts.
    pub cohorts: EntityCount,
    /// The configured week definition (one row, matched or created).
    pub week: EntityCount,
    /// `<class>` elements skipped for lack of a supervising teacher.
    pub cohorts_skipped: usize,
    /// Lessons.
    pub lessons: LessonCount,
    /// Schedule entries missing day, subject or period.
    pub entries_sparse: usize,
    /// Schedule entries whose day, subject or period did not resolve.
    pub entries_unresolved: usize,
    /// Whether the run was rolled back on purpose.
    pub dry_run: bool,
}

impl ImportSummary {
    pub(crate) fn new(
        timetable: TimetableId,
        refs: &ReferenceCounts,
        persisted: &PersistOutcome,
        entries_sparse: usize,
        entries_unresolved: usize,
    ) -> Self {
        Self {
            timetable,
            periods: refs.periods,
            days: refs.days,
            subjects: refs.subjects,
            teachers: refs.teachers,
            classrooms: refs.classrooms,
            cohorts: refs.cohorts,
            week: EntityCount {
                matched: usize::from(!refs.week_created),
                created: usize::from(refs.week_created),
            },
            cohorts_skipped: refs.cohorts_skipped,
            lessons: LessonCount {
                matched: persisted.matched,
                created: persisted.created,
                total: persisted.matched + persisted.created,
                entries: persisted.lessons.len(),
            },
            entries_sparse,
            entries_unresolved,
            dry_run: false,
        }
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.dry_run { "dry run, rolled back" } else { "committed" };
        writeln!(f, "timetable {} ({state})", self.timetable)?;
        for (label, c) in [
            ("periods", self.periods),
            ("days", self.days),
            ("subjects", self.subjects),
            ("teachers", self.teachers),
            ("classrooms", self.classrooms),
            ("cohorts", self.cohorts),
            ("week", self.week),
        ] {
            writeln!(f, "  {label:<11} matched {:>4}  created {:>4}", c.matched, c.created)?;
        }
        writeln!(
            f,
            "  {:<11} matched {:>4}  created {:>4}  total {}  entries {}",
            "lessons",
            self.lessons.matched,
            self.lessons.created,
            self.lessons.total,
            self.lessons.entries
        )?;
        write!(
            f,
            "  skipped     cohorts {}  sparse entries {}  unresolved entries {}",
            self.cohorts_skipped, self.entries_sparse, self.entries_unresolved
        )
    }
}

/// Summary plus the id mappings a library caller may want to keep.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Counts.
    pub summary: ImportSummary,
    /// Source id → persisted id per reference class.
    pub maps: ReferenceMaps,
    /// Schedule entry index → lesson.
    pub lessons: IndexMap<usize, LessonId>,
    /// Entries dropped for an unresolved day, subject or period.
    pub unresolved: Vec<UnresolvedReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImportSummary {
        let one = EntityCount { matched: 0, created: 1 };
        ImportSummary {
            timetable: TimetableId(1),
            periods: one,
            days: one,
            subjects: one,
            teachers: EntityCount { matched: 2, created: 1 },
            classrooms: one,
            cohorts: one,
            week: one,
            cohorts_skipped: 1,
            lessons: LessonCount { matched: 0, created: 1, total: 1, entries: 2 },
            entries_sparse: 3,
            entries_unresolved: 0,
            dry_run: false,
        }
    }

    #[test]
    fn renders_as_table() {
        insta::assert_snapshot!(sample(), @r"
        timetable 1 (committed)
          periods     matched    0  created    1
          days        matched    0  created    1
          subjects    matched    0  created    1
          teachers    matched    2  created    1
          classrooms  matched    0  created    1
          cohorts     matched    0  created    1
          week        matched    0  created    1
          lessons     matched    0  created    1  total 1  entries 2
          skipped     cohorts 1  sparse entries 3  unresolved entries 0
        ");
    }

    #[test]
    fn serializes_flat_counts() {
        let mut s = sample();
        s.dry_run = true;
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["timetable"], 1);
        assert_eq!(v["teachers"]["matched"], 2);
        assert_eq!(v["lessons"]["entries"], 2);
        assert_eq!(v["dry_run"], true);
        assert!(s.to_string().starts_with("timetable 1 (dry run, rolled back)"));
    }
}
