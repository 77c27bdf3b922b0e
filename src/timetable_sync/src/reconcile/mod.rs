//! Reference-entity reconciliation (periods, days, subjects, teachers,
//! classrooms, cohorts, and the configured week definition).
//!
//! ## What this does
//! - Extracts the rows each reference class wants from the document, keyed by
//!   the class's **natural key** (period ordinal, display name, or teacher
//!   first/last name pair).
//! - Looks the keys up in bulk, inserts only the missing ones, and maps every
//!   **source id** onto the persisted id, whether matched or created.
//!
//! ## Ordering
//! The five independent extractions (period, day, subject, teacher,
//! classroom) are pure and run in parallel. Store work is sequential on the
//! caller's connection, inside the caller's transaction. Cohorts go last:
//! resolving a cohort's supervising teacher needs the finished teacher map.
//!
//! ## Building and week
//! Every imported classroom is anchored to the configured building, which is
//! created on first use. Every lesson points at the configured week
//! definition, which is matched by name or created.

mod apply;
pub mod diff;
mod read;
pub mod want;

use diesel::SqliteConnection;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    config::ImportConfig,
    document::ScheduleDocument,
    error::ImportResult,
    ids::{
        ClassroomId, CohortId, DayDefinitionId, PeriodId, SourceMap, SubjectId, TeacherId,
        TimetableId, WeekDefinitionId,
    },
};

pub(crate) use apply::check_returned;
pub use diff::EntityCount;

/// Source id → persisted id for every reference class.
#[derive(Debug, Clone)]
pub struct ReferenceMaps {
    /// Keyed by the period ordinal as written in the document.
    pub periods: SourceMap<PeriodId>,
    /// `<day id=..>` → day definition.
    pub days: SourceMap<DayDefinitionId>,
    /// `<subject id=..>` → subject.
    pub subjects: SourceMap<SubjectId>,
    /// `<teacher id=..>` → teacher.
    pub teachers: SourceMap<TeacherId>,
    /// `<classroom id=..>` → classroom.
    pub classrooms: SourceMap<ClassroomId>,
    /// `<class id=..>` → cohort of the importing timetable.
    pub cohorts: SourceMap<CohortId>,
    /// Week definition every lesson of this run points at.
    pub week: WeekDefinitionId,
}

/// Per-class match/create counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceCounts {
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
    /// Cohorts of the importing timetable.
    pub cohorts: EntityCount,
    /// `<class>` elements dropped because their teacher did not resolve.
    pub cohorts_skipped: usize,
    /// Whether the configured building had to be created.
    pub building_created: bool,
    /// Whether the configured week definition had to be created.
    pub week_created: bool,
}

/// Everything later phases need from reconciliation.
#[derive(Debug, Clone)]
pub struct ReferenceOutcome {
    /// Id maps for lesson assembly.
    pub maps: ReferenceMaps,
    /// Counts for the import summary.
    pub counts: ReferenceCounts,
}

/// Reconcile every reference class of `doc` against the store.
///
/// Must run inside a write transaction: lookups and inserts are not atomic on
/// their own, and a concurrent writer could otherwise insert a key between
/// the lookup and the insert.
#[instrument(level = "info", skip_all, fields(timetable = %timetable))]
pub fn reconcile_references<D: ScheduleDocument + ?Sized>(
    conn: &mut SqliteConnection,
    doc: &D,
    timetable: TimetableId,
    cfg: &ImportConfig,
) -> ImportResult<ReferenceOutcome> {
    let chunk = cfg.batch_size.max(1);

    let ((periods, days), (subjects, (teachers, classrooms))) = rayon::join(
        || rayon::join(|| want::periods(doc), || want::days(doc)),
        || {
            rayon::join(
                || want::subjects(doc),
                || rayon::join(|| want::teachers(doc), || want::classrooms(doc)),
            )
        },
    );
    // Surface the first malformed element in document tag order.
    let (periods, days, subjects, teachers, classrooms) =
        (periods?, days?, subjects?, teachers?, classrooms?);

    let existing = read::periods(conn, &periods.keys())?;
    let plan = periods.plan(existing);
    let created = apply::periods(conn, plan.to_create(), chunk)?;
    let periods = plan.finish("period", created)?;
    debug!(matched = periods.count.matched, created = periods.count.created, "periods");

    let existing = read::days(conn, &days.keys())?;
    let plan = days.plan(existing);
    let created = apply::days(conn, plan.to_create(), chunk)?;
    let days = plan.finish("day_definition", created)?;
    debug!(matched = days.count.matched, created = days.count.created, "days");

    let existing = read::subjects(conn, &subjects.keys())?;
    let plan = subjects.plan(existing);
    let created = apply::subjects(conn, plan.to_create(), chunk)?;
    let subjects = plan.finish("subject", created)?;
    debug!(matched = subjects.count.matched, created = subjects.count.created, "subjects");

    let existing = read::teachers(conn, &teachers.keys())?;
    let plan = teachers.plan(existing);
    let created = apply::teachers(conn, plan.to_create(), chunk)?;
    let teachers = plan.finish("teacher", created)?;
    debug!(matched = teachers.count.matched, created = teachers.count.created, "teachers");

    let existing = read::classrooms(conn, &classrooms.keys())?;
    let plan = classrooms.plan(existing);
    let mut building_created = false;
    let created = if plan.to_create().is_empty() {
        Default::default()
    } else {
        let (building, fresh) = apply::ensure_building(conn, &cfg.building)?;
        building_created = fresh;
        apply::classrooms(conn, building, plan.to_create(), chunk)?
    };
    let classrooms = plan.finish("classroom", created)?;
    debug!(
        matched = classrooms.count.matched,
        created = classrooms.count.created,
        building_created,
        "classrooms"
    );

    let wanted = want::cohorts(doc, &teachers.map)?;
    let cohorts_skipped = wanted.skipped;
    let existing = read::cohorts(conn, timetable, &wanted.collected.keys())?;
    let plan = wanted.collected.plan(existing);
    let created = apply::cohorts(conn, timetable, plan.to_create(), chunk)?;
    let cohorts = plan.finish("cohort", created)?;
    debug!(
        matched = cohorts.count.matched,
        created = cohorts.count.created,
        skipped = cohorts_skipped,
        "cohorts"
    );

    let (week, week_created) = apply::ensure_week(conn, &cfg.week)?;

    let counts = ReferenceCounts {
        periods: periods.count,
        days: days.count,
        subjects: subjects.count,
        teachers: teachers.count,
        classrooms: classrooms.count,
        cohorts: cohorts.count,
        cohorts_skipped,
        building_created,
        week_created,
    };
    info!(
        created = counts.created(),
        matched = counts.matched(),
        cohorts_skipped,
        "reference entities reconciled"
    );

    Ok(ReferenceOutcome {
        maps: ReferenceMaps {
            periods: periods.map,
            days: days.map,
            subjects: subjects.map,
            teachers: teachers.map,
            classrooms: classrooms.map,
            cohorts: cohorts.map,
            week,
        },
        counts,
    })
}

impl ReferenceCounts {
    fn classes(&self) -> [EntityCount; 6] {
        [
            self.periods,
            self.days,
            self.subjects,
            self.teachers,
            self.classrooms,
            self.cohorts,
        ]
    }

    /// Rows inserted across all classes (building and week not included).
    pub fn created(&self) -> usize {
        self.classes().iter().map(|c| c.created).sum()
    }

    /// Existing rows matched across all classes.
    pub fn matched(&self) -> usize {
        self.classes().iter().map(|c| c.matched).sum()
    }
}
