//! Write lesson drafts, reusing lessons the timetable already has.
//!
//! ## Steps
//! 1. **Hydrate**: load the timetable's lessons and their cohort/teacher/room
//!    links and rebuild each one's [`LessonKey`].
//! 2. **Match**: a draft whose key is already persisted maps to that lesson.
//!    Drafts sharing a key within one run share the first draft's lesson.
//! 3. **Insert** the remaining distinct keys in document order, `batch_size`
//!    rows per statement, followed by that batch's link rows.
//!
//! ## Generated ids
//! A multi-row `INSERT ... RETURNING id` makes no promise about the order of
//! the returned rows, but under the transaction's write lock SQLite hands out
//! ascending rowids in `VALUES` order. Returned ids are therefore sorted and
//! zipped with the batch. A count mismatch aborts the import.

use std::collections::HashMap;

use diesel::{insert_into, prelude::*};
use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::{
    error::ImportResult,
    ids::{
        ClassroomId, CohortId, DayDefinitionId, LessonId, PeriodId, SubjectId, TeacherId,
        TimetableId, WeekDefinitionId,
    },
    lesson::{assemble::LessonDraft, key::LessonKey},
    models::{LessonClassroom, LessonCohort, LessonTeacher, NewLesson},
    reconcile::check_returned,
    schema::{lesson, lesson_classroom, lesson_cohort, lesson_teacher},
};

/// Result of [`persist_lessons`].
#[derive(Debug, Clone, Default)]
pub struct PersistOutcome {
    /// Entry index → lesson, for every draft, in document order.
    pub lessons: IndexMap<usize, LessonId>,
    /// Distinct lessons that already existed.
    pub matched: usize,
    /// Lessons inserted by this run.
    pub created: usize,
}

#[derive(Default)]
struct Links {
    cohorts: Vec<CohortId>,
    teachers: Vec<TeacherId>,
    classrooms: Vec<ClassroomId>,
}

/// Rebuild the keys of every lesson already stored for `timetable`.
pub fn persisted_keys(
    conn: &mut SqliteConnection,
    timetable: TimetableId,
) -> QueryResult<HashMap<LessonKey, LessonId>> {
    let rows: Vec<(i32, i32, i32, i32, i32)> = lesson::table
        .filter(lesson::timetable_id.eq(timetable.get()))
        .select((
            lesson::id,
            lesson::subject_id,
            lesson::day_definition_id,
            lesson::week_definition_id,
            lesson::period_id,
        ))
        .order(lesson::id.asc())
        .load(conn)?;
    if rows.is_empty() {
        return Ok(HashMap::new());
    }

    let mut links: HashMap<i32, Links> = HashMap::with_capacity(rows.len());

    let cohorts: Vec<(i32, i32)> = lesson_cohort::table
        .inner_join(lesson::table)
        .filter(lesson::timetable_id.eq(timetable.get()))
        .select((lesson_cohort::lesson_id, lesson_cohort::cohort_id))
        .load(conn)?;
    for (l, c) in cohorts {
        links.entry(l).or_default().cohorts.push(CohortId(c));
    }

    let teachers: Vec<(i32, i32)> = lesson_teacher::table
        .inner_join(lesson::table)
        .filter(lesson::timetable_id.eq(timetable.get()))
        .select((lesson_teacher::lesson_id, lesson_teacher::teacher_id))
        .load(conn)?;
    for (l, t) in teachers {
        links.entry(l).or_default().teachers.push(TeacherId(t));
    }

    let classrooms: Vec<(i32, i32)> = lesson_classroom::table
        .inner_join(lesson::table)
        .filter(lesson::timetable_id.eq(timetable.get()))
        .select((lesson_classroom::lesson_id, lesson_classroom::classroom_id))
        .load(conn)?;
    for (l, r) in classrooms {
        links.entry(l).or_default().classrooms.push(ClassroomId(r));
    }

    let mut out = HashMap::with_capacity(rows.len());
    for (id, subject, day, week, period) in rows {
        let l = links.remove(&id).unwrap_or_default();
        let key = LessonKey::new(
            SubjectId(subject),
            DayDefinitionId(day),
            WeekDefinitionId(week),
            PeriodId(period),
            l.cohorts,
            l.teachers,
            l.classrooms,
        );
        // Lowest id wins if the store already holds duplicates.
        out.entry(key).or_insert(LessonId(id));
    }
    Ok(out)
}

/// Persist `drafts` into `timetable`. Must run inside a write transaction.
#[instrument(level = "info", skip_all, fields(timetable = %timetable, drafts = drafts.len()))]
pub fn persist_lessons(
    conn: &mut SqliteConnection,
    timetable: TimetableId,
    drafts: &[LessonDraft],
    batch_size: usize,
) -> ImportResult<PersistOutcome> {
    let existing = persisted_keys(conn, timetable)?;
    debug!(existing = existing.len(), "lessons hydrated");

    // Key → slot in `fresh`, for drafts that repeat a not-yet-persisted key.
    let mut pending: HashMap<&LessonKey, usize> = HashMap::new();
    let mut fresh: Vec<&LessonDraft> = Vec::new();
    let mut matched: HashMap<&LessonKey, LessonId> = HashMap::new();
    for draft in drafts {
        if let Some(id) = existing.get(&draft.key) {
            matched.insert(&draft.key, *id);
        } else if !pending.contains_key(&draft.key) {
            pending.insert(&draft.key, fresh.len());
            fresh.push(draft);
        }
    }

    let mut created_ids: Vec<LessonId> = Vec::with_capacity(fresh.len());
    for (n, batch) in fresh.chunks(batch_size.max(1)).enumerate() {
        let ids = insert_batch(conn, timetable, batch)?;
        debug!(batch = n, rows = ids.len(), "lesson batch inserted");
        created_ids.extend(ids);
    }

    let mut lessons = IndexMap::with_capacity(drafts.len());
    for draft in drafts {
        let id = match matched.get(&draft.key) {
            Some(id) => *id,
            None => created_ids[pending[&draft.key]],
        };
        lessons.insert(draft.entry, id);
    }

    let outcome = PersistOutcome {
        lessons,
        matched: matched.len(),
        created: created_ids.len(),
    };
    info!(
        matched = outcome.matched,
        created = outcome.created,
        entries = outcome.lessons.len(),
        "lessons persisted"
    );
    Ok(outcome)
}

fn insert_batch(
    conn: &mut SqliteConnection,
    timetable: TimetableId,
    batch: &[&LessonDraft],
) -> ImportResult<Vec<LessonId>> {
    let values: Vec<NewLesson> = batch
        .iter()
        .map(|d| NewLesson {
            timetable_id: timetable.get(),
            subject_id: d.key.subject().get(),
            day_definition_id: d.key.day().get(),
            week_definition_id: d.key.week().get(),
            period_id: d.key.period().get(),
            periods_per_week: d.periods_per_week,
        })
        .collect();

    let mut ids: Vec<i32> = insert_into(lesson::table)
        .values(&values)
        .returning(lesson::id)
        .get_results(conn)?;
    check_returned("lesson", values.len(), ids.len())?;
    ids.sort_unstable();

    let mut cohorts = Vec::new();
    let mut teachers = Vec::new();
    let mut classrooms = Vec::new();
    for (draft, &lesson_id) in batch.iter().zip(&ids) {
        cohorts.extend(draft.key.cohorts().iter().map(|c| LessonCohort {
            lesson_id,
            cohort_id: c.get(),
        }));
        teachers.extend(draft.key.teachers().iter().map(|t| LessonTeacher {
            lesson_id,
            teacher_id: t.get(),
        }));
        classrooms.extend(draft.key.classrooms().iter().map(|r| LessonClassroom {
            lesson_id,
            classroom_id: r.get(),
        }));
    }
    if !cohorts.is_empty() {
        insert_into(lesson_cohort::table).values(&cohorts).execute(conn)?;
    }
    if !teachers.is_empty() {
        insert_into(lesson_teacher::table).values(&teachers).execute(conn)?;
    }
    if !classrooms.is_empty() {
        insert_into(lesson_classroom::table)
            .values(&classrooms)
            .execute(conn)?;
    }

    Ok(ids.into_iter().map(LessonId).collect())
}
