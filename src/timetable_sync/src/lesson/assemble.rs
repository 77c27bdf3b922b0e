//! Turn `<card>` elements into lesson drafts using the reference id maps.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    document::{Element, ScheduleDocument, Tag},
    ids::{ClassroomId, CohortId, SourceMap, TeacherId},
    lesson::key::LessonKey,
    reconcile::ReferenceMaps,
};

/// One schedule entry resolved to persisted ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    /// Position of the `<card>` among all `<card>` elements.
    pub entry: usize,
    /// Composite identity; also carries the scalar ids and id sets.
    pub key: LessonKey,
    /// Periods per week; 1 unless the entry says otherwise.
    pub periods_per_week: i32,
}

/// A scalar reference that must resolve for an entry to become a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// `dayid`
    Day,
    /// `subjectid`
    Subject,
    /// `period`
    Period,
}

/// An entry dropped because a required reference pointed at nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Position of the `<card>`.
    pub entry: usize,
    /// Which reference failed.
    pub reference: ReferenceKind,
    /// The value as written.
    pub source_id: String,
}

/// Output of [`assemble_lessons`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Drafts in document order.
    pub drafts: Vec<LessonDraft>,
    /// Entries missing day, subject or period.
    pub sparse: usize,
    /// Entries whose day, subject or period did not resolve.
    pub unresolved: Vec<UnresolvedReference>,
}

/// Build one draft per schedule entry. Never fails: entries that cannot
/// become lessons are counted and skipped.
#[instrument(level = "info", skip_all)]
pub fn assemble_lessons<D: ScheduleDocument + ?Sized>(doc: &D, maps: &ReferenceMaps) -> Assembly {
    let mut out = Assembly::default();

    for el in doc.elements(Tag::Card) {
        let entry = el.index();
        let (Some(day), Some(subject), Some(period)) = (
            el.optional("dayid"),
            el.optional("subjectid"),
            el.optional("period"),
        ) else {
            out.sparse += 1;
            continue;
        };

        let mut missing = None;
        let day_id = maps.days.resolve(day);
        if day_id.is_none() {
            missing = Some((ReferenceKind::Day, day));
        }
        let subject_id = maps.subjects.resolve(subject);
        if subject_id.is_none() && missing.is_none() {
            missing = Some((ReferenceKind::Subject, subject));
        }
        // Periods are keyed by their ordinal, so "01" and "1" are the same period.
        let period_id = period
            .parse::<i32>()
            .ok()
            .and_then(|ordinal| maps.periods.resolve(&ordinal.to_string()));
        if period_id.is_none() && missing.is_none() {
            missing = Some((ReferenceKind::Period, period));
        }

        let (Some(day_id), Some(subject_id), Some(period_id)) = (day_id, subject_id, period_id)
        else {
            if let Some((reference, source_id)) = missing {
                warn!(entry, ?reference, source_id, "schedule entry dropped: unresolved reference");
                out.unresolved.push(UnresolvedReference {
                    entry,
                    reference,
                    source_id: source_id.to_string(),
                });
            }
            continue;
        };

        let cohorts: Vec<CohortId> =
            resolve_all(el, &["classid", "optionalclassid"], &maps.cohorts);
        let teachers: Vec<TeacherId> = resolve_all(el, &["teacherid"], &maps.teachers);
        let classrooms: Vec<ClassroomId> = resolve_all(el, &["classroomid"], &maps.classrooms);

        out.drafts.push(LessonDraft {
            entry,
            key: LessonKey::new(
                subject_id,
                day_id,
                maps.week,
                period_id,
                cohorts,
                teachers,
                classrooms,
            ),
            periods_per_week: periods_per_week(el),
        });
    }

    debug!(
        drafts = out.drafts.len(),
        sparse = out.sparse,
        unresolved = out.unresolved.len(),
        "schedule entries assembled"
    );
    out
}

/// Resolves whichever of `attributes` are present; misses are left out.
fn resolve_all<Id: Copy>(
    el: &Element,
    attributes: &[&'static str],
    map: &SourceMap<Id>,
) -> Vec<Id> {
    let mut ids = Vec::with_capacity(attributes.len());
    for &attribute in attributes {
        let Some(raw) = el.optional(attribute) else {
            continue;
        };
        match map.resolve(raw) {
            Some(id) => ids.push(id),
            None => debug!(entry = el.index(), attribute, raw, "reference omitted: no such id"),
        }
    }
    ids
}

fn periods_per_week(el: &Element) -> i32 {
    match el.optional("periodsperweek").map(str::parse::<i32>) {
        None => 1,
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            debug!(
                entry = el.index(),
                raw = el.optional("periodsperweek"),
                "unusable periodsperweek; using 1"
            );
            1
        }
    }
}
