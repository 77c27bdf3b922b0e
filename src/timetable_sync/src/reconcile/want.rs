//! Extract the reference rows a document wants, keyed by natural key.
//!
//! Everything here is pure: no store access, so the independent classes can
//! be extracted in parallel.

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::{
    document::{ScheduleDocument, Tag},
    error::{AttributeProblem, ImportResult},
    ids::{SourceId, SourceMap, TeacherId},
    models::{NewDayDefinition, NewPeriod, NewSubject, NewTeacher},
    reconcile::diff::Collected,
};

/// A classroom before its building is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedClassroom {
    /// Short code.
    pub short: String,
    /// Seat count; `None` for the export's `*` (unbounded).
    pub capacity: Option<i32>,
}

/// A cohort whose supervising teacher resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantedCohort {
    /// Short code.
    pub short: String,
    /// Supervising teacher.
    pub teacher: TeacherId,
}

/// Cohorts the document wants plus how many were skipped for lack of a teacher.
#[derive(Debug, Default)]
pub struct WantedCohorts {
    /// Cohorts keyed by display name.
    pub collected: Collected<String, WantedCohort>,
    /// `<class>` elements dropped because their teacher did not resolve.
    pub skipped: usize,
}

/// Periods keyed by ordinal. The ordinal doubles as the source id, since
/// schedule entries refer to periods by number.
pub fn periods<D: ScheduleDocument + ?Sized>(doc: &D) -> ImportResult<Collected<i32, NewPeriod>> {
    let mut out = Collected::default();
    for el in doc.elements(Tag::Period) {
        let ordinal = el.required_with("period", |v| v.parse::<i32>())?;
        let start_time = el.required_with("starttime", parse_time)?;
        let end_time = el.required_with("endtime", parse_time)?;
        if end_time <= start_time {
            return Err(el.malformed(AttributeProblem::Invalid {
                attribute: "endtime",
                value: el.attribute("endtime").unwrap_or_default().to_string(),
                reason: "period ends before it starts".into(),
            }));
        }
        out.push(
            SourceId::new(&ordinal.to_string()),
            ordinal,
            NewPeriod {
                ordinal,
                start_time,
                end_time,
            },
        );
    }
    Ok(out)
}

/// Day definitions keyed by display name.
pub fn days<D: ScheduleDocument + ?Sized>(
    doc: &D,
) -> ImportResult<Collected<String, NewDayDefinition>> {
    let mut out = Collected::default();
    for el in doc.elements(Tag::Day) {
        let source = SourceId::new(el.required("id")?);
        let name = el.required("name")?.to_string();
        let short = el.required("short")?.to_string();
        let days = el
            .optional("days")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        out.push(source, name.clone(), NewDayDefinition { name, short, days });
    }
    Ok(out)
}

/// Subjects keyed by display name.
pub fn subjects<D: ScheduleDocument + ?Sized>(
    doc: &D,
) -> ImportResult<Collected<String, NewSubject>> {
    let mut out = Collected::default();
    for el in doc.elements(Tag::Subject) {
        let source = SourceId::new(el.required("id")?);
        let name = el.required("name")?.to_string();
        let short = el.required("short")?.to_string();
        out.push(source, name.clone(), NewSubject { name, short });
    }
    Ok(out)
}

/// Teachers keyed by `(first name, last name)`.
///
/// The export's `gender` and `color` attributes have no column to land in and
/// are dropped.
pub fn teachers<D: ScheduleDocument + ?Sized>(
    doc: &D,
) -> ImportResult<Collected<(String, String), NewTeacher>> {
    let mut out = Collected::default();
    let mut discarded = 0usize;
    for el in doc.elements(Tag::Teacher) {
        let source = SourceId::new(el.required("id")?);
        let (first_name, last_name) = split_full_name(el.required("name")?);
        let short = el.required("short")?.to_string();
        if el.optional("gender").is_some() || el.optional("color").is_some() {
            discarded += 1;
        }
        out.push(
            source,
            (first_name.clone(), last_name.clone()),
            NewTeacher {
                first_name,
                last_name,
                short,
            },
        );
    }
    if discarded > 0 {
        debug!(teachers = discarded, "gender/color attributes not imported");
    }
    Ok(out)
}

/// Classrooms keyed by display name.
pub fn classrooms<D: ScheduleDocument + ?Sized>(
    doc: &D,
) -> ImportResult<Collected<String, WantedClassroom>> {
    let mut out = Collected::default();
    for el in doc.elements(Tag::Classroom) {
        let source = SourceId::new(el.required("id")?);
        let name = el.required("name")?.to_string();
        let short = el.required("short")?.to_string();
        let capacity = el.required_with("capacity", parse_capacity)?;
        out.push(source, name, WantedClassroom { short, capacity });
    }
    Ok(out)
}

/// Cohorts keyed by display name (the timetable half of the key is fixed per run).
///
/// A `<class>` whose `teacherid` is absent or does not resolve is skipped.
pub fn cohorts<D: ScheduleDocument + ?Sized>(
    doc: &D,
    teachers: &SourceMap<TeacherId>,
) -> ImportResult<WantedCohorts> {
    let mut out = WantedCohorts::default();
    for el in doc.elements(Tag::Class) {
        let source = SourceId::new(el.required("id")?);
        let name = el.required("name")?.to_string();
        let short = el.required("short")?.to_string();

        let Some(teacher) = el.optional("teacherid").and_then(|t| teachers.resolve(t)) else {
            warn!(
                class = %source,
                name = %name,
                teacher = el.optional("teacherid").unwrap_or("<none>"),
                "class has no resolvable supervising teacher; skipped"
            );
            out.skipped += 1;
            continue;
        };
        out.collected.push(source, name, WantedCohort { short, teacher });
    }
    Ok(out)
}

/// Splits a full name on its first space: `"Mary Ann Smith"` → (`"Mary"`, `"Ann Smith"`).
/// A single word becomes the first name with an empty last name.
pub fn split_full_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.split_once(' ') {
        Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
        None => (full.to_string(), String::new()),
    }
}

/// `"*"` means unbounded; anything else must be a non-negative integer.
pub fn parse_capacity(raw: &str) -> Result<Option<i32>, String> {
    if raw == "*" {
        return Ok(None);
    }
    match raw.parse::<i32>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        Ok(_) => Err("capacity cannot be negative".into()),
        Err(e) => Err(e.to_string()),
    }
}

/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
}
