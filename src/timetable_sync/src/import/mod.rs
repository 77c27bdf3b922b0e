//! Timetable import orchestration.
//!
//! ## What this does
//! - Creates a `timetable` row for the run.
//! - Reconciles reference entities, assembles lessons from schedule entries,
//!   and persists them, in that order.
//! - Reports per-class counts in an [`ImportSummary`].
//!
//! ## Transactions & consistency
//! [`import_timetable`] runs everything inside a single **`BEGIN IMMEDIATE`**
//! transaction via `SqliteConnection::immediate_transaction`. Any failure rolls
//! the whole run back: no timetable, no reference rows, no lessons.
//! [`import_in_transaction`] is for callers that already hold a transaction
//! and want the import to be part of it.
//!
//! ## Dry-run
//! When [`ImportOptions::dry_run`] is set the full pipeline runs and the
//! transaction is then rolled back, so the summary shows what *would* have
//! been written.

mod phase;
mod summary;

use chrono::NaiveDate;
use diesel::{insert_into, prelude::*};
use tracing::{info, info_span, warn};

use crate::{
    config::ImportConfig,
    document::ScheduleDocument,
    error::{ImportError, ImportResult},
    ids::TimetableId,
    lesson::{assemble_lessons, persist_lessons},
    models::NewTimetable,
    reconcile::{check_returned, reconcile_references},
    schema::timetable,
};

pub use phase::{ImportPhase, PhaseTracker};
pub use summary::{ImportReport, ImportSummary, LessonCount};

/// Identity of the timetable an import creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableDescriptor {
    /// Display name.
    pub name: String,
    /// First day the timetable applies.
    pub valid_from: NaiveDate,
}

impl TimetableDescriptor {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, valid_from: NaiveDate) -> Self {
        Self {
            name: name.into(),
            valid_from,
        }
    }
}

/// Options for [`import_timetable`].
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Batch size, building and week settings.
    pub config: ImportConfig,
    /// Run everything, then roll back.
    pub dry_run: bool,
}

enum TxExit {
    Failed(ImportError),
    DryRun(Box<ImportReport>),
}

impl From<diesel::result::Error> for TxExit {
    fn from(e: diesel::result::Error) -> Self {
        TxExit::Failed(e.into())
    }
}

impl From<ImportError> for TxExit {
    fn from(e: ImportError) -> Self {
        TxExit::Failed(e)
    }
}

/// Import `doc` as a new timetable in one immediate transaction.
pub fn import_timetable<D: ScheduleDocument + ?Sized>(
    conn: &mut SqliteConnection,
    doc: &D,
    descriptor: &TimetableDescriptor,
    options: &ImportOptions,
) -> ImportResult<ImportSummary> {
    import_timetable_report(conn, doc, descriptor, options).map(|r| r.summary)
}

/// Like [`import_timetable`], also returning the id mappings.
pub fn import_timetable_report<D: ScheduleDocument + ?Sized>(
    conn: &mut SqliteConnection,
    doc: &D,
    descriptor: &TimetableDescriptor,
    options: &ImportOptions,
) -> ImportResult<ImportReport> {
    let span = info_span!("import", name = %descriptor.name, dry_run = options.dry_run);
    let _guard = span.enter();

    let mut phase = PhaseTracker::new();
    let result = conn.immediate_transaction::<_, TxExit, _>(|conn| {
        let report = run(conn, doc, descriptor, &options.config, &mut phase)?;
        if options.dry_run {
            Err(TxExit::DryRun(Box::new(report)))
        } else {
            Ok(report)
        }
    });

    match result {
        Ok(report) => {
            phase.advance(ImportPhase::Committed);
            info!(timetable = %report.summary.timetable, "import committed");
            Ok(report)
        }
        Err(TxExit::DryRun(mut report)) => {
            phase.abort(&"dry run");
            report.summary.dry_run = true;
            info!(timetable = %report.summary.timetable, "dry run rolled back");
            Ok(*report)
        }
        Err(TxExit::Failed(e)) => {
            // A failed timetable insert never leaves `Created`.
            phase.abort(&e);
            warn!(phase = %phase.current(), error = %e, "import rolled back");
            Err(e)
        }
    }
}

/// Import inside a transaction the caller already holds.
///
/// Nothing is committed or rolled back here; on error the caller must roll
/// back to discard the partial work.
pub fn import_in_transaction<D: ScheduleDocument + ?Sized>(
    conn: &mut SqliteConnection,
    doc: &D,
    descriptor: &TimetableDescriptor,
    config: &ImportConfig,
) -> ImportResult<ImportReport> {
    let mut phase = PhaseTracker::new();
    match run(conn, doc, descriptor, config, &mut phase) {
        Ok(report) => {
            phase.advance(ImportPhase::Committed);
            Ok(report)
        }
        Err(e) => {
            phase.abort(&e);
            Err(e)
        }
    }
}

fn run<D: ScheduleDocument + ?Sized>(
    conn: &mut SqliteConnection,
    doc: &D,
    descriptor: &TimetableDescriptor,
    config: &ImportConfig,
    phase: &mut PhaseTracker,
) -> ImportResult<ImportReport> {
    // Every run gets a fresh timetable row before any reference work starts.
    let timetable = create_timetable(conn, descriptor)?;

    phase.advance(ImportPhase::ReconcilingReferences);
    let refs = reconcile_references(conn, doc, timetable, config)?;

    phase.advance(ImportPhase::AssemblingLessons);
    let assembly = assemble_lessons(doc, &refs.maps);
    if !assembly.unresolved.is_empty() {
        warn!(
            entries = assembly.unresolved.len(),
            "schedule entries dropped for unresolved references"
        );
    }

    phase.advance(ImportPhase::PersistingLessons);
    let persisted = persist_lessons(conn, timetable, &assembly.drafts, config.batch_size)?;

    let summary = ImportSummary::new(
        timetable,
        &refs.counts,
        &persisted,
        assembly.sparse,
        assembly.unresolved.len(),
    );
    Ok(ImportReport {
        summary,
        maps: refs.maps,
        lessons: persisted.lessons,
        unresolved: assembly.unresolved,
    })
}

/// Insert the run's `timetable` row.
fn create_timetable(
    conn: &mut SqliteConnection,
    descriptor: &TimetableDescriptor,
) -> ImportResult<TimetableId> {
    let ids: Vec<i32> = insert_into(timetable::table)
        .values(&NewTimetable {
            name: &descriptor.name,
            valid_from: descriptor.valid_from,
        })
        .returning(timetable::id)
        .get_results(conn)?;
    check_returned("timetable", 1, ids.len())?;
    let id = TimetableId(ids[0]);
    info!(
        timetable = %id,
        name = %descriptor.name,
        valid_from = %descriptor.valid_from,
        "timetable created"
    );
    Ok(id)
}
