//! Import school timetable exports into a relational store.
//!
//! An export describes periods, days, subjects, teachers, classrooms, classes
//! and schedule entries, each carrying the exporting tool's own ids. An import
//! creates a new timetable and:
//!
//! 1. reconciles every reference entity against what is already stored, by
//!    natural key, reusing existing rows and inserting only missing ones;
//! 2. turns schedule entries into lessons whose identity is a composite key
//!    of subject, day, week, period and the cohort/teacher/classroom sets;
//! 3. persists lessons in batches without duplicating any lesson the
//!    timetable already has.
//!
//! The whole run is one transaction.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use timetable_sync::{
//!     ImportOptions, TimetableDescriptor, XmlDocument, db, import_timetable,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! db::migrate::run_sqlite("timetable.db")?;
//! let mut conn = db::connection::connect_sqlite("timetable.db")?;
//! let doc = XmlDocument::from_path("export.xml")?;
//! let descriptor = TimetableDescriptor::new(
//!     "Autumn term",
//!     NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
//! );
//! let summary = import_timetable(&mut conn, &doc, &descriptor, &ImportOptions::default())?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod ids;
pub mod import;
pub mod lesson;
pub mod models;
pub mod reconcile;
#[allow(missing_docs)]
pub mod schema;

pub use config::{ImportConfig, load_config_path, load_config_str};
pub use document::{DocumentBuilder, MemoryDocument, ScheduleDocument, Tag, XmlDocument};
pub use error::{AttributeProblem, ImportError, ImportResult};
pub use import::{
    ImportOptions, ImportPhase, ImportReport, ImportSummary, TimetableDescriptor,
    import_in_transaction, import_timetable, import_timetable_report,
};
pub use lesson::LessonKey;
pub use reconcile::{ReferenceMaps, reconcile_references};
