//! Lessons: composite identity, assembly from schedule entries, and
//! persistence with per-timetable deduplication.

pub mod assemble;
pub mod key;
pub mod persist;

pub use assemble::{Assembly, LessonDraft, ReferenceKind, UnresolvedReference, assemble_lessons};
pub use key::{LessonKey, ParseLessonKeyError};
pub use persist::{PersistOutcome, persist_lessons, persisted_keys};
