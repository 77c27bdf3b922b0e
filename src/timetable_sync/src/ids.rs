//! Identifier types.
//!
//! The export assigns its own ids to every element, but those are only
//! meaningful inside one document. They are wrapped in [`SourceId`] and never
//! stored. Database rows get one `i32` newtype per table so a `SubjectId` can't
//! be handed to a function expecting a `TeacherId`. The two worlds meet only in
//! a [`SourceMap`].

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An identifier assigned by the external export, valid for one import run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wraps a raw export id. Surrounding whitespace is not significant.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    /// The id as it appeared in the document.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

macro_rules! persisted_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub i32);

            impl $name {
                /// Raw column value.
                pub const fn get(self) -> i32 {
                    self.0
                }
            }

            impl From<i32> for $name {
                fn from(raw: i32) -> Self {
                    Self(raw)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.parse().map(Self)
                }
            }
        )+
    };
}

persisted_id!(
    /// Primary key of `timetable`.
    TimetableId,
    /// Primary key of `period`.
    PeriodId,
    /// Primary key of `day_definition`.
    DayDefinitionId,
    /// Primary key of `week_definition`.
    WeekDefinitionId,
    /// Primary key of `subject`.
    SubjectId,
    /// Primary key of `teacher`.
    TeacherId,
    /// Primary key of `building`.
    BuildingId,
    /// Primary key of `classroom`.
    ClassroomId,
    /// Primary key of `cohort`.
    CohortId,
    /// Primary key of `lesson`.
    LessonId,
);

/// Source id → persisted id for one entity class, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceMap<Id> {
    entries: IndexMap<SourceId, Id>,
}

impl<Id> Default for SourceMap<Id> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<Id: Copy> SourceMap<Id> {
    /// Records `source → id`. A later insert for the same source id wins.
    pub fn insert(&mut self, source: SourceId, id: Id) {
        self.entries.insert(source, id);
    }

    /// Resolves a raw source id as it appears in a referencing attribute.
    pub fn resolve(&self, raw: &str) -> Option<Id> {
        self.entries.get(raw.trim()).copied()
    }

    /// Resolves a typed source id.
    pub fn get(&self, source: &SourceId) -> Option<Id> {
        self.entries.get(source).copied()
    }

    /// Number of source ids mapped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(source, id)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, Id)> + '_ {
        self.entries.iter().map(|(k, v)| (k, *v))
    }
}

impl<Id: Copy> FromIterator<(SourceId, Id)> for SourceMap<Id> {
    fn from_iter<T: IntoIterator<Item = (SourceId, Id)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// IndexMap<SourceId, _> lookups by &str need this.
impl std::borrow::Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_trimmed_and_resolve_by_str() {
        let mut map = SourceMap::default();
        map.insert(SourceId::new(" T7 "), TeacherId(3));
        assert_eq!(map.resolve("T7"), Some(TeacherId(3)));
        assert_eq!(map.resolve(" T7"), Some(TeacherId(3)));
        assert_eq!(map.resolve("T8"), None);
    }

    #[test]
    fn persisted_ids_display_as_plain_integers() {
        assert_eq!(LessonId(42).to_string(), "42");
        assert_eq!("17".parse::<CohortId>().unwrap(), CohortId(17));
    }
}
