//! Lifecycle of one import run.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

/// Where an import run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    /// Nothing touched yet.
    Created,
    /// Timetable row and reference entities.
    ReconcilingReferences,
    /// Schedule entries → lesson drafts.
    AssemblingLessons,
    /// Lesson rows and their links.
    PersistingLessons,
    /// Work is durable (or handed to the caller's transaction).
    Committed,
    /// The run failed or was rolled back; nothing it wrote survives.
    Aborted,
}

impl ImportPhase {
    /// Whether `self → next` is a legal step.
    pub const fn can_advance_to(self, next: ImportPhase) -> bool {
        use ImportPhase::*;
        matches!(
            (self, next),
            (Created, ReconcilingReferences)
                | (ReconcilingReferences, AssemblingLessons)
                | (AssemblingLessons, PersistingLessons)
                | (PersistingLessons, Committed)
                | (ReconcilingReferences | AssemblingLessons | PersistingLessons, Aborted)
        )
    }

    /// `Committed` or `Aborted`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ImportPhase::Committed | ImportPhase::Aborted)
    }

    /// Lowercase label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            ImportPhase::Created => "created",
            ImportPhase::ReconcilingReferences => "reconciling_references",
            ImportPhase::AssemblingLessons => "assembling_lessons",
            ImportPhase::PersistingLessons => "persisting_lessons",
            ImportPhase::Committed => "committed",
            ImportPhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current phase and refuses illegal transitions.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: ImportPhase,
    history: Vec<ImportPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    /// Starts in [`ImportPhase::Created`].
    pub fn new() -> Self {
        Self {
            current: ImportPhase::Created,
            history: vec![ImportPhase::Created],
        }
    }

    /// Current phase.
    pub fn current(&self) -> ImportPhase {
        self.current
    }

    /// Every phase entered so far, oldest first.
    pub fn history(&self) -> &[ImportPhase] {
        &self.history
    }

    /// Moves to `next`. Returns `false` (and stays put) on an illegal step.
    pub fn advance(&mut self, next: ImportPhase) -> bool {
        let legal = self.current.can_advance_to(next);
        debug_assert!(legal, "illegal import phase transition {} -> {next}", self.current);
        if !legal {
            error!(from = %self.current, to = %next, "illegal import phase transition ignored");
            return false;
        }
        info!(from = %self.current, to = %next, "import phase");
        self.current = next;
        self.history.push(next);
        true
    }

    /// Moves to [`ImportPhase::Aborted`] if the current phase allows it.
    pub fn abort(&mut self, reason: &dyn fmt::Display) -> bool {
        if !self.current.can_advance_to(ImportPhase::Aborted) {
            return false;
        }
        info!(from = %self.current, %reason, "import aborted");
        self.current = ImportPhase::Aborted;
        self.history.push(ImportPhase::Aborted);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ImportPhase::*;

    #[test]
    fn happy_path() {
        let mut t = PhaseTracker::new();
        for p in [ReconcilingReferences, AssemblingLessons, PersistingLessons, Committed] {
            assert!(t.advance(p));
        }
        assert_eq!(
            t.history(),
            &[Created, ReconcilingReferences, AssemblingLessons, PersistingLessons, Committed]
        );
        assert!(t.current().is_terminal());
    }

    #[test]
    fn abort_only_from_working_phases() {
        assert!(!Created.can_advance_to(Aborted));
        assert!(ReconcilingReferences.can_advance_to(Aborted));
        assert!(AssemblingLessons.can_advance_to(Aborted));
        assert!(PersistingLessons.can_advance_to(Aborted));
        assert!(!Committed.can_advance_to(Aborted));

        let mut t = PhaseTracker::new();
        assert!(!t.abort(&"too early"));
        t.advance(ReconcilingReferences);
        assert!(t.abort(&"boom"));
        assert_eq!(t.current(), Aborted);
        assert!(!t.abort(&"again"));
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Created.can_advance_to(PersistingLessons));
        assert!(!AssemblingLessons.can_advance_to(ReconcilingReferences));
        assert!(!Aborted.can_advance_to(Committed));
    }
}
