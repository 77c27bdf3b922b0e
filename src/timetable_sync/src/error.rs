//! Fatal errors of an import run.
//!
//! Row-level problems (a schedule entry pointing at a period that does not
//! exist) are not errors: they are recorded as
//! [`UnresolvedReference`](crate::lesson::UnresolvedReference)s and the row is
//! skipped. Everything here aborts the run and rolls the transaction back.

use std::fmt;

use thiserror::Error;

use crate::document::Tag;

/// What is wrong with an element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeProblem {
    /// A required attribute is absent or blank.
    Missing(&'static str),
    /// A required attribute is present but cannot be interpreted.
    Invalid {
        /// Attribute name.
        attribute: &'static str,
        /// Raw value found in the document.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl fmt::Display for AttributeProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeProblem::Missing(name) => write!(f, "missing attribute `{name}`"),
            AttributeProblem::Invalid {
                attribute,
                value,
                reason,
            } => write!(f, "invalid value {value:?} for `{attribute}` ({reason})"),
        }
    }
}

/// The unified error type of the import pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    /// An element the pipeline must fully understand lacks a usable attribute.
    #[error("malformed document: <{tag}> element #{index}: {problem}")]
    MalformedDocument {
        /// Tag of the offending element.
        tag: Tag,
        /// Position among elements with that tag.
        index: usize,
        /// The attribute at fault.
        problem: AttributeProblem,
    },

    /// A read or write against the store failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] diesel::result::Error),

    /// An insert did not hand back one generated id per inserted row.
    #[error("store returned {returned} generated ids for {expected} inserted {entity} rows")]
    StoreInvariant {
        /// Table that was written.
        entity: &'static str,
        /// Rows sent.
        expected: usize,
        /// Ids received.
        returned: usize,
    },
}

impl ImportError {
    /// True for failures caused by the input document rather than the store.
    pub const fn is_document_error(&self) -> bool {
        matches!(self, ImportError::MalformedDocument { .. })
    }
}

/// Result alias used throughout the pipeline.
pub type ImportResult<T> = Result<T, ImportError>;
