//! Read access to a parsed schedule export.
//!
//! The pipeline never walks the document tree itself. It asks for "all
//! elements with tag X" and reads attributes off them, so any source that can
//! answer those two questions can feed an import. [`XmlDocument`] is the
//! implementation used by the CLI; tests also build documents in memory with
//! [`DocumentBuilder`].

mod xml;

use std::{collections::HashMap, fmt};

use indexmap::IndexMap;

use crate::error::{AttributeProblem, ImportError};

pub use xml::{DocumentError, XmlDocument};

/// Element tags the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Time period of the school day (`<period>`).
    Period,
    /// Day definition (`<day>`).
    Day,
    /// Subject (`<subject>`).
    Subject,
    /// Teacher (`<teacher>`).
    Teacher,
    /// Classroom (`<classroom>`).
    Classroom,
    /// Class / cohort (`<class>`).
    Class,
    /// Schedule entry (`<card>`).
    Card,
}

impl Tag {
    /// All tags, in the order they are usually laid out in an export.
    pub const ALL: [Tag; 7] = [
        Tag::Period,
        Tag::Day,
        Tag::Subject,
        Tag::Teacher,
        Tag::Classroom,
        Tag::Class,
        Tag::Card,
    ];

    /// The element name in the document.
    pub const fn as_str(self) -> &'static str {
        match self {
            Tag::Period => "period",
            Tag::Day => "day",
            Tag::Subject => "subject",
            Tag::Teacher => "teacher",
            Tag::Classroom => "classroom",
            Tag::Class => "class",
            Tag::Card => "card",
        }
    }

    /// Looks a tag up by element name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element: its tag, position among elements of the same tag, and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: Tag,
    index: usize,
    attributes: IndexMap<String, String>,
}

impl Element {
    /// Builds an element. `index` is its position among elements sharing `tag`.
    pub fn new(tag: Tag, index: usize, attributes: IndexMap<String, String>) -> Self {
        Self {
            tag,
            index,
            attributes,
        }
    }

    /// Element tag.
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Zero-based position among elements with the same tag.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Raw attribute value, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value trimmed, with empty values treated as absent.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Attribute that must be present and non-empty.
    pub fn required(&self, name: &'static str) -> Result<&str, ImportError> {
        self.optional(name)
            .ok_or_else(|| self.malformed(AttributeProblem::Missing(name)))
    }

    /// Required attribute parsed with `parse`; a parse failure is reported as
    /// an invalid value for `name`.
    pub fn required_with<T, E: fmt::Display>(
        &self,
        name: &'static str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<T, ImportError> {
        let raw = self.required(name)?;
        parse(raw).map_err(|e| {
            self.malformed(AttributeProblem::Invalid {
                attribute: name,
                value: raw.to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// Error pointing at this element.
    pub fn malformed(&self, problem: AttributeProblem) -> ImportError {
        ImportError::MalformedDocument {
            tag: self.tag,
            index: self.index,
            problem,
        }
    }
}

/// A parsed schedule export the pipeline can query by tag.
///
/// `Sync` because independent reference classes are extracted in parallel.
pub trait ScheduleDocument: Sync {
    /// Every element with `tag`, in document order.
    fn elements(&self, tag: Tag) -> &[Element];
}

/// In-memory document assembled element by element.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    by_tag: HashMap<Tag, Vec<Element>>,
}

impl DocumentBuilder {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element with the given attributes.
    pub fn push<'a>(
        &mut self,
        tag: Tag,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> &mut Self {
        let list = self.by_tag.entry(tag).or_default();
        let attributes = attributes
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        list.push(Element::new(tag, list.len(), attributes));
        self
    }

    /// Chaining form of [`DocumentBuilder::push`].
    pub fn with<'a>(
        mut self,
        tag: Tag,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.push(tag, attributes);
        self
    }

    /// Freezes the builder into a queryable document.
    pub fn build(self) -> MemoryDocument {
        MemoryDocument {
            by_tag: self.by_tag,
        }
    }
}

/// Document held entirely in memory, grouped by tag.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    by_tag: HashMap<Tag, Vec<Element>>,
}

impl MemoryDocument {
    /// Total element count across all tags.
    pub fn len(&self) -> usize {
        self.by_tag.values().map(Vec::len).sum()
    }

    /// True if the document holds no recognised elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScheduleDocument for MemoryDocument {
    fn elements(&self, tag: Tag) -> &[Element] {
        self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_indexes_elements_per_tag() {
        let doc = DocumentBuilder::new()
            .with(Tag::Subject, [("id", "S1"), ("name", "Maths"), ("short", "MA")])
            .with(Tag::Teacher, [("id", "T1")])
            .with(Tag::Subject, [("id", "S2"), ("name", "Art"), ("short", "AR")])
            .build();

        let subjects = doc.elements(Tag::Subject);
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[1].index(), 1);
        assert_eq!(subjects[1].attribute("name"), Some("Art"));
        assert_eq!(doc.elements(Tag::Teacher)[0].index(), 0);
        assert!(doc.elements(Tag::Card).is_empty());
    }

    #[test]
    fn blank_required_attribute_is_missing() {
        let doc = DocumentBuilder::new()
            .with(Tag::Subject, [("id", "S1"), ("name", "  ")])
            .build();
        let err = doc.elements(Tag::Subject)[0].required("name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed document: <subject> element #0: missing attribute `name`"
        );
    }

    #[test]
    fn invalid_value_names_attribute_and_value() {
        let doc = DocumentBuilder::new()
            .with(Tag::Period, [("period", "first")])
            .build();
        let err = doc.elements(Tag::Period)[0]
            .required_with("period", str::parse::<i32>)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("<period> element #0"), "{msg}");
        assert!(msg.contains("invalid value \"first\" for `period`"), "{msg}");
    }

    #[test]
    fn tag_names_round_trip() {
        for tag in Tag::ALL {
            assert_eq!(Tag::from_name(tag.as_str()), Some(tag));
        }
        assert_eq!(Tag::from_name("lesson"), None);
    }
}
