//! XML-backed [`ScheduleDocument`].
//!
//! The export wraps each element kind in a container (`<periods>`, `<cards>`,
//! ...), but only the leaf tag matters, so every element in the tree whose name
//! is a known [`Tag`] is indexed regardless of nesting. Unknown elements and
//! text content are ignored. Charset repair is the caller's job: input must
//! already be valid UTF-8.

use std::{collections::HashMap, path::Path};

use indexmap::IndexMap;
use thiserror::Error;

use super::{Element, ScheduleDocument, Tag};

/// Errors raised while loading an XML export.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// A schedule export parsed from XML.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    by_tag: HashMap<Tag, Vec<Element>>,
}

impl XmlDocument {
    /// Parses an export from a string.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let tree = roxmltree::Document::parse(text)?;
        let mut by_tag: HashMap<Tag, Vec<Element>> = HashMap::new();

        for node in tree.descendants().filter(|n| n.is_element()) {
            let Some(tag) = Tag::from_name(node.tag_name().name()) else {
                continue;
            };
            let attributes: IndexMap<String, String> = node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect();
            let list = by_tag.entry(tag).or_default();
            list.push(Element::new(tag, list.len(), attributes));
        }

        Ok(Self { by_tag })
    }

    /// Reads and parses an export file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Number of elements indexed under `tag`.
    pub fn count(&self, tag: Tag) -> usize {
        self.elements(tag).len()
    }
}

impl ScheduleDocument for XmlDocument {
    fn elements(&self, tag: Tag) -> &[Element] {
        self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<timetable importtype="database">
  <periods>
    <period period="1" starttime="8:00" endtime="8:45"/>
    <period period="2" starttime="8:55" endtime="9:40"/>
  </periods>
  <teachers>
    <teacher id="T1" name="Ada Lovelace" short="AL" gender="F" color="#FF0000"/>
  </teachers>
  <cards>
    <card dayid="D1" subjectid="S1" period="1"/>
  </cards>
  <unrelated foo="bar"/>
</timetable>"##;

    #[test]
    fn indexes_known_tags_at_any_depth() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.count(Tag::Period), 2);
        assert_eq!(doc.count(Tag::Teacher), 1);
        assert_eq!(doc.count(Tag::Card), 1);
        assert_eq!(doc.count(Tag::Class), 0);

        let second = &doc.elements(Tag::Period)[1];
        assert_eq!(second.index(), 1);
        assert_eq!(second.attribute("starttime"), Some("8:55"));
        assert_eq!(doc.elements(Tag::Teacher)[0].attribute("color"), Some("#FF0000"));
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = XmlDocument::parse("<timetable><period></timetable>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = XmlDocument::from_path("/definitely/not/here.xml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.xml"));
    }
}
