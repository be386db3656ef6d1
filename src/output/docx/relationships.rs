//! Relationship table of the main document part
//!
//! Every `r:id` referenced from `word/document.xml` is allocated here. Ids are
//! `rId<n>` with `n` strictly increasing and never reused, so two hyperlinks
//! can never share a relationship even when they point at the same URL.

use crate::output::docx::markup::XmlElement;

pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub const HYPERLINK_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub const STYLES_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub kind: &'static str,
    pub target: String,
    pub mode: TargetMode,
}

#[derive(Debug, Clone)]
pub struct RelationshipTable {
    entries: Vec<Relationship>,
    next_id: u32,
}

impl Default for RelationshipTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a relationship and returns its freshly allocated id
    pub fn add(&mut self, kind: &'static str, target: impl Into<String>, mode: TargetMode) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;

        self.entries.push(Relationship {
            id: id.clone(),
            kind,
            target: target.into(),
            mode,
        });

        id
    }

    /// Registers an external hyperlink target
    pub fn add_hyperlink(&mut self, url: &str) -> String {
        self.add(HYPERLINK_TYPE, url, TargetMode::External)
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.id == id)
    }

    pub fn entries(&self) -> &[Relationship] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hyperlink relationships, in allocation order
    pub fn hyperlinks(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter().filter(|rel| rel.kind == HYPERLINK_TYPE)
    }

    /// Root element of the `.rels` part
    pub fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::new("Relationships").attr("xmlns", RELATIONSHIPS_NS);

        for rel in &self.entries {
            let mut element = XmlElement::new("Relationship")
                .attr("Id", rel.id.as_str())
                .attr("Type", rel.kind)
                .attr("Target", rel.target.as_str());
            if rel.mode == TargetMode::External {
                element = element.attr("TargetMode", "External");
            }
            root.push(element);
        }

        root
    }
}
