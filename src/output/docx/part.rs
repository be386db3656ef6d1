//! The main document part (`word/document.xml`) and its relationships

use crate::output::docx::markup::XmlElement;
use crate::output::docx::relationships::{RelationshipTable, TargetMode, STYLES_TYPE};

pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const OFFICE_REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Body paragraphs plus the relationship table their `r:id`s point into
#[derive(Debug, Clone)]
pub struct DocumentPart {
    relationships: RelationshipTable,
    paragraphs: Vec<XmlElement>,
}

impl Default for DocumentPart {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentPart {
    /// Creates an empty part; the styles relationship takes the first id
    pub fn new() -> Self {
        let mut relationships = RelationshipTable::new();
        relationships.add(STYLES_TYPE, "styles.xml", TargetMode::Internal);

        Self {
            relationships,
            paragraphs: Vec::new(),
        }
    }

    pub fn relationships(&self) -> &RelationshipTable {
        &self.relationships
    }

    pub fn relationships_mut(&mut self) -> &mut RelationshipTable {
        &mut self.relationships
    }

    pub fn paragraphs(&self) -> &[XmlElement] {
        &self.paragraphs
    }

    pub fn push_paragraph(&mut self, paragraph: XmlElement) {
        self.paragraphs.push(paragraph);
    }

    /// Root `w:document` element
    pub fn to_xml(&self) -> XmlElement {
        let mut body = XmlElement::new("w:body");
        for paragraph in &self.paragraphs {
            body.push(paragraph.clone());
        }
        body.push(section_properties());

        XmlElement::new("w:document")
            .attr("xmlns:w", WORDML_NS)
            .attr("xmlns:r", OFFICE_REL_NS)
            .child(body)
    }
}

/// US Letter, one-inch margins
fn section_properties() -> XmlElement {
    XmlElement::new("w:sectPr")
        .child(
            XmlElement::new("w:pgSz")
                .attr("w:w", "12240")
                .attr("w:h", "15840"),
        )
        .child(
            XmlElement::new("w:pgMar")
                .attr("w:top", "1440")
                .attr("w:right", "1440")
                .attr("w:bottom", "1440")
                .attr("w:left", "1440")
                .attr("w:header", "720")
                .attr("w:footer", "720")
                .attr("w:gutter", "0"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_part_reserves_styles_relationship() {
        let part = DocumentPart::new();
        let rels = part.relationships().entries();

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].id, "rId1");
        assert_eq!(rels[0].kind, STYLES_TYPE);
    }

    #[test]
    fn test_to_xml_ends_body_with_section() {
        let mut part = DocumentPart::new();
        part.push_paragraph(XmlElement::new("w:p"));

        let root = part.to_xml();
        let body = root.elements().next().unwrap();
        let names: Vec<&str> = body.elements().map(|e| e.name()).collect();

        assert_eq!(names, vec!["w:p", "w:sectPr"]);
        assert_eq!(root.attribute("xmlns:r"), Some(OFFICE_REL_NS));
    }
}
