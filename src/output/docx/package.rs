//! OPC packaging of a [`Document`] into a `.docx` zip archive

use crate::output::docx::composer::Document;
use crate::output::docx::markup::{render_part, XmlElement};
use crate::output::docx::part::WORDML_NS;
use crate::output::docx::relationships::{RelationshipTable, TargetMode};
use crate::output::OutputResult;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const OFFICE_DOCUMENT_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const CORE_PROPERTIES_TYPE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// Overridden part names and their content types
const PARTS: [(&str, &str); 3] = [
    (
        "/word/document.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
    ),
    (
        "/word/styles.xml",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
    ),
    (
        "/docProps/core.xml",
        "application/vnd.openxmlformats-package.core-properties+xml",
    ),
];

/// Writes every part of `document` into a zip archive
pub fn write_package<W: Write + Seek>(document: &Document, writer: W) -> OutputResult<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);

    let entries: [(&str, XmlElement); 6] = [
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", package_relationships().to_xml()),
        ("word/document.xml", document.part().to_xml()),
        (
            "word/_rels/document.xml.rels",
            document.part().relationships().to_xml(),
        ),
        ("word/styles.xml", styles()),
        ("docProps/core.xml", core_properties(document)),
    ];

    for (name, root) in &entries {
        zip.start_file(*name, options)?;
        zip.write_all(&render_part(root)?)?;
    }

    let mut inner = zip.finish()?;
    inner.flush()?;

    Ok(())
}

fn content_types() -> XmlElement {
    let mut types = XmlElement::new("Types")
        .attr("xmlns", CONTENT_TYPES_NS)
        .child(
            XmlElement::new("Default")
                .attr("Extension", "rels")
                .attr("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        )
        .child(
            XmlElement::new("Default")
                .attr("Extension", "xml")
                .attr("ContentType", "application/xml"),
        );

    for (part_name, content_type) in PARTS {
        types.push(
            XmlElement::new("Override")
                .attr("PartName", part_name)
                .attr("ContentType", content_type),
        );
    }

    types
}

fn package_relationships() -> RelationshipTable {
    let mut table = RelationshipTable::new();
    table.add(OFFICE_DOCUMENT_TYPE, "word/document.xml", TargetMode::Internal);
    table.add(CORE_PROPERTIES_TYPE, "docProps/core.xml", TargetMode::Internal);
    table
}

/// `Normal` and `Heading1` paragraph styles
fn styles() -> XmlElement {
    let normal = XmlElement::new("w:style")
        .attr("w:type", "paragraph")
        .attr("w:default", "1")
        .attr("w:styleId", "Normal")
        .child(XmlElement::new("w:name").attr("w:val", "Normal"))
        .child(XmlElement::new("w:qFormat"))
        .child(
            XmlElement::new("w:rPr")
                .child(
                    XmlElement::new("w:rFonts")
                        .attr("w:ascii", "Calibri")
                        .attr("w:hAnsi", "Calibri"),
                )
                .child(XmlElement::new("w:sz").attr("w:val", "22")),
        );

    let heading = XmlElement::new("w:style")
        .attr("w:type", "paragraph")
        .attr("w:styleId", "Heading1")
        .child(XmlElement::new("w:name").attr("w:val", "heading 1"))
        .child(XmlElement::new("w:basedOn").attr("w:val", "Normal"))
        .child(XmlElement::new("w:next").attr("w:val", "Normal"))
        .child(XmlElement::new("w:qFormat"))
        .child(
            XmlElement::new("w:pPr")
                .child(XmlElement::new("w:keepNext"))
                .child(
                    XmlElement::new("w:spacing")
                        .attr("w:before", "480")
                        .attr("w:after", "120"),
                )
                .child(XmlElement::new("w:outlineLvl").attr("w:val", "0")),
        )
        .child(
            XmlElement::new("w:rPr")
                .child(XmlElement::new("w:b"))
                .child(XmlElement::new("w:color").attr("w:val", "2F5496"))
                .child(XmlElement::new("w:sz").attr("w:val", "32")),
        );

    XmlElement::new("w:styles")
        .attr("xmlns:w", WORDML_NS)
        .child(normal)
        .child(heading)
}

fn core_properties(document: &Document) -> XmlElement {
    let created = document.created().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    XmlElement::new("cp:coreProperties")
        .attr(
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        )
        .attr("xmlns:dc", "http://purl.org/dc/elements/1.1/")
        .attr("xmlns:dcterms", "http://purl.org/dc/terms/")
        .attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
        .child(XmlElement::new("dc:title").text(document.title()))
        .child(
            XmlElement::new("dcterms:created")
                .attr("xsi:type", "dcterms:W3CDTF")
                .text(created),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::docx::composer::compose;
    use crate::record::Record;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn package(records: &[Record]) -> ZipArchive<Cursor<Vec<u8>>> {
        let document = compose(records, "Test & Co");
        let mut buffer = Cursor::new(Vec::new());
        write_package(&document, &mut buffer).unwrap();
        buffer.set_position(0);
        ZipArchive::new(buffer).unwrap()
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_package_contains_all_parts() {
        let mut archive = package(&[]);

        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "docProps/core.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
    }

    #[test]
    fn test_document_rels_match_hyperlinks() {
        let records = vec![Record {
            source: "t".to_string(),
            title: "Alpha".to_string(),
            url: "https://t.org/a?x=1&y=2".to_string(),
            date: None,
        }];
        let mut archive = package(&records);

        let document = read_entry(&mut archive, "word/document.xml");
        let rels = read_entry(&mut archive, "word/_rels/document.xml.rels");

        assert!(document.contains(r#"<w:hyperlink r:id="rId2">"#));
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains(r#"Target="https://t.org/a?x=1&amp;y=2" TargetMode="External""#));
    }

    #[test]
    fn test_core_properties_title_is_escaped() {
        let mut archive = package(&[]);
        let core = read_entry(&mut archive, "docProps/core.xml");

        assert!(core.contains("<dc:title>Test &amp; Co</dc:title>"));
        assert!(core.contains(r#"xsi:type="dcterms:W3CDTF""#));
    }
}
