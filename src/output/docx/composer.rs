//! Report composition: heading, then a linked title and its raw URL per record

use crate::output::docx::markup::XmlElement;
use crate::output::docx::package::write_package;
use crate::output::docx::part::DocumentPart;
use crate::output::docx::run::RunBuilder;
use crate::output::docx::weaver::weave_hyperlink;
use crate::output::{write_atomically, OutputResult};
use crate::record::Record;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// An in-memory DOCX report ready to be saved
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    part: DocumentPart,
    created: DateTime<Utc>,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn part(&self) -> &DocumentPart {
        &self.part
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Writes the package to `path`, replacing any existing file atomically
    pub fn save(&self, path: &Path) -> OutputResult<()> {
        write_atomically(path, |staging| {
            let file = File::create(staging)?;
            write_package(self, BufWriter::new(file))
        })?;

        tracing::debug!(
            "Wrote report with {} paragraphs to {}",
            self.part.paragraphs().len(),
            path.display()
        );
        Ok(())
    }
}

/// Builds the report for one source
///
/// The first paragraph is a `Heading1` with `source_title`. Each record then
/// contributes two paragraphs: its title hyperlinked to its URL, and the URL
/// as plain text. An empty record list yields a heading-only document.
pub fn compose(records: &[Record], source_title: &str) -> Document {
    let mut part = DocumentPart::new();
    part.push_paragraph(heading(source_title));

    for record in records {
        let link = weave_hyperlink(&mut part, &record.title, &record.url);
        part.push_paragraph(XmlElement::new("w:p").child(link));
        part.push_paragraph(XmlElement::new("w:p").child(RunBuilder::new(record.url.as_str()).build()));
    }

    Document {
        title: source_title.to_string(),
        part,
        created: Utc::now(),
    }
}

fn heading(text: &str) -> XmlElement {
    XmlElement::new("w:p")
        .child(XmlElement::new("w:pPr").child(XmlElement::new("w:pStyle").attr("w:val", "Heading1")))
        .child(RunBuilder::new(text).build())
}
