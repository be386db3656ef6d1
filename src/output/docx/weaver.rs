//! Hyperlink construction
//!
//! WordprocessingML has no inline hyperlink target: a `w:hyperlink` carries an
//! `r:id` that must resolve to an External relationship of the same part.
//! [`weave_hyperlink`] creates both halves together so they cannot drift.

use crate::output::docx::markup::XmlElement;
use crate::output::docx::part::DocumentPart;
use crate::output::docx::run::{RunBuilder, RunStyle};

/// Registers `url` on the part and returns a styled `w:hyperlink` showing `text`
///
/// Each call allocates a new relationship, even for a URL already linked.
pub fn weave_hyperlink(part: &mut DocumentPart, text: &str, url: &str) -> XmlElement {
    let id = part.relationships_mut().add_hyperlink(url);

    let run = RunBuilder::new(text).style(RunStyle::HYPERLINK).build();

    XmlElement::new("w:hyperlink").attr("r:id", id).child(run)
}
