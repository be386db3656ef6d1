//! DOCX report generation
//!
//! Reports are built as WordprocessingML element trees and packaged as a zip
//! archive. Hyperlinks and their relationships are created together by
//! [`weave_hyperlink`]; styled runs only come from [`RunBuilder`].

mod composer;
pub mod markup;
mod package;
mod part;
mod relationships;
mod run;
mod weaver;

pub use composer::{compose, Document};
pub use markup::{XmlElement, XmlNode};
pub use package::write_package;
pub use part::DocumentPart;
pub use relationships::{Relationship, RelationshipTable, TargetMode};
pub use run::{RunBuilder, RunStyle};
pub use weaver::weave_hyperlink;
