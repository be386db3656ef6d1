//! Record extraction from captured pages
//!
//! This module turns DOM snapshots into normalized records:
//! - Container matching with CSS selectors
//! - Field scopes for title, link and date elements
//! - Whitespace normalization and relative link resolution

mod extractor;
mod scope;

pub use extractor::{collapse_whitespace, extract, Extraction, RecordExtractor};
pub use scope::FieldScope;

pub(crate) use scope::compile as compile_selector;
