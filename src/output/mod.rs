//! Output artifacts for a source run
//!
//! This module handles:
//! - Writing records to a CSV export
//! - Composing the DOCX report with hyperlinked titles

pub mod docx;
mod tabular;

pub use docx::{compose, weave_hyperlink, Document, DocumentPart, RelationshipTable, RunBuilder, RunStyle};
pub use tabular::{read_records, write_records};

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while writing artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed export: {0}")]
    Format(String),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Writes `path` through a sibling staging file that is renamed into place
///
/// Readers of `path` only ever see a complete previous file or a complete new
/// one. On failure the staging file is removed and `path` is left untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> OutputResult<()>
where
    F: FnOnce(&Path) -> OutputResult<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    match write(&staging) {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = remove_artifact(&staging) {
                tracing::debug!("Failed to remove {}: {}", staging.display(), cleanup);
            }
            Err(e)
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".partial");
    path.with_file_name(name)
}

/// Removes an artifact if present
///
/// # Returns
///
/// * `Ok(true)` - The file existed and was removed
/// * `Ok(false)` - There was nothing to remove
pub fn remove_artifact(path: &Path) -> OutputResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
