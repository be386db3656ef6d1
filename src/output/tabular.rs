//! CSV export of a source's records

use crate::output::{write_atomically, OutputError, OutputResult};
use crate::record::Record;
use std::path::Path;

const BASE_COLUMNS: [&str; 3] = ["source", "title", "url"];

/// Writes records to `path`, replacing any existing file
///
/// The header is `source,title,url`, plus `date` when `include_date` is set.
/// An empty record list produces an empty file with no header row.
///
/// # Arguments
///
/// * `records` - Records in output order
/// * `path` - Destination file, replaced atomically; parent directories are created
/// * `include_date` - Whether the source defines a date field
pub fn write_records(records: &[Record], path: &Path, include_date: bool) -> OutputResult<()> {
    write_atomically(path, |staging| {
        let mut writer = csv::Writer::from_path(staging)?;

        if !records.is_empty() {
            let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
            if include_date {
                header.push("date");
            }
            writer.write_record(&header)?;

            for record in records {
                let mut row = vec![
                    record.source.as_str(),
                    record.title.as_str(),
                    record.url.as_str(),
                ];
                if include_date {
                    row.push(record.date.as_deref().unwrap_or(""));
                }
                writer.write_record(&row)?;
            }
        }

        writer.flush()?;
        Ok(())
    })?;

    tracing::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Reads a file produced by [`write_records`]
///
/// Columns are located by header name. An empty `date` cell, or a missing
/// `date` column, reads as `None`.
pub fn read_records(path: &Path) -> OutputResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let column = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        column(name).ok_or_else(|| OutputError::Format(format!("missing column `{}`", name)))
    };

    let source_idx = required("source")?;
    let title_idx = required("title")?;
    let url_idx = required("url")?;
    let date_idx = column("date");

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        records.push(Record {
            source: cell(source_idx),
            title: cell(title_idx),
            url: cell(url_idx),
            date: date_idx
                .and_then(|idx| row.get(idx))
                .filter(|date| !date.is_empty())
                .map(str::to_string),
        });
    }

    Ok(records)
}
