//! Append-only local CSV store, used when the spreadsheet is unavailable.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::SinkError;

/// Appends `rows` to the CSV file at `path`, creating it (and its parent
/// directories) if needed.
///
/// The header row is written only when the file is absent or empty, so
/// repeated appends never duplicate it. Existing content is never reordered
/// or deduplicated. Returns the number of data rows written.
///
/// # Errors
///
/// Returns [`SinkError::Io`] if the file or directory cannot be created or
/// opened, and [`SinkError::Csv`] if a row cannot be written.
pub fn append_csv(
    path: &Path,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<usize, SinkError> {
    let io_err = |source| SinkError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let needs_header = !matches!(std::fs::metadata(path), Ok(meta) if meta.len() > 0);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(headers)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(io_err)?;

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        header = needs_header,
        "appended CSV rows"
    );
    Ok(rows.len())
}
