//! Report serialization to CSV.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use ordertally_report::{REPORT_HEADER, ReportRow};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write report to {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
}

/// Write the report (header first, one row per order) to `path`.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<(), ExportError> {
    let wrap = |source: csv::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    if rows.is_empty() {
        // serialize() derives the header from the first row; with no rows
        // the header still has to reach the sink.
        writer.write_record(REPORT_HEADER).map_err(wrap)?;
    }
    for row in rows {
        writer.serialize(row).map_err(wrap)?;
    }
    writer.flush().map_err(|source| wrap(csv::Error::from(source)))?;

    info!(rows = rows.len(), path = %path.display(), "report written");
    Ok(())
}
