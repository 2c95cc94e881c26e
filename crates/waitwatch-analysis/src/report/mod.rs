//! Charts and the markdown summary built from the processed table.

pub mod aggregate;
pub mod charts;
pub mod summary;

#[cfg(test)]
mod fixtures;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::AnalysisError;
use crate::merged::MergedRow;
use crate::preprocess::read_processed;

pub use charts::ChartOutcome;
pub use summary::{build_summary, render_markdown, AnalysisSummary};

/// Location of the summary under the output directory.
pub const SUMMARY_PATH: &str = "reports/analysis_summary.md";

/// What one report run produced.
#[derive(Debug, Clone)]
pub struct Report {
    pub charts: Vec<(&'static str, ChartOutcome)>,
    /// `None` when the table was empty.
    pub summary_path: Option<PathBuf>,
    pub summary: Option<AnalysisSummary>,
}

impl Report {
    #[must_use]
    pub fn rendered_charts(&self) -> usize {
        self.charts.iter().filter(|(_, o)| o.is_rendered()).count()
    }
}

/// Renders all charts and writes the summary under `output_dir`.
///
/// Chart failures are reported in the returned [`Report`] and never abort the
/// run.
///
/// # Errors
///
/// Returns [`AnalysisError`] only if the summary file cannot be written.
pub fn generate_report(
    rows: &[MergedRow],
    output_dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<Report, AnalysisError> {
    let charts = charts::render_all(rows, output_dir);

    let summary = build_summary(rows);
    let summary_path = match &summary {
        Some(summary) => {
            let path = output_dir.join(SUMMARY_PATH);
            write_text(&path, &render_markdown(summary, generated_at))?;
            tracing::info!(path = %path.display(), "summary report saved");
            Some(path)
        }
        None => {
            tracing::info!("no processed rows; summary report skipped");
            None
        }
    };

    Ok(Report {
        charts,
        summary_path,
        summary,
    })
}

/// Loads `merged_data` and generates the report from it.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the processed table is missing or unreadable,
/// or the summary cannot be written.
pub fn run_report(
    merged_data: &Path,
    output_dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<Report, AnalysisError> {
    let rows = read_processed(merged_data)?;
    tracing::info!(records = rows.len(), "loaded processed data");
    generate_report(&rows, output_dir, generated_at)
}

fn write_text(path: &Path, content: &str) -> Result<(), AnalysisError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| AnalysisError::io(path, e))
}
