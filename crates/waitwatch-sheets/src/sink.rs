//! Spreadsheet-first persistence with a local CSV fallback.

use std::path::{Path, PathBuf};

use waitwatch_core::{AppConfig, TabularRecord};

use crate::client::SheetsClient;
use crate::csv_sink::append_csv;
use crate::error::SinkError;

/// Where one record type is persisted.
#[derive(Debug, Clone)]
pub struct Destination {
    /// Target spreadsheet; `None` sends everything to the CSV file.
    pub spreadsheet_id: Option<String>,
    pub csv_path: PathBuf,
}

/// What happened to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Appended to the spreadsheet; `mirrored` when also written locally.
    Sheet { rows: usize, mirrored: bool },
    /// The spreadsheet was unavailable; rows went to the CSV file instead.
    LocalFallback { rows: usize, path: PathBuf },
    /// Nothing to write.
    Skipped,
}

/// Writes record batches to the spreadsheet when possible and to local CSV
/// otherwise. Rows are appended as-is; nothing is deduplicated here.
#[derive(Debug)]
pub struct RecordSink {
    sheets: Option<SheetsClient>,
    mirror_local: bool,
}

impl RecordSink {
    #[must_use]
    pub fn new(sheets: Option<SheetsClient>, mirror_local: bool) -> Self {
        Self {
            sheets,
            mirror_local,
        }
    }

    /// Builds a sink from process configuration. Without an access token the
    /// sink is CSV-only.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the Sheets client cannot be constructed.
    pub fn from_config(config: &AppConfig, mirror_local: bool) -> Result<Self, SinkError> {
        let sheets = match config.sheets_access_token.as_deref() {
            Some(token) => Some(SheetsClient::with_base_url(
                token,
                config.sheets_timeout_secs,
                &config.sheets_base_url,
            )?),
            None => {
                tracing::info!("no spreadsheet access token; persisting to local CSV only");
                None
            }
        };
        Ok(Self::new(sheets, mirror_local))
    }

    /// Persists `records` to `destination`.
    ///
    /// Any spreadsheet failure (including a missing id or client) is logged
    /// and the batch is appended to the destination's CSV file instead.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] only when the CSV write itself fails.
    pub async fn persist<R: TabularRecord>(
        &self,
        records: &[R],
        destination: &Destination,
    ) -> Result<PersistOutcome, SinkError> {
        if records.is_empty() {
            tracing::info!(sheet = R::SHEET_NAME, "no records to persist");
            return Ok(PersistOutcome::Skipped);
        }

        let rows: Vec<Vec<String>> = records.iter().map(TabularRecord::to_row).collect();

        match self.write_sheet::<R>(&rows, destination).await {
            Ok(()) => {
                tracing::info!(sheet = R::SHEET_NAME, rows = rows.len(), "appended to spreadsheet");
                if self.mirror_local {
                    write_local::<R>(&destination.csv_path, &rows)?;
                }
                Ok(PersistOutcome::Sheet {
                    rows: rows.len(),
                    mirrored: self.mirror_local,
                })
            }
            Err(e) => {
                tracing::warn!(
                    sheet = R::SHEET_NAME,
                    error = %e,
                    path = %destination.csv_path.display(),
                    "spreadsheet unavailable; falling back to local CSV"
                );
                write_local::<R>(&destination.csv_path, &rows)?;
                Ok(PersistOutcome::LocalFallback {
                    rows: rows.len(),
                    path: destination.csv_path.clone(),
                })
            }
        }
    }

    async fn write_sheet<R: TabularRecord>(
        &self,
        rows: &[Vec<String>],
        destination: &Destination,
    ) -> Result<(), SinkError> {
        let client = self
            .sheets
            .as_ref()
            .ok_or_else(|| SinkError::NotConfigured("no access token".to_string()))?;
        let spreadsheet_id = destination.spreadsheet_id.as_deref().ok_or_else(|| {
            SinkError::NotConfigured(format!("no spreadsheet id for {}", R::SHEET_NAME))
        })?;

        client
            .ensure_sheet(spreadsheet_id, R::SHEET_NAME, R::HEADERS)
            .await?;
        client.append_rows(spreadsheet_id, R::SHEET_NAME, rows).await
    }
}

fn write_local<R: TabularRecord>(path: &Path, rows: &[Vec<String>]) -> Result<usize, SinkError> {
    let written = append_csv(path, R::HEADERS, rows)?;
    tracing::info!(path = %path.display(), rows = written, "appended to local CSV");
    Ok(written)
}
