//! Turns the raw wait and weather stores into `merged_data.csv`.
//!
//! The processed table is always rebuilt from scratch. Identical raw inputs
//! produce a byte-identical output file.

mod clean;
mod merge;

use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use waitwatch_core::PathSettings;

use crate::error::AnalysisError;
use crate::merged::MergedRow;

pub use clean::{WaitCleaning, WeatherCleaning};

/// Row counts from one preprocessing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub wait: WaitCleaning,
    pub weather: WeatherCleaning,
}

#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub rows: Vec<MergedRow>,
    pub report: CleaningReport,
}

/// Overview of a processed table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub stores: usize,
    pub mean_wait: Option<f64>,
    pub max_wait: Option<f64>,
    pub min_wait: Option<f64>,
    /// Percentage of rows with a wait count.
    pub wait_completeness: f64,
    /// Percentage of rows with weather text.
    pub weather_completeness: f64,
}

impl SummaryStats {
    pub fn log(&self) {
        tracing::info!(
            records = self.total_records,
            first_date = %self.first_date,
            last_date = %self.last_date,
            stores = self.stores,
            mean_wait = ?self.mean_wait,
            max_wait = ?self.max_wait,
            wait_completeness = format_args!("{:.1}%", self.wait_completeness),
            weather_completeness = format_args!("{:.1}%", self.weather_completeness),
            "processed data summary"
        );
    }
}

/// Reads every deserializable row of `path`. Returns `None` when the file
/// does not exist; unreadable rows are counted, not fatal.
fn read_raw<T: DeserializeOwned>(path: &Path) -> Result<Option<(Vec<T>, usize)>, AnalysisError> {
    if !path.exists() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AnalysisError::csv(path, e))?;

    let mut rows = Vec::new();
    let mut malformed = 0usize;
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(AnalysisError::csv(path, e)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping malformed row");
                malformed += 1;
            }
        }
    }
    Ok(Some((rows, malformed)))
}

/// Cleans, merges and enriches the raw stores.
///
/// Returns `Ok(None)` when the wait store is absent or has no rows. A missing
/// or empty weather store is not an error: weather fields stay null.
///
/// # Errors
///
/// Returns [`AnalysisError`] when a store exists but cannot be read.
pub fn preprocess(
    wait_path: &Path,
    weather_path: &Path,
) -> Result<Option<Preprocessed>, AnalysisError> {
    let Some((raw_waits, malformed_waits)) = read_raw::<clean::RawWaitRow>(wait_path)? else {
        tracing::info!(path = %wait_path.display(), "no wait data found");
        return Ok(None);
    };
    if raw_waits.is_empty() && malformed_waits == 0 {
        tracing::info!(path = %wait_path.display(), "wait data is empty");
        return Ok(None);
    }
    tracing::info!(records = raw_waits.len(), "loaded wait records");

    let mut report = CleaningReport::default();
    report.wait.read = malformed_waits;
    report.wait.rejected = malformed_waits;
    let waits = clean::clean_wait_rows(raw_waits, &mut report.wait);
    tracing::info!(
        kept = report.wait.kept,
        rejected = report.wait.rejected,
        out_of_range = report.wait.out_of_range,
        duplicates = report.wait.duplicates,
        "cleaned wait data"
    );

    let weather = match read_raw::<clean::RawWeatherRow>(weather_path)? {
        Some((raw_weather, malformed)) => {
            report.weather.read = malformed;
            report.weather.rejected = malformed;
            clean::clean_weather_rows(raw_weather, &mut report.weather)
        }
        None => {
            tracing::info!(path = %weather_path.display(), "no weather data found");
            std::collections::BTreeMap::new()
        }
    };
    if weather.is_empty() {
        tracing::info!("no weather data to merge; weather fields stay empty");
    } else {
        tracing::info!(days = report.weather.days, "cleaned weather data");
    }

    let rows = merge::merge(waits, &weather);
    tracing::info!(records = rows.len(), "merged data");

    Ok(Some(Preprocessed { rows, report }))
}

/// Rewrites `path` with `rows`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the directory or file cannot be written.
pub fn write_processed(rows: &[MergedRow], path: &Path) -> Result<(), AnalysisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| AnalysisError::csv(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AnalysisError::csv(path, e))?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

fn remove_stale(path: &Path) -> Result<(), AnalysisError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "removed stale processed data");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AnalysisError::io(path, e)),
    }
}

/// Loads a processed table written by [`write_processed`].
///
/// # Errors
///
/// Returns [`AnalysisError`] if the file is missing or a row does not parse.
pub fn read_processed(path: &Path) -> Result<Vec<MergedRow>, AnalysisError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| AnalysisError::csv(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<MergedRow>, _>>()
        .map_err(|e| AnalysisError::csv(path, e))
}

/// Record count, date range, store count, wait statistics and completeness.
/// `None` for an empty table.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summary_stats(rows: &[MergedRow]) -> Option<SummaryStats> {
    let first_date = rows.iter().map(|r| r.date).min()?;
    let last_date = rows.iter().map(|r| r.date).max()?;

    let stores = rows
        .iter()
        .map(|r| r.store_id.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();

    let waits: Vec<f64> = rows.iter().filter_map(|r| r.wait_count).collect();
    let mean_wait = (!waits.is_empty()).then(|| waits.iter().sum::<f64>() / waits.len() as f64);
    let max_wait = waits.iter().copied().reduce(f64::max);
    let min_wait = waits.iter().copied().reduce(f64::min);

    let total = rows.len() as f64;
    let with_weather = rows.iter().filter(|r| r.weather.is_some()).count();

    Some(SummaryStats {
        total_records: rows.len(),
        first_date,
        last_date,
        stores,
        mean_wait,
        max_wait,
        min_wait,
        wait_completeness: waits.len() as f64 / total * 100.0,
        weather_completeness: with_weather as f64 / total * 100.0,
    })
}

/// Runs the preprocessing stage against the configured data directories.
///
/// Returns `Ok(None)` when there was nothing to process. Any processed table
/// left by an earlier run is removed in that case.
///
/// # Errors
///
/// Returns [`AnalysisError`] on read, write or removal failures.
pub fn run_preprocessing(paths: &PathSettings) -> Result<Option<SummaryStats>, AnalysisError> {
    let processed = preprocess(&paths.wait_data(), &paths.weather_data())?;
    let Some(processed) = processed.filter(|p| !p.rows.is_empty()) else {
        tracing::warn!("no wait records to save");
        remove_stale(&paths.merged_data())?;
        return Ok(None);
    };

    let output = paths.merged_data();
    write_processed(&processed.rows, &output)?;
    tracing::info!(path = %output.display(), records = processed.rows.len(), "saved processed data");

    let stats = summary_stats(&processed.rows);
    if let Some(stats) = &stats {
        stats.log();
    }
    Ok(stats)
}
