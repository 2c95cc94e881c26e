//! Pipeline stages run by `main`.
//!
//! Stages run in order and the run stops at the first failure. Per-store and
//! per-area scrape failures are recorded in the collected rows and never fail
//! the collection stage.

use anyhow::Context;
use chrono::Local;

use waitwatch_core::{AppConfig, Settings, StoreTarget};
use waitwatch_scraper::{BarberCollector, HttpClient, WeatherCollector};
use waitwatch_sheets::{Destination, PersistOutcome, RecordSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Collect,
    Process,
    Report,
}

impl Stage {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Collect => "collection",
            Self::Process => "preprocessing",
            Self::Report => "report",
        }
    }
}

/// Everything a stage needs, loaded once per run.
#[derive(Debug)]
pub(crate) struct RunContext {
    pub(crate) config: AppConfig,
    pub(crate) settings: Settings,
    pub(crate) stores: Vec<StoreTarget>,
}

impl RunContext {
    /// Loads the store list and scraping settings named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or invalid.
    pub(crate) fn load(config: AppConfig) -> anyhow::Result<Self> {
        let stores_path = config.stores_path();
        let stores = waitwatch_core::load_stores(&stores_path)
            .with_context(|| format!("loading {}", stores_path.display()))?
            .stores;
        let settings_path = config.settings_path();
        let settings = waitwatch_core::load_settings(&settings_path)
            .with_context(|| format!("loading {}", settings_path.display()))?;
        Ok(Self {
            config,
            settings,
            stores,
        })
    }
}

/// Runs `stages` in order. Returns the stage that failed, if any.
pub(crate) async fn run_stages(ctx: &RunContext, stages: &[Stage]) -> Option<Stage> {
    for &stage in stages {
        println!("\n=== {} ===", stage.label());
        let result = match stage {
            Stage::Collect => run_collect(ctx).await,
            Stage::Process => run_process(ctx),
            Stage::Report => run_report(ctx),
        };
        if let Err(e) = result {
            tracing::error!(stage = stage.label(), error = %format!("{e:#}"), "stage failed");
            println!("{} stage failed: {e:#}", stage.label());
            return Some(stage);
        }
        println!("{} stage completed", stage.label());
    }
    None
}

/// Scrapes every barber target and every configured weather area, then
/// persists both batches.
///
/// # Errors
///
/// Returns an error if a client cannot be built or a batch cannot be written
/// anywhere, including the local fallback.
pub(crate) async fn run_collect(ctx: &RunContext) -> anyhow::Result<()> {
    let sink = RecordSink::from_config(&ctx.config, ctx.settings.sink.mirror_local)
        .context("building record sink")?;
    let paths = &ctx.settings.paths;

    let barber = BarberCollector::from_settings(&ctx.settings.scraping)
        .context("building barber collector")?;
    let waits = barber.collect_all(&ctx.stores).await;
    let outcome = sink
        .persist(
            &waits,
            &Destination {
                spreadsheet_id: ctx.config.barber_spreadsheet_id.clone(),
                csv_path: paths.wait_data(),
            },
        )
        .await
        .context("persisting wait counts")?;
    report_outcome("wait counts", &outcome);

    let area_codes = waitwatch_core::unique_area_codes(&ctx.stores);
    if area_codes.is_empty() {
        tracing::info!("no weather area codes configured; skipping weather collection");
        return Ok(());
    }
    let client = HttpClient::from_settings(&ctx.settings.scraping)
        .context("building weather client")?;
    let weather = WeatherCollector::new(client, ctx.settings.weather.clone())
        .with_delay(ctx.settings.scraping.delay)
        .collect_all(&area_codes)
        .await;
    let outcome = sink
        .persist(
            &weather,
            &Destination {
                spreadsheet_id: ctx.config.weather_spreadsheet_id.clone(),
                csv_path: paths.weather_data(),
            },
        )
        .await
        .context("persisting weather")?;
    report_outcome("weather", &outcome);

    Ok(())
}

fn report_outcome(what: &str, outcome: &PersistOutcome) {
    match outcome {
        PersistOutcome::Sheet { rows, mirrored } => {
            let mirror = if *mirrored { " (mirrored locally)" } else { "" };
            println!("saved {rows} {what} rows to the spreadsheet{mirror}");
        }
        PersistOutcome::LocalFallback { rows, path } => {
            println!("saved {rows} {what} rows to {}", path.display());
        }
        PersistOutcome::Skipped => println!("no {what} rows to save"),
    }
}

/// Rebuilds the processed table from the raw stores.
///
/// # Errors
///
/// Returns an error when a store cannot be read or the table cannot be
/// written. Having no raw data is not an error.
pub(crate) fn run_process(ctx: &RunContext) -> anyhow::Result<()> {
    match waitwatch_analysis::run_preprocessing(&ctx.settings.paths)? {
        Some(stats) => println!(
            "processed {} records from {} stores ({} to {})",
            stats.total_records, stats.stores, stats.first_date, stats.last_date
        ),
        None => println!("no wait data to process; run the collection stage first"),
    }
    Ok(())
}

/// Renders charts and the summary from the processed table.
///
/// # Errors
///
/// Returns an error when the processed table is unreadable or the summary
/// cannot be written. A missing table is reported and skipped.
pub(crate) fn run_report(ctx: &RunContext) -> anyhow::Result<()> {
    let paths = &ctx.settings.paths;
    let merged_data = paths.merged_data();
    if !merged_data.exists() {
        tracing::warn!(path = %merged_data.display(), "no processed data");
        println!("no processed data; run the preprocessing stage first");
        return Ok(());
    }

    let generated_at = Local::now().naive_local();
    let report = waitwatch_analysis::run_report(&merged_data, &paths.output_dir, generated_at)?;

    println!(
        "rendered {} of {} charts",
        report.rendered_charts(),
        report.charts.len()
    );
    for (name, outcome) in &report.charts {
        if !outcome.is_rendered() {
            println!("  {name}: {outcome:?}");
        }
    }
    if let Some(path) = &report.summary_path {
        println!("summary written to {}", path.display());
    }
    Ok(())
}
