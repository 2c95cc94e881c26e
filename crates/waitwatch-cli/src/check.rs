//! Pre-flight checks behind `--check-deps`.
//!
//! Config files must load and every data directory must be writable. Missing
//! spreadsheet settings only produce a warning since the sink falls back to
//! local CSV.

use std::path::Path;

use waitwatch_core::{AppConfig, PathSettings};

const WRITE_CHECK_FILE: &str = ".waitwatch-write-check";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckStatus {
    Pass(String),
    Warn(String),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Check {
    pub(crate) name: String,
    pub(crate) status: CheckStatus,
}

impl Check {
    fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

pub(crate) fn run_checks(config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    let stores_path = config.stores_path();
    checks.push(Check::new(
        "store list",
        match waitwatch_core::load_stores(&stores_path) {
            Ok(file) => {
                let barbers = file.stores.iter().filter(|s| s.is_barber()).count();
                CheckStatus::Pass(format!(
                    "{} ({} stores, {barbers} barber)",
                    stores_path.display(),
                    file.stores.len()
                ))
            }
            Err(e) => CheckStatus::Fail(e.to_string()),
        },
    ));

    let settings_path = config.settings_path();
    let paths = match waitwatch_core::load_settings(&settings_path) {
        Ok(settings) => {
            let mode = if settings.scraping.mock_mode {
                ", mock mode"
            } else {
                ""
            };
            checks.push(Check::new(
                "scraping settings",
                CheckStatus::Pass(format!("{}{mode}", settings_path.display())),
            ));
            settings.paths
        }
        Err(e) => {
            checks.push(Check::new("scraping settings", CheckStatus::Fail(e.to_string())));
            PathSettings::default()
        }
    };

    for (name, dir) in [
        ("raw data directory", &paths.raw_dir),
        ("processed data directory", &paths.processed_dir),
        ("output directory", &paths.output_dir),
    ] {
        checks.push(Check::new(name, check_writable(dir)));
    }

    checks.push(Check::new("spreadsheet sink", sink_status(config)));
    checks
}

/// Creates `dir` if needed and verifies a file can be written inside it.
fn check_writable(dir: &Path) -> CheckStatus {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return CheckStatus::Fail(format!("cannot create {}: {e}", dir.display()));
    }
    let marker = dir.join(WRITE_CHECK_FILE);
    match std::fs::write(&marker, b"") {
        Ok(()) => {
            if let Err(e) = std::fs::remove_file(&marker) {
                tracing::debug!(path = %marker.display(), error = %e, "cannot remove write-check file");
            }
            CheckStatus::Pass(dir.display().to_string())
        }
        Err(e) => CheckStatus::Fail(format!("{} is not writable: {e}", dir.display())),
    }
}

fn sink_status(config: &AppConfig) -> CheckStatus {
    if config.sheets_access_token.is_none() {
        return CheckStatus::Warn(
            "GOOGLE_SHEETS_ACCESS_TOKEN not set; records go to local CSV only".to_string(),
        );
    }
    let mut missing = Vec::new();
    if config.barber_spreadsheet_id.is_none() {
        missing.push("BARBER_SPREADSHEET_ID");
    }
    if config.weather_spreadsheet_id.is_none() {
        missing.push("WEATHER_SPREADSHEET_ID");
    }
    if missing.is_empty() {
        CheckStatus::Pass(format!("spreadsheets via {}", config.sheets_base_url))
    } else {
        CheckStatus::Warn(format!(
            "{} not set; those records go to local CSV",
            missing.join(", ")
        ))
    }
}

pub(crate) fn all_passed(checks: &[Check]) -> bool {
    !checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Fail(_)))
}

pub(crate) fn print_checks(checks: &[Check]) {
    println!("Environment checks:");
    for check in checks {
        let (mark, detail) = match &check.status {
            CheckStatus::Pass(d) => ("ok", d),
            CheckStatus::Warn(d) => ("warn", d),
            CheckStatus::Fail(d) => ("FAIL", d),
        };
        println!("  [{mark:>4}] {}: {detail}", check.name);
    }
}
