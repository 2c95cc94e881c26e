//! End-of-run listing of generated files and the summary report.

use std::path::{Path, PathBuf};

use waitwatch_analysis::report::{charts, SUMMARY_PATH};
use waitwatch_core::PathSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileEntry {
    pub(crate) label: &'static str,
    pub(crate) path: PathBuf,
    /// Size in bytes, `None` when the file does not exist.
    pub(crate) size: Option<u64>,
}

fn entry(label: &'static str, path: PathBuf) -> FileEntry {
    let size = std::fs::metadata(&path)
        .ok()
        .filter(std::fs::Metadata::is_file)
        .map(|m| m.len());
    FileEntry { label, path, size }
}

pub(crate) fn data_files(paths: &PathSettings) -> Vec<FileEntry> {
    vec![
        entry("wait data", paths.wait_data()),
        entry("weather data", paths.weather_data()),
        entry("processed data", paths.merged_data()),
    ]
}

pub(crate) fn output_files(output_dir: &Path) -> Vec<FileEntry> {
    [
        ("hourly heatmap", charts::HEATMAP),
        ("daily trend", charts::DAILY_TREND),
        ("weather analysis", charts::WEATHER_ANALYSIS),
        ("store comparison", charts::STORE_COMPARISON),
        ("time analysis", charts::TIME_ANALYSIS),
        ("summary report", SUMMARY_PATH),
    ]
    .into_iter()
    .map(|(label, relative)| entry(label, output_dir.join(relative)))
    .collect()
}

fn print_entries(entries: &[FileEntry]) {
    for e in entries {
        match e.size {
            Some(size) => println!(
                "  [ok] {}: {} ({} bytes)",
                e.label,
                e.path.display(),
                group_thousands(size)
            ),
            None => println!("  [--] {}: {} (missing)", e.label, e.path.display()),
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub(crate) fn show_results(paths: &PathSettings) {
    println!("\n=== results ===");
    println!("\nData files:");
    print_entries(&data_files(paths));
    println!("\nCharts and reports:");
    print_entries(&output_files(&paths.output_dir));

    let summary_path = paths.output_dir.join(SUMMARY_PATH);
    match std::fs::read_to_string(&summary_path) {
        Ok(summary) => {
            let rule = "-".repeat(40);
            println!("\n{rule}\n{summary}\n{rule}");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %summary_path.display(), error = %e, "cannot read summary report");
        }
    }
}
