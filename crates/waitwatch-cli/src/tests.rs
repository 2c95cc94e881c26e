use super::*;

use check::CheckStatus;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["waitwatch"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("expected valid cli args")
}

#[test]
fn no_flags_runs_every_stage() {
    let cli = parse(&[]);
    assert_eq!(
        cli.stages(),
        vec![Stage::Collect, Stage::Process, Stage::Report]
    );
    assert!(!cli.check_deps);
    assert!(!cli.no_results);
}

#[test]
fn collect_only_runs_collection() {
    assert_eq!(parse(&["--collect-only"]).stages(), vec![Stage::Collect]);
}

#[test]
fn process_only_runs_preprocessing() {
    assert_eq!(parse(&["--process-only"]).stages(), vec![Stage::Process]);
}

#[test]
fn visualize_only_runs_report() {
    assert_eq!(parse(&["--visualize-only"]).stages(), vec![Stage::Report]);
}

#[test]
fn only_flags_combine_in_pipeline_order() {
    let cli = parse(&["--visualize-only", "--collect-only"]);
    assert_eq!(cli.stages(), vec![Stage::Collect, Stage::Report]);
}

#[test]
fn parses_check_deps_and_no_results() {
    let cli = parse(&["--check-deps", "--no-results"]);
    assert!(cli.check_deps);
    assert!(cli.no_results);
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["waitwatch", "--verbose-mode"]).is_err());
}

fn config_in(dir: &std::path::Path) -> waitwatch_core::AppConfig {
    waitwatch_core::AppConfig {
        config_dir: dir.to_path_buf(),
        log_level: "info".to_string(),
        barber_spreadsheet_id: None,
        weather_spreadsheet_id: None,
        sheets_access_token: None,
        sheets_base_url: "https://sheets.googleapis.com/".to_string(),
        sheets_timeout_secs: 30,
    }
}

#[test]
fn checks_fail_without_config_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let checks = check::run_checks(&config_in(dir.path()));

    assert!(!check::all_passed(&checks));
    let stores = checks
        .iter()
        .find(|c| c.name == "store list")
        .expect("store list check");
    assert!(matches!(stores.status, CheckStatus::Fail(_)));
}

#[test]
fn checks_pass_with_valid_config_and_warn_about_sheets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("data");
    std::fs::write(
        dir.path().join("stores.yaml"),
        r#"
stores:
  - id: store_001
    name: Barber Kaze
    area: Nagoya
    url: https://example.com/shop/1
    selector:
      kind: class
      value: waiting-view__number
    weather_area_code: "230000"
    type: barber
"#,
    )
    .expect("write stores");
    std::fs::write(
        dir.path().join("scraping_config.yaml"),
        format!(
            "scraping:\n  mock_mode: true\npaths:\n  raw_dir: {raw}\n  processed_dir: {processed}\n  output_dir: {out}\n",
            raw = data.join("raw").display(),
            processed = data.join("processed").display(),
            out = dir.path().join("visualizations").display(),
        ),
    )
    .expect("write settings");

    let checks = check::run_checks(&config_in(dir.path()));

    assert!(check::all_passed(&checks), "{checks:?}");
    assert!(data.join("raw").is_dir());
    let sink = checks
        .iter()
        .find(|c| c.name == "spreadsheet sink")
        .expect("sink check");
    assert!(matches!(sink.status, CheckStatus::Warn(_)));
}
