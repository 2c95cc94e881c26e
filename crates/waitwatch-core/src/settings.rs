//! Scraping and pipeline parameters from `scraping_config.yaml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scraping: ScrapingSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub sink: SinkSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapingSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request ceiling in seconds.
    #[serde(rename = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(rename = "delay_between_requests", default)]
    pub delay: DelayWindow,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_secs")]
    pub retry_backoff_base_secs: u64,
    /// Produce synthetic wait counts instead of fetching store pages.
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default)]
    pub debug: bool,
}

/// Randomized pause between successive targets, in seconds.
///
/// Accepts either a single number (fixed delay) or a `{min, max}` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "DelaySpec")]
pub struct DelayWindow {
    pub min_secs: f64,
    pub max_secs: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DelaySpec {
    Fixed(f64),
    Window { min: f64, max: f64 },
}

impl From<DelaySpec> for DelayWindow {
    fn from(spec: DelaySpec) -> Self {
        match spec {
            DelaySpec::Fixed(secs) => Self {
                min_secs: secs,
                max_secs: secs,
            },
            DelaySpec::Window { min, max } => Self {
                min_secs: min,
                max_secs: max,
            },
        }
    }
}

impl Default for DelayWindow {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_observation_base_url")]
    pub observation_base_url: String,
    /// Observation station ids per area code, nearest first.
    #[serde(default = "default_observation_stations")]
    pub observation_stations: BTreeMap<String, Vec<String>>,
    /// Number of 10-minute observation slots to try, newest first.
    #[serde(default = "default_lookback_steps")]
    pub observation_lookback_steps: u32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            observation_base_url: default_observation_base_url(),
            observation_stations: default_observation_stations(),
            observation_lookback_steps: default_lookback_steps(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl PathSettings {
    #[must_use]
    pub fn wait_data(&self) -> PathBuf {
        self.raw_dir.join("barber_data.csv")
    }

    #[must_use]
    pub fn weather_data(&self) -> PathBuf {
        self.raw_dir.join("weather_data.csv")
    }

    #[must_use]
    pub fn merged_data(&self) -> PathBuf {
        self.processed_dir.join("merged_data.csv")
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinkSettings {
    /// Also append to the local CSV after a successful spreadsheet write.
    #[serde(default)]
    pub mirror_local: bool,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_secs() -> u64 {
    1
}

fn default_forecast_base_url() -> String {
    "https://www.jma.go.jp/bosai/forecast/data/forecast/".to_string()
}

fn default_observation_base_url() -> String {
    "https://www.jma.go.jp/bosai/amedas/data/".to_string()
}

fn default_observation_stations() -> BTreeMap<String, Vec<String>> {
    // Nagoya, Toyota, Obu.
    BTreeMap::from([(
        "230000".to_string(),
        vec!["51106".to_string(), "51116".to_string(), "51216".to_string()],
    )])
}

fn default_lookback_steps() -> u32 {
    7
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("visualizations")
}

/// Load and validate scraping settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_settings(&content, path)
}

fn parse_settings(content: &str, path: &Path) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    let scraping = &settings.scraping;

    if scraping.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "scraping.timeout must be at least 1 second".to_string(),
        ));
    }

    let delay = scraping.delay;
    if !delay.min_secs.is_finite()
        || !delay.max_secs.is_finite()
        || delay.min_secs < 0.0
        || delay.min_secs > delay.max_secs
    {
        return Err(ConfigError::Validation(format!(
            "scraping.delay_between_requests must satisfy 0 <= min <= max (got {} .. {})",
            delay.min_secs, delay.max_secs
        )));
    }

    for base in [
        &settings.weather.forecast_base_url,
        &settings.weather.observation_base_url,
    ] {
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "weather base url '{base}' must be http(s)"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Settings, ConfigError> {
        parse_settings(content, Path::new("scraping_config.yaml"))
    }

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse("scraping: {}\n").unwrap();
        assert_eq!(settings.scraping.timeout_secs, 30);
        assert_eq!(settings.scraping.max_retries, 2);
        assert_eq!(settings.scraping.delay, DelayWindow::default());
        assert!(!settings.scraping.mock_mode);
        assert!(!settings.sink.mirror_local);
        assert_eq!(settings.weather.observation_lookback_steps, 7);
        assert_eq!(
            settings.weather.observation_stations["230000"],
            vec!["51106", "51116", "51216"]
        );
        assert_eq!(
            settings.paths.merged_data(),
            PathBuf::from("data/processed/merged_data.csv")
        );
    }

    #[test]
    fn fixed_delay_is_accepted() {
        let settings = parse("scraping:\n  delay_between_requests: 2\n").unwrap();
        assert_eq!(
            settings.scraping.delay,
            DelayWindow {
                min_secs: 2.0,
                max_secs: 2.0
            }
        );
    }

    #[test]
    fn delay_window_is_accepted() {
        let settings =
            parse("scraping:\n  delay_between_requests:\n    min: 0.5\n    max: 1.5\n").unwrap();
        assert_eq!(settings.scraping.delay.min_secs, 0.5);
        assert_eq!(settings.scraping.delay.max_secs, 1.5);
    }

    #[test]
    fn inverted_delay_window_is_rejected() {
        let err = parse("scraping:\n  delay_between_requests:\n    min: 3\n    max: 1\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("delay")));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse("scraping:\n  timeout: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("timeout")));
    }

    #[test]
    fn missing_scraping_section_is_parse_error() {
        let err = parse("paths:\n  raw_dir: /tmp/raw\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err:?}");
    }

    #[test]
    fn custom_paths_and_stations_override_defaults() {
        let settings = parse(
            r#"
scraping:
  user_agent: "waitwatch-test/1.0"
  mock_mode: true
weather:
  observation_stations:
    "130000": ["44132"]
paths:
  raw_dir: /srv/raw
sink:
  mirror_local: true
"#,
        )
        .unwrap();
        assert_eq!(settings.scraping.user_agent, "waitwatch-test/1.0");
        assert!(settings.scraping.mock_mode);
        assert!(settings.sink.mirror_local);
        assert_eq!(settings.paths.wait_data(), PathBuf::from("/srv/raw/barber_data.csv"));
        assert!(!settings.weather.observation_stations.contains_key("230000"));
        assert_eq!(settings.weather.observation_stations["130000"], vec!["44132"]);
    }
}
