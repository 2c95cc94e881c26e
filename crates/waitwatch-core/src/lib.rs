pub mod app_config;
pub mod calendar;
pub mod config;
pub mod datefmt;
pub mod records;
pub mod settings;
pub mod stores;

pub use app_config::AppConfig;
pub use calendar::{Season, TimeCategory, WeatherCategory};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{
    Forecast, Observation, ScrapeStatus, TabularRecord, WaitRecord, WeatherRecord, WAIT_HEADERS,
    WEATHER_HEADERS,
};
pub use settings::{
    load_settings, DelayWindow, PathSettings, ScrapingSettings, Settings, SinkSettings,
    WeatherSettings,
};
pub use stores::{load_stores, unique_area_codes, Selector, SelectorKind, StoreTarget, StoresFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config validation failed: {0}")]
    Validation(String),
}
