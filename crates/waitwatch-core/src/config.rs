use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so parsing can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values in `.env` files count as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let config_dir = PathBuf::from(or_default("WAITWATCH_CONFIG_DIR", "./config"));
    let log_level = or_default("WAITWATCH_LOG_LEVEL", "info");
    let barber_spreadsheet_id = optional("BARBER_SPREADSHEET_ID");
    let weather_spreadsheet_id = optional("WEATHER_SPREADSHEET_ID");
    let sheets_access_token = optional("GOOGLE_SHEETS_ACCESS_TOKEN");
    let sheets_base_url = or_default("GOOGLE_SHEETS_BASE_URL", DEFAULT_SHEETS_BASE_URL);
    let sheets_timeout_secs = parse_u64("WAITWATCH_SHEETS_TIMEOUT_SECS", "30")?;

    if !sheets_base_url.starts_with("http://") && !sheets_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "GOOGLE_SHEETS_BASE_URL".to_string(),
            reason: format!("'{sheets_base_url}' is not an http(s) URL"),
        });
    }

    Ok(AppConfig {
        config_dir,
        log_level,
        barber_spreadsheet_id,
        weather_spreadsheet_id,
        sheets_access_token,
        sheets_base_url,
        sheets_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
