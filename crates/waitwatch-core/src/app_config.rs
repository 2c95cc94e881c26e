use std::path::PathBuf;

/// Process-level configuration read from the environment.
///
/// Spreadsheet identifiers and the access token are optional: when any of
/// them is missing the persistence layer writes to local CSV files only.
#[derive(Clone)]
pub struct AppConfig {
    pub config_dir: PathBuf,
    pub log_level: String,
    pub barber_spreadsheet_id: Option<String>,
    pub weather_spreadsheet_id: Option<String>,
    pub sheets_access_token: Option<String>,
    pub sheets_base_url: String,
    pub sheets_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn stores_path(&self) -> PathBuf {
        self.config_dir.join("stores.yaml")
    }

    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("scraping_config.yaml")
    }

    /// `true` when a token and at least one spreadsheet id are present.
    #[must_use]
    pub fn sheets_configured(&self) -> bool {
        self.sheets_access_token.is_some()
            && (self.barber_spreadsheet_id.is_some() || self.weather_spreadsheet_id.is_some())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("config_dir", &self.config_dir)
            .field("log_level", &self.log_level)
            .field("barber_spreadsheet_id", &self.barber_spreadsheet_id)
            .field("weather_spreadsheet_id", &self.weather_spreadsheet_id)
            .field(
                "sheets_access_token",
                &self.sheets_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("sheets_base_url", &self.sheets_base_url)
            .field("sheets_timeout_secs", &self.sheets_timeout_secs)
            .finish()
    }
}
