use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a store page's wait-count element is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// One or more whitespace-separated class names.
    Class,
    Css,
    /// Simple location paths (`/`, `//`, names, `[n]`, `[@attr='v']`,
    /// `[contains(@attr,'v')]`).
    Xpath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: String,
}

/// A page to scrape, as configured in `stores.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTarget {
    pub id: String,
    pub name: String,
    pub area: String,
    pub url: String,
    pub selector: Selector,
    #[serde(default)]
    pub weather_area_code: Option<String>,
    /// Store type; only `barber` targets are scraped for wait counts.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "barber".to_string()
}

impl StoreTarget {
    #[must_use]
    pub fn is_barber(&self) -> bool {
        self.kind == "barber"
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreTarget>,
}

/// Load and validate the store list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if store.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has an empty id",
                store.name
            )));
        }

        if !seen_ids.insert(store.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: '{}'",
                store.id
            )));
        }

        if !store.url.starts_with("http://") && !store.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid url '{}'; must be http(s)",
                store.id, store.url
            )));
        }

        if store.selector.value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has an empty selector",
                store.id
            )));
        }

        if store
            .weather_area_code
            .as_deref()
            .is_some_and(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(ConfigError::Validation(format!(
                "store '{}' has a non-numeric weather_area_code",
                store.id
            )));
        }
    }

    Ok(())
}

/// Distinct weather area codes across all stores, in ascending order.
#[must_use]
pub fn unique_area_codes(stores: &[StoreTarget]) -> Vec<String> {
    stores
        .iter()
        .filter_map(|s| s.weather_area_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
