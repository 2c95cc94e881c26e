//! Weather collection: today's forecast plus the latest station observation
//! for each configured area code.

mod forecast;
mod observation;

use chrono::{Local, NaiveDateTime};
use waitwatch_core::{DelayWindow, WeatherRecord, WeatherSettings};

use crate::client::HttpClient;
use crate::rate_limit::politeness_delay;

pub use forecast::simplify_forecast;

/// Collects one [`WeatherRecord`] per area. The forecast and observation
/// halves are fetched independently; either may be missing from the record.
pub struct WeatherCollector {
    client: HttpClient,
    settings: WeatherSettings,
    delay: DelayWindow,
}

impl WeatherCollector {
    /// Builds a collector with no pause between areas.
    #[must_use]
    pub fn new(client: HttpClient, settings: WeatherSettings) -> Self {
        Self {
            client,
            settings,
            delay: DelayWindow {
                min_secs: 0.0,
                max_secs: 0.0,
            },
        }
    }

    /// Pause a random interval within `delay` between successive areas.
    #[must_use]
    pub fn with_delay(mut self, delay: DelayWindow) -> Self {
        self.delay = delay;
        self
    }

    /// Fetches forecast and observation for `area_code`, stamping the record
    /// with `now`.
    pub async fn collect_area(&self, area_code: &str, now: NaiveDateTime) -> WeatherRecord {
        let forecast =
            match forecast::fetch_forecast(&self.client, &self.settings.forecast_base_url, area_code)
                .await
            {
                Ok(forecast) => Some(forecast),
                Err(e) => {
                    tracing::warn!(area_code, error = %e, "failed to fetch forecast");
                    None
                }
            };

        let observation = match self.settings.observation_stations.get(area_code) {
            Some(stations) if !stations.is_empty() => {
                let found = observation::fetch_observation(
                    &self.client,
                    &self.settings.observation_base_url,
                    stations,
                    now,
                    self.settings.observation_lookback_steps,
                )
                .await;
                if found.is_none() {
                    tracing::warn!(area_code, "no observation found in any candidate slot");
                }
                found
            }
            _ => {
                tracing::info!(area_code, "no observation stations configured for area");
                None
            }
        };

        let record = WeatherRecord {
            timestamp: now,
            area_code: area_code.to_string(),
            forecast,
            observation,
        };
        tracing::info!(
            area_code,
            status = record.data_status(),
            forecast = record.forecast.is_some(),
            observation = record.observation.is_some(),
            "collected weather"
        );
        record
    }

    /// Collects every area in order, pausing between consecutive areas.
    pub async fn collect_all(&self, area_codes: &[String]) -> Vec<WeatherRecord> {
        tracing::info!(areas = area_codes.len(), "collecting weather");
        let mut records = Vec::with_capacity(area_codes.len());
        for (i, code) in area_codes.iter().enumerate() {
            if i > 0 {
                politeness_delay(self.delay).await;
            }
            let now = Local::now().naive_local();
            records.push(self.collect_area(code, now).await);
        }
        records
    }
}
