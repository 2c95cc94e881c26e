//! Current conditions from AMeDAS station snapshots.
//!
//! Snapshots are published every ten minutes at
//! `{base}/map/{yyyymmddHHMM00}.json`, keyed by station id. The newest slot
//! is often not yet published, so several candidate slots are tried newest
//! first.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike};
use serde::Deserialize;
use waitwatch_core::Observation;

use crate::client::HttpClient;

const SLOT_FORMAT: &str = "%Y%m%d%H%M00";
const SLOT_MINUTES: i64 = 10;

/// One station's readings. Each measurement is `[value, quality_flag]`.
#[derive(Debug, Deserialize)]
pub(crate) struct StationReading {
    #[serde(default)]
    temp: Option<Vec<Option<f64>>>,
    #[serde(default)]
    humidity: Option<Vec<Option<f64>>>,
    #[serde(default, rename = "precipitation1h")]
    precipitation_1h: Option<Vec<Option<f64>>>,
    #[serde(default)]
    wind: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pressure: Option<Vec<Option<f64>>>,
}

fn first_value(measurement: Option<&Vec<Option<f64>>>) -> Option<f64> {
    measurement.and_then(|m| m.first().copied().flatten())
}

impl StationReading {
    fn to_observation(&self, station_id: &str, slot: &str) -> Observation {
        Observation {
            station_id: station_id.to_string(),
            observed_at: slot.to_string(),
            current_temp: first_value(self.temp.as_ref()),
            humidity: first_value(self.humidity.as_ref()),
            precipitation_1h: first_value(self.precipitation_1h.as_ref()),
            wind_speed: first_value(self.wind.as_ref()),
            pressure: first_value(self.pressure.as_ref()),
        }
    }
}

/// Converts the ISO timestamp from `latest_time.txt` into a slot key,
/// keeping its own UTC offset.
pub(crate) fn slot_from_latest_time(text: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.format(SLOT_FORMAT).to_string())
}

/// Slot keys to try, newest first: the published latest slot (when known),
/// then `now` floored to ten minutes and stepped back `steps - 1` times.
/// Duplicates are dropped.
pub(crate) fn observation_candidates(
    latest: Option<String>,
    now: NaiveDateTime,
    steps: u32,
) -> Vec<String> {
    let floored_minute = now.minute() - now.minute() % 10;
    let base = now
        .with_minute(floored_minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let mut candidates: Vec<String> = latest.into_iter().collect();
    for step in 0..i64::from(steps) {
        let slot = (base - TimeDelta::minutes(step * SLOT_MINUTES))
            .format(SLOT_FORMAT)
            .to_string();
        if !candidates.contains(&slot) {
            candidates.push(slot);
        }
    }
    candidates
}

/// The first station in `stations` present in `snapshot` with at least one
/// measurement.
pub(crate) fn pick_station(
    snapshot: &HashMap<String, StationReading>,
    stations: &[String],
    slot: &str,
) -> Option<Observation> {
    stations.iter().find_map(|id| {
        snapshot
            .get(id)
            .map(|reading| reading.to_observation(id, slot))
            .filter(Observation::has_any_value)
    })
}

/// Finds the newest usable observation for `stations`. Every failure along
/// the way is logged and the next candidate is tried; `None` means nothing
/// usable was found.
pub(crate) async fn fetch_observation(
    client: &HttpClient,
    base_url: &str,
    stations: &[String],
    now: NaiveDateTime,
    steps: u32,
) -> Option<Observation> {
    let base = base_url.trim_end_matches('/');

    let latest = match client.get_text(&format!("{base}/latest_time.txt")).await {
        Ok(text) => {
            let slot = slot_from_latest_time(&text);
            if slot.is_none() {
                tracing::warn!(latest_time = %text.trim(), "unparseable latest observation time");
            }
            slot
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch latest observation time");
            None
        }
    };

    for slot in observation_candidates(latest, now, steps) {
        let url = format!("{base}/map/{slot}.json");
        match client.get_json::<HashMap<String, StationReading>>(&url).await {
            Ok(snapshot) => {
                if let Some(observation) = pick_station(&snapshot, stations, &slot) {
                    tracing::debug!(
                        station = %observation.station_id,
                        slot = %slot,
                        "observation found"
                    );
                    return Some(observation);
                }
                tracing::debug!(slot = %slot, "no configured station reported in slot");
            }
            Err(e) => tracing::debug!(slot = %slot, error = %e, "observation slot unavailable"),
        }
    }
    None
}
