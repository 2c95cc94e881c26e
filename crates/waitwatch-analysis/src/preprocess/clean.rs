//! Row-level cleaning of the raw wait and weather stores.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use waitwatch_core::calendar::weekday_index;
use waitwatch_core::datefmt::{parse_date, parse_timestamp};
use waitwatch_core::{TimeCategory, WeatherCategory};

/// Plausible wait counts; anything outside is a scrape artefact.
const WAIT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=50.0;

/// A wait-store row as text. Columns missing from the file read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWaitRow {
    pub timestamp: String,
    pub date: String,
    pub time: String,
    pub store_id: String,
    pub store_name: String,
    pub wait_count: String,
    pub area: String,
    pub hour: String,
    pub scraping_status: String,
}

/// A weather-store row as text. Older exports used the short column names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawWeatherRow {
    pub timestamp: String,
    pub date: String,
    #[serde(alias = "weather")]
    pub weather_forecast: String,
    #[serde(alias = "temp_min")]
    pub temp_min_forecast: String,
    #[serde(alias = "temp_max")]
    pub temp_max_forecast: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CleanWait {
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub time: String,
    pub store_id: String,
    pub store_name: String,
    pub wait_count: Option<f64>,
    pub area: String,
    pub hour: Option<u32>,
    pub scraping_status: String,
    pub weekday: u32,
    pub time_category: TimeCategory,
}

/// The weather kept for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DailyWeather {
    pub weather: Option<String>,
    pub category: WeatherCategory,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
}

/// Row counts from cleaning the wait store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitCleaning {
    pub read: usize,
    /// Unreadable rows plus rows whose timestamp or date did not parse.
    pub rejected: usize,
    pub out_of_range: usize,
    pub duplicates: usize,
    pub kept: usize,
}

/// Row counts from cleaning the weather store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeatherCleaning {
    pub read: usize,
    pub rejected: usize,
    /// Distinct dates left after keeping the latest reading per date.
    pub days: usize,
}

/// Parse-or-null for numeric cells. Non-finite values count as null.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Hour of day from a cell such as `"9"` or `"9.0"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn parse_hour(raw: &str) -> Option<u32> {
    parse_number(raw)
        .filter(|h| (h - h.round()).abs() < f64::EPSILON && (0.0..=23.0).contains(h))
        .map(|h| h.round() as u32)
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn clean_wait_rows(rows: Vec<RawWaitRow>, stats: &mut WaitCleaning) -> Vec<CleanWait> {
    stats.read += rows.len();

    let mut seen: HashSet<(NaiveDateTime, String)> = HashSet::new();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let (Some(timestamp), Some(date)) = (parse_timestamp(&row.timestamp), parse_date(&row.date))
        else {
            tracing::debug!(
                timestamp = %row.timestamp,
                date = %row.date,
                "rejecting wait row with unparseable timestamp or date"
            );
            stats.rejected += 1;
            continue;
        };

        let wait_count = parse_number(&row.wait_count);
        let hour = parse_hour(&row.hour);

        if wait_count.is_some_and(|w| !WAIT_RANGE.contains(&w)) {
            stats.out_of_range += 1;
            continue;
        }

        if !seen.insert((timestamp, row.store_id.clone())) {
            stats.duplicates += 1;
            continue;
        }

        cleaned.push(CleanWait {
            timestamp,
            date,
            time: row.time.trim().to_string(),
            store_id: row.store_id,
            store_name: row.store_name,
            wait_count,
            area: row.area,
            hour,
            scraping_status: row.scraping_status,
            weekday: weekday_index(date),
            time_category: TimeCategory::from_hour(hour),
        });
    }

    stats.kept = cleaned.len();
    cleaned
}

/// Cleans weather rows down to one reading per date: rows are ordered by
/// timestamp (stable) and the last one for each date wins.
pub(crate) fn clean_weather_rows(
    rows: Vec<RawWeatherRow>,
    stats: &mut WeatherCleaning,
) -> BTreeMap<NaiveDate, DailyWeather> {
    stats.read += rows.len();

    let mut parsed: Vec<(NaiveDateTime, NaiveDate, DailyWeather)> = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(timestamp), Some(date)) = (parse_timestamp(&row.timestamp), parse_date(&row.date))
        else {
            stats.rejected += 1;
            continue;
        };
        let weather = non_empty(&row.weather_forecast);
        parsed.push((
            timestamp,
            date,
            DailyWeather {
                category: WeatherCategory::classify(weather.as_deref()),
                weather,
                temp_min: parse_number(&row.temp_min_forecast),
                temp_max: parse_number(&row.temp_max_forecast),
            },
        ));
    }

    parsed.sort_by_key(|(timestamp, _, _)| *timestamp);

    let mut by_date = BTreeMap::new();
    for (_, date, daily) in parsed {
        by_date.insert(date, daily);
    }
    stats.days = by_date.len();
    by_date
}
