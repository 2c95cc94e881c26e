//! Records produced by the collectors, one per observation attempt.
//!
//! Both record types are immutable once built. Wall-clock derived columns
//! (date, time, weekday, weekend flag) are computed from the timestamp when
//! the record is rendered as a row, so they can never disagree with it.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::calendar::{is_weekend, weekday_index, weekday_name};
use crate::datefmt::{DATE_FORMAT, TIMESTAMP_FORMAT, TIME_FORMAT};
use crate::stores::StoreTarget;

/// Column order of the raw wait-count store.
pub const WAIT_HEADERS: &[&str] = &[
    "timestamp",
    "date",
    "time",
    "store_id",
    "store_name",
    "wait_count",
    "area",
    "day_of_week",
    "hour",
    "weekday_num",
    "is_weekend",
    "scraping_status",
];

/// Layout of observation slot keys, e.g. `20240106093000`.
const SLOT_FORMAT: &str = "%Y%m%d%H%M%S";

/// Column order of the raw weather store.
pub const WEATHER_HEADERS: &[&str] = &[
    "timestamp",
    "date",
    "time",
    "hour",
    "area_code",
    "area_name",
    "weather_forecast",
    "temp_min_forecast",
    "temp_max_forecast",
    "current_temp",
    "humidity",
    "precipitation_1h",
    "wind_speed",
    "pressure",
    "observation_station",
    "data_status",
    "observation_time",
];

/// A record that can be written as one row of a fixed-header table.
pub trait TabularRecord {
    /// Header row of the destination table.
    const HEADERS: &'static [&'static str];

    /// Sheet tab name used by the spreadsheet sink.
    const SHEET_NAME: &'static str;

    /// Cells in `HEADERS` order; absent values are empty strings.
    fn to_row(&self) -> Vec<String>;
}

/// Outcome of a single scrape attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeStatus {
    Success,
    /// Synthetic value produced in mock mode; no request was made.
    Mock,
    Error {
        kind: &'static str,
        message: String,
    },
}

impl ScrapeStatus {
    #[must_use]
    pub fn error(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl std::fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Mock => f.write_str("mock"),
            Self::Error { kind, message } => write!(f, "{kind}_error: {message}"),
        }
    }
}

/// One wait-count observation for one store.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitRecord {
    pub timestamp: NaiveDateTime,
    pub store_id: String,
    pub store_name: String,
    /// `None` when the page could not be read or showed no number.
    pub wait_count: Option<u32>,
    pub area: String,
    pub status: ScrapeStatus,
}

impl WaitRecord {
    #[must_use]
    pub fn observed(
        target: &StoreTarget,
        timestamp: NaiveDateTime,
        wait_count: Option<u32>,
        status: ScrapeStatus,
    ) -> Self {
        Self {
            timestamp,
            store_id: target.id.clone(),
            store_name: target.name.clone(),
            wait_count,
            area: target.area.clone(),
            status,
        }
    }

    /// Error-tagged record with a null wait count.
    #[must_use]
    pub fn failed(target: &StoreTarget, timestamp: NaiveDateTime, status: ScrapeStatus) -> Self {
        Self::observed(target, timestamp, None, status)
    }
}

impl TabularRecord for WaitRecord {
    const HEADERS: &'static [&'static str] = WAIT_HEADERS;
    const SHEET_NAME: &'static str = "barber_data";

    fn to_row(&self) -> Vec<String> {
        let date = self.timestamp.date();
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            date.format(DATE_FORMAT).to_string(),
            self.timestamp.format(TIME_FORMAT).to_string(),
            self.store_id.clone(),
            self.store_name.clone(),
            opt_cell(self.wait_count),
            self.area.clone(),
            weekday_name(date.weekday()).to_string(),
            self.timestamp.hour().to_string(),
            weekday_index(date).to_string(),
            is_weekend(date).to_string(),
            self.status.to_string(),
        ]
    }
}

/// Today's forecast for an area.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub area_name: Option<String>,
    pub weather: Option<String>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
}

/// Current conditions from the nearest observation station.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub station_id: String,
    /// Observation slot as `yyyymmddHHMMSS`.
    pub observed_at: String,
    pub current_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation_1h: Option<f64>,
    pub wind_speed: Option<f64>,
    pub pressure: Option<f64>,
}

impl Observation {
    /// The observation slot as a `%Y-%m-%d %H:%M:%S` cell, or the raw slot
    /// key if it does not parse.
    #[must_use]
    pub fn observed_at_cell(&self) -> String {
        NaiveDateTime::parse_from_str(&self.observed_at, SLOT_FORMAT).map_or_else(
            |_| self.observed_at.clone(),
            |at| at.format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// `true` when at least one measurement is present.
    #[must_use]
    pub fn has_any_value(&self) -> bool {
        [
            self.current_temp,
            self.humidity,
            self.precipitation_1h,
            self.wind_speed,
            self.pressure,
        ]
        .iter()
        .any(Option::is_some)
    }
}

/// Forecast and observation for one area, merged into one row. Either half
/// may be missing independently.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    pub area_code: String,
    pub forecast: Option<Forecast>,
    pub observation: Option<Observation>,
}

impl WeatherRecord {
    #[must_use]
    pub fn data_status(&self) -> &'static str {
        if self.forecast.is_some() || self.observation.is_some() {
            "success"
        } else {
            "error"
        }
    }
}

impl TabularRecord for WeatherRecord {
    const HEADERS: &'static [&'static str] = WEATHER_HEADERS;
    const SHEET_NAME: &'static str = "weather_data";

    fn to_row(&self) -> Vec<String> {
        let forecast = self.forecast.as_ref();
        let observation = self.observation.as_ref();
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.timestamp.date().format(DATE_FORMAT).to_string(),
            self.timestamp.format(TIME_FORMAT).to_string(),
            self.timestamp.hour().to_string(),
            self.area_code.clone(),
            forecast
                .and_then(|f| f.area_name.clone())
                .unwrap_or_default(),
            forecast.and_then(|f| f.weather.clone()).unwrap_or_default(),
            opt_cell(forecast.and_then(|f| f.temp_min)),
            opt_cell(forecast.and_then(|f| f.temp_max)),
            opt_cell(observation.and_then(|o| o.current_temp)),
            opt_cell(observation.and_then(|o| o.humidity)),
            opt_cell(observation.and_then(|o| o.precipitation_1h)),
            opt_cell(observation.and_then(|o| o.wind_speed)),
            opt_cell(observation.and_then(|o| o.pressure)),
            observation
                .map(|o| o.station_id.clone())
                .unwrap_or_default(),
            self.data_status().to_string(),
            observation.map(Observation::observed_at_cell).unwrap_or_default(),
        ]
    }
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
