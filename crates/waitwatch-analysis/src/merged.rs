//! The processed table: one row per cleaned wait observation, joined with
//! that day's weather and enriched with calendar features.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use waitwatch_core::datefmt;
use waitwatch_core::{Season, TimeCategory, WeatherCategory};

/// A row of `merged_data.csv`. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    #[serde(with = "datefmt::timestamp")]
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub time: String,
    pub store_id: String,
    pub store_name: String,
    pub wait_count: Option<f64>,
    pub area: String,
    pub hour: Option<u32>,
    pub scraping_status: String,
    /// Monday = 0.
    pub weekday: u32,
    pub weekday_name: String,
    pub is_weekend: bool,
    pub time_category: TimeCategory,
    pub weather: Option<String>,
    /// `None` when no weather row exists for the date.
    pub weather_category: Option<WeatherCategory>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub temp_avg: Option<f64>,
    pub month: u32,
    pub season: Season,
    pub hour_sin: Option<f64>,
    pub hour_cos: Option<f64>,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
}
