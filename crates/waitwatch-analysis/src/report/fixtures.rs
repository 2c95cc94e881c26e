//! Hand-built processed rows for report tests.

use chrono::{Datelike, NaiveDate};

use waitwatch_core::calendar::{weekday_index, weekday_name};
use waitwatch_core::{Season, TimeCategory, WeatherCategory};

use crate::merged::MergedRow;

/// A row for `store` on 2024-01-`day` at `hour`, with no weather.
pub(crate) fn row(store: &str, day: u32, hour: u32, wait: Option<f64>) -> MergedRow {
    let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    let weekday = weekday_index(date);
    MergedRow {
        timestamp: date.and_hms_opt(hour, 0, 0).unwrap(),
        date,
        time: format!("{hour:02}:00"),
        store_id: store.to_string(),
        store_name: format!("Shop {store}"),
        wait_count: wait,
        area: "Nagoya".to_string(),
        hour: Some(hour),
        scraping_status: "success".to_string(),
        weekday,
        weekday_name: weekday_name(date.weekday()).to_string(),
        is_weekend: weekday >= 5,
        time_category: TimeCategory::from_hour(Some(hour)),
        weather: None,
        weather_category: None,
        temp_min: None,
        temp_max: None,
        temp_avg: None,
        month: 1,
        season: Season::Winter,
        hour_sin: None,
        hour_cos: None,
        weekday_sin: 0.0,
        weekday_cos: 1.0,
    }
}

/// Same as [`row`] with weather attached.
pub(crate) fn weather_row(
    store: &str,
    day: u32,
    hour: u32,
    wait: Option<f64>,
    category: WeatherCategory,
    temp_avg: f64,
) -> MergedRow {
    MergedRow {
        weather: Some(category.as_str().to_string()),
        weather_category: Some(category),
        temp_avg: Some(temp_avg),
        ..row(store, day, hour, wait)
    }
}
