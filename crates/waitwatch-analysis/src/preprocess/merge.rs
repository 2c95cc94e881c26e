//! Date join of cleaned waits with daily weather, plus derived features.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use waitwatch_core::calendar::{cyclical, WEEKDAY_NAMES};
use waitwatch_core::Season;

use super::clean::{CleanWait, DailyWeather};
use crate::merged::MergedRow;

/// Left-joins `waits` with `weather` on date, keeping wait order. Dates with
/// no weather keep null weather fields.
pub(crate) fn merge(
    waits: Vec<CleanWait>,
    weather: &BTreeMap<NaiveDate, DailyWeather>,
) -> Vec<MergedRow> {
    let mut rows: Vec<MergedRow> = waits
        .into_iter()
        .map(|wait| {
            let daily = weather.get(&wait.date);
            let temp_min = daily.and_then(|d| d.temp_min);
            let temp_max = daily.and_then(|d| d.temp_max);
            let (weekday_sin, weekday_cos) = cyclical(f64::from(wait.weekday), 7.0);
            let hour_cycle = wait.hour.map(|h| cyclical(f64::from(h), 24.0));
            let month = wait.date.month();

            MergedRow {
                timestamp: wait.timestamp,
                date: wait.date,
                time: wait.time,
                store_id: wait.store_id,
                store_name: wait.store_name,
                wait_count: wait.wait_count,
                area: wait.area,
                hour: wait.hour,
                scraping_status: wait.scraping_status,
                weekday: wait.weekday,
                weekday_name: WEEKDAY_NAMES[wait.weekday as usize].to_string(),
                is_weekend: wait.weekday >= 5,
                time_category: wait.time_category,
                weather: daily.and_then(|d| d.weather.clone()),
                weather_category: daily.map(|d| d.category),
                temp_min,
                temp_max,
                temp_avg: temp_min.zip(temp_max).map(|(lo, hi)| (lo + hi) / 2.0),
                month,
                season: Season::from_month(month),
                hour_sin: hour_cycle.map(|(sin, _)| sin),
                hour_cos: hour_cycle.map(|(_, cos)| cos),
                weekday_sin,
                weekday_cos,
            }
        })
        .collect();

    fill_temp_avg(&mut rows);
    rows
}

/// Replaces missing `temp_avg` values with the mean of the present ones.
/// Leaves them null when no row has one.
#[allow(clippy::cast_precision_loss)]
fn fill_temp_avg(rows: &mut [MergedRow]) {
    let present: Vec<f64> = rows.iter().filter_map(|r| r.temp_avg).collect();
    if present.is_empty() || present.len() == rows.len() {
        return;
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    for row in rows.iter_mut().filter(|r| r.temp_avg.is_none()) {
        row.temp_avg = Some(mean);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use waitwatch_core::{TimeCategory, WeatherCategory};

    use super::*;

    fn wait(date: NaiveDate, hour: u32) -> CleanWait {
        let timestamp: NaiveDateTime = date.and_hms_opt(hour, 0, 0).unwrap();
        CleanWait {
            timestamp,
            date,
            time: format!("{hour:02}:00"),
            store_id: "store_001".to_string(),
            store_name: "Shop".to_string(),
            wait_count: Some(3.0),
            area: "Nagoya".to_string(),
            hour: Some(hour),
            scraping_status: "success".to_string(),
            weekday: waitwatch_core::calendar::weekday_index(date),
            time_category: TimeCategory::from_hour(Some(hour)),
        }
    }

    fn daily(min: Option<f64>, max: Option<f64>) -> DailyWeather {
        DailyWeather {
            weather: Some("晴れ".to_string()),
            category: WeatherCategory::Sunny,
            temp_min: min,
            temp_max: max,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn unmatched_dates_keep_null_weather() {
        let weather = BTreeMap::from([(day(1), daily(Some(5.0), Some(15.0)))]);
        let rows = merge(vec![wait(day(1), 10), wait(day(2), 10)], &weather);

        assert_eq!(rows[0].weather_category, Some(WeatherCategory::Sunny));
        assert_eq!(rows[0].temp_avg, Some(10.0));
        assert_eq!(rows[1].weather, None);
        assert_eq!(rows[1].weather_category, None);
        assert_eq!(rows[1].temp_min, None);
        assert_eq!(rows[1].temp_avg, Some(10.0), "filled with the mean");
    }

    #[test]
    fn temp_avg_needs_both_bounds() {
        let weather = BTreeMap::from([
            (day(1), daily(Some(0.0), Some(10.0))),
            (day(2), daily(Some(20.0), Some(30.0))),
            (day(3), daily(Some(8.0), None)),
        ]);
        let rows = merge(
            vec![wait(day(1), 10), wait(day(2), 10), wait(day(3), 10)],
            &weather,
        );

        assert_eq!(rows[0].temp_avg, Some(5.0));
        assert_eq!(rows[1].temp_avg, Some(25.0));
        assert_eq!(rows[2].temp_avg, Some(15.0));
    }

    #[test]
    fn temp_avg_stays_null_without_any_temperatures() {
        let rows = merge(vec![wait(day(1), 10)], &BTreeMap::new());
        assert_eq!(rows[0].temp_avg, None);
    }

    #[test]
    fn derived_calendar_features() {
        // 2024-01-06 is a Saturday.
        let rows = merge(vec![wait(day(6), 6)], &BTreeMap::new());
        let row = &rows[0];

        assert_eq!(row.weekday, 5);
        assert_eq!(row.weekday_name, "Saturday");
        assert!(row.is_weekend);
        assert_eq!(row.month, 1);
        assert_eq!(row.season, Season::Winter);
        let hour_sin = row.hour_sin.unwrap();
        assert!((hour_sin - 1.0).abs() < 1e-12, "sin(2π·6/24) = 1, got {hour_sin}");
    }

    #[test]
    fn null_hour_has_null_cyclical_encoding() {
        let mut no_hour = wait(day(1), 10);
        no_hour.hour = None;
        let rows = merge(vec![no_hour], &BTreeMap::new());

        assert_eq!(rows[0].hour_sin, None);
        assert_eq!(rows[0].hour_cos, None);
        assert!((rows[0].weekday_cos - 1.0).abs() < 1e-12);
    }
}
