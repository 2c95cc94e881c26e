//! Grouped wait statistics behind the charts and the summary.
//!
//! Rows with a null wait are ignored everywhere, and a group with no
//! non-null wait does not appear in the output.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use waitwatch_core::{TimeCategory, WeatherCategory};

use crate::merged::MergedRow;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Mean wait per key. Rows for which `key` returns `None` are skipped.
#[must_use]
pub fn mean_by<K, F>(rows: &[MergedRow], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&MergedRow) -> Option<K>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for row in rows {
        let (Some(wait), Some(k)) = (row.wait_count, key(row)) else {
            continue;
        };
        groups.entry(k).or_default().push(wait);
    }
    groups.into_iter().map(|(k, acc)| (k, acc.mean())).collect()
}

/// Mean wait keyed by `(weekday, hour)`, Monday = 0.
#[must_use]
pub fn mean_by_weekday_hour(rows: &[MergedRow]) -> BTreeMap<(u32, u32), f64> {
    mean_by(rows, |r| r.hour.map(|h| (r.weekday, h)))
}

#[must_use]
pub fn mean_by_hour(rows: &[MergedRow]) -> BTreeMap<u32, f64> {
    mean_by(rows, |r| r.hour)
}

/// Mean wait per weekday index, iterating Monday through Sunday.
#[must_use]
pub fn mean_by_weekday(rows: &[MergedRow]) -> BTreeMap<u32, f64> {
    mean_by(rows, |r| Some(r.weekday))
}

#[must_use]
pub fn mean_by_month(rows: &[MergedRow]) -> BTreeMap<u32, f64> {
    mean_by(rows, |r| Some(r.month))
}

/// Mean wait per time-of-day bucket, highest first.
#[must_use]
pub fn mean_by_time_category(rows: &[MergedRow]) -> Vec<(TimeCategory, f64)> {
    descending(mean_by(rows, |r| Some(r.time_category)))
}

/// Mean wait per store name, highest first.
#[must_use]
pub fn mean_by_store(rows: &[MergedRow]) -> Vec<(String, f64)> {
    descending(mean_by(rows, |r| Some(r.store_name.clone())))
}

#[must_use]
pub fn mean_by_store_and_time_category(
    rows: &[MergedRow],
) -> BTreeMap<(String, TimeCategory), f64> {
    mean_by(rows, |r| Some((r.store_name.clone(), r.time_category)))
}

/// Number of distinct store ids, counting rows with a null wait.
#[must_use]
pub fn store_count(rows: &[MergedRow]) -> usize {
    rows.iter()
        .map(|r| r.store_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Per-date wait statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub std_dev: Option<f64>,
    pub count: usize,
}

#[must_use]
pub fn daily_stats(rows: &[MergedRow]) -> Vec<DailyStat> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(wait) = row.wait_count {
            by_date.entry(row.date).or_default().push(wait);
        }
    }
    by_date
        .into_iter()
        .map(|(date, values)| {
            let mean = mean(&values);
            DailyStat {
                date,
                mean,
                std_dev: sample_std_dev(&values, mean),
                count: values.len(),
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}

/// Wait values per weather category, for rows that have both.
#[must_use]
pub fn waits_by_weather(rows: &[MergedRow]) -> BTreeMap<WeatherCategory, Vec<f64>> {
    let mut groups: BTreeMap<WeatherCategory, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let (Some(category), Some(wait)) = (row.weather_category, row.wait_count) {
            groups.entry(category).or_default().push(wait);
        }
    }
    groups
}

/// Five-number summary of a sample, quartiles by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - position.floor();
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// `(temp_avg, wait)` pairs for rows that have both.
#[must_use]
pub fn temperature_points(rows: &[MergedRow]) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| r.temp_avg.zip(r.wait_count))
        .collect()
}

/// Degree-1 least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a line through `points`. `None` with fewer than two points or when
/// every x is the same.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx.abs() < f64::EPSILON {
        return None;
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// The `n` hours with the lowest mean wait. Ties go to the earlier hour.
#[must_use]
pub fn best_hours(rows: &[MergedRow], n: usize) -> Vec<(u32, f64)> {
    lowest(mean_by_hour(rows), n)
}

/// The `n` weekdays with the lowest mean wait. Ties go to the earlier
/// weekday (Monday first).
#[must_use]
pub fn best_weekdays(rows: &[MergedRow], n: usize) -> Vec<(u32, f64)> {
    lowest(mean_by_weekday(rows), n)
}

fn lowest<K>(means: BTreeMap<K, f64>, n: usize) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = means.into_iter().collect();
    // Stable sort: equal means stay in key order.
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    entries.truncate(n);
    entries
}

fn descending<K>(means: BTreeMap<K, f64>) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = means.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
