//! PNG charts of the processed table, drawn with `plotters`.
//!
//! Every chart is independent: one that has no data is skipped and one that
//! fails to draw is logged, and neither stops the rest.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, TimeDelta};
use plotters::coord::Shift;
use plotters::prelude::*;

use waitwatch_core::calendar::WEEKDAY_NAMES;
use waitwatch_core::{TimeCategory, WeatherCategory};

use super::aggregate::{self, BoxSummary, DailyStat, LinearFit};
use crate::merged::MergedRow;

pub const HEATMAP: &str = "heatmaps/hourly_wait_heatmap.png";
pub const DAILY_TREND: &str = "trends/daily_wait_trend.png";
pub const WEATHER_ANALYSIS: &str = "trends/weather_analysis.png";
pub const STORE_COMPARISON: &str = "trends/store_comparison.png";
pub const TIME_ANALYSIS: &str = "trends/time_analysis.png";

const CAPTION_FONT: (&str, u32) = ("sans-serif", 26);

/// Stack colours, one per time-of-day bucket in declaration order.
const CATEGORY_COLORS: [RGBColor; 7] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(127, 127, 127),
];

const TIME_CATEGORIES: [TimeCategory; 7] = [
    TimeCategory::Morning,
    TimeCategory::MorningPeak,
    TimeCategory::Afternoon,
    TimeCategory::EveningPeak,
    TimeCategory::Evening,
    TimeCategory::Night,
    TimeCategory::Unknown,
];

type DrawResult = Result<(), Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Result of rendering one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    Rendered(PathBuf),
    /// The chart had no data to show.
    Skipped(String),
    Failed(String),
}

impl ChartOutcome {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// Renders every chart under `output_dir`, in a fixed order.
#[must_use]
pub fn render_all(rows: &[MergedRow], output_dir: &Path) -> Vec<(&'static str, ChartOutcome)> {
    vec![
        (HEATMAP, hourly_heatmap(rows, output_dir)),
        (DAILY_TREND, daily_trend(rows, output_dir)),
        (WEATHER_ANALYSIS, weather_analysis(rows, output_dir)),
        (STORE_COMPARISON, store_comparison(rows, output_dir)),
        (TIME_ANALYSIS, time_analysis(rows, output_dir)),
    ]
}

#[must_use]
pub fn hourly_heatmap(rows: &[MergedRow], output_dir: &Path) -> ChartOutcome {
    let cells = aggregate::mean_by_weekday_hour(rows);
    if cells.is_empty() {
        return skipped(HEATMAP, "no wait counts with an hour");
    }
    render(output_dir, HEATMAP, |path| draw_heatmap(path, &cells))
}

#[must_use]
pub fn daily_trend(rows: &[MergedRow], output_dir: &Path) -> ChartOutcome {
    let stats = aggregate::daily_stats(rows);
    if stats.is_empty() {
        return skipped(DAILY_TREND, "no wait counts");
    }
    render(output_dir, DAILY_TREND, |path| draw_daily_trend(path, &stats))
}

#[must_use]
pub fn weather_analysis(rows: &[MergedRow], output_dir: &Path) -> ChartOutcome {
    let groups = aggregate::waits_by_weather(rows);
    let points = aggregate::temperature_points(rows);
    if groups.is_empty() && points.is_empty() {
        return skipped(WEATHER_ANALYSIS, "no weather joined to wait counts");
    }
    let fit = aggregate::linear_fit(&points);
    render(output_dir, WEATHER_ANALYSIS, |path| {
        draw_weather_analysis(path, &groups, &points, fit)
    })
}

#[must_use]
pub fn store_comparison(rows: &[MergedRow], output_dir: &Path) -> ChartOutcome {
    if aggregate::store_count(rows) <= 1 {
        return skipped(STORE_COMPARISON, "only one store available");
    }
    let by_store = aggregate::mean_by_store(rows);
    if by_store.is_empty() {
        return skipped(STORE_COMPARISON, "no wait counts");
    }
    let stacked = aggregate::mean_by_store_and_time_category(rows);
    render(output_dir, STORE_COMPARISON, |path| {
        draw_store_comparison(path, &by_store, &stacked)
    })
}

#[must_use]
pub fn time_analysis(rows: &[MergedRow], output_dir: &Path) -> ChartOutcome {
    let by_weekday = aggregate::mean_by_weekday(rows);
    if by_weekday.is_empty() {
        return skipped(TIME_ANALYSIS, "no wait counts");
    }
    let panels = TimePanels {
        by_hour: aggregate::mean_by_hour(rows),
        by_weekday,
        by_month: aggregate::mean_by_month(rows),
        by_time_category: aggregate::mean_by_time_category(rows),
    };
    render(output_dir, TIME_ANALYSIS, |path| draw_time_analysis(path, &panels))
}

fn skipped(chart: &str, reason: &str) -> ChartOutcome {
    tracing::info!(chart, reason, "chart skipped");
    ChartOutcome::Skipped(reason.to_string())
}

fn render<F>(output_dir: &Path, relative: &str, draw: F) -> ChartOutcome
where
    F: FnOnce(&Path) -> DrawResult,
{
    let path = output_dir.join(relative);
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(chart = relative, error = %e, "cannot create chart directory");
            return ChartOutcome::Failed(e.to_string());
        }
    }
    match draw(&path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "chart saved");
            ChartOutcome::Rendered(path)
        }
        Err(e) => {
            tracing::warn!(chart = relative, error = %e, "chart rendering failed");
            ChartOutcome::Failed(e.to_string())
        }
    }
}

fn draw_heatmap(path: &Path, cells: &BTreeMap<(u32, u32), f64>) -> DrawResult {
    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = bounds(cells.values().copied());
    let mut chart = ChartBuilder::on(&root)
        .caption("Average Wait Time by Hour and Day of Week", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(0f64..24f64, 0f64..7f64)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Hour of Day")
        .y_desc("Day of Week")
        .x_labels(24)
        .y_labels(7)
        .y_label_formatter(&|y: &f64| slot_label(&WEEKDAY_NAMES, *y))
        .draw()?;

    chart.draw_series(cells.iter().map(|(&(weekday, hour), &mean)| {
        let (x, y) = (f64::from(hour), f64::from(weekday));
        Rectangle::new([(x, y), (x + 1.0, y + 1.0)], heat_color(mean, lo, hi).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_daily_trend(path: &Path, stats: &[DailyStat]) -> DrawResult {
    let first = stats[0].date;
    let last = stats[stats.len() - 1].date;
    let top = upper_bound(stats.iter().map(|s| s.mean + s.std_dev.unwrap_or(0.0)));

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Average Wait Time Trend", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..day_offset(first, last) + 0.5, 0f64..top)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Average Wait Count")
        .x_label_formatter(&|x: &f64| date_label(first, *x))
        .draw()?;

    let upper = stats
        .iter()
        .map(|s| (day_offset(first, s.date), s.mean + s.std_dev.unwrap_or(0.0)));
    let lower = stats
        .iter()
        .rev()
        .map(|s| (day_offset(first, s.date), (s.mean - s.std_dev.unwrap_or(0.0)).max(0.0)));
    chart.draw_series(std::iter::once(Polygon::new(
        upper.chain(lower).collect::<Vec<_>>(),
        BLUE.mix(0.2).filled(),
    )))?;

    let means: Vec<(f64, f64)> = stats
        .iter()
        .map(|s| (day_offset(first, s.date), s.mean))
        .collect();
    chart
        .draw_series(LineSeries::new(means.clone(), BLUE.stroke_width(2)))?
        .label("daily mean ± std")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart.draw_series(means.into_iter().map(|p| Circle::new(p, 3, BLUE.filled())))?;
    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

fn draw_weather_analysis(
    path: &Path,
    groups: &BTreeMap<WeatherCategory, Vec<f64>>,
    points: &[(f64, f64)],
    fit: Option<LinearFit>,
) -> DrawResult {
    let root = BitMapBackend::new(path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(750);

    if !groups.is_empty() {
        draw_weather_boxes(&left, groups)?;
    }
    if !points.is_empty() {
        draw_temperature_scatter(&right, points, fit)?;
    }

    root.present()?;
    Ok(())
}

fn draw_weather_boxes(area: &Area<'_>, groups: &BTreeMap<WeatherCategory, Vec<f64>>) -> DrawResult {
    let names: Vec<&str> = groups.keys().map(|c| c.as_str()).collect();
    let boxes: Vec<BoxSummary> = groups
        .values()
        .filter_map(|values| BoxSummary::from_values(values))
        .collect();
    let top = upper_bound(boxes.iter().map(|b| b.max));

    let mut chart = ChartBuilder::on(area)
        .caption("Wait Time by Weather Category", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..slot(names.len()), 0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Weather Category")
        .y_desc("Wait Count")
        .x_labels(names.len() * 2 + 1)
        .x_label_formatter(&|x: &f64| slot_label(&names, *x - 0.5))
        .draw()?;

    for (i, summary) in boxes.iter().enumerate() {
        let (left, center, right) = (slot(i) + 0.25, slot(i) + 0.5, slot(i) + 0.75);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, summary.q1), (right, summary.q3)],
            BLUE.mix(0.3).filled(),
        )))?;
        chart.draw_series(
            [
                vec![(left, summary.median), (right, summary.median)],
                vec![(center, summary.min), (center, summary.q1)],
                vec![(center, summary.q3), (center, summary.max)],
                vec![(left + 0.1, summary.min), (right - 0.1, summary.min)],
                vec![(left + 0.1, summary.max), (right - 0.1, summary.max)],
            ]
            .into_iter()
            .map(|segment| PathElement::new(segment, BLACK.stroke_width(2))),
        )?;
    }
    Ok(())
}

fn draw_temperature_scatter(
    area: &Area<'_>,
    points: &[(f64, f64)],
    fit: Option<LinearFit>,
) -> DrawResult {
    let (x_lo, x_hi) = bounds(points.iter().map(|(x, _)| *x));
    let top = upper_bound(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(area)
        .caption("Wait Time vs Temperature", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_lo - 1.0)..(x_hi + 1.0), 0f64..top)?;
    chart
        .configure_mesh()
        .x_desc("Average Temperature (°C)")
        .y_desc("Wait Count")
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 4, BLUE.mix(0.6).filled())),
    )?;
    if let Some(fit) = fit {
        chart
            .draw_series(LineSeries::new(
                [(x_lo, fit.at(x_lo)), (x_hi, fit.at(x_hi))],
                RED.stroke_width(2),
            ))?
            .label("least-squares fit")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        chart.configure_series_labels().border_style(&BLACK).draw()?;
    }
    Ok(())
}

fn draw_store_comparison(
    path: &Path,
    by_store: &[(String, f64)],
    stacked: &BTreeMap<(String, TimeCategory), f64>,
) -> DrawResult {
    let root = BitMapBackend::new(path, (1500, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(750);

    draw_bars(
        &left,
        "Average Wait Time by Store",
        "Store",
        by_store,
        RGBColor(135, 206, 235),
    )?;

    let names: Vec<&str> = by_store.iter().map(|(name, _)| name.as_str()).collect();
    let totals = names.iter().map(|name| {
        TIME_CATEGORIES
            .iter()
            .filter_map(|c| stacked.get(&((*name).to_string(), *c)))
            .sum::<f64>()
    });
    let top = upper_bound(totals);

    let mut chart = ChartBuilder::on(&right)
        .caption("Wait Time by Store and Time Category", CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..slot(names.len()), 0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Store")
        .y_desc("Average Wait Count")
        .x_labels(names.len() * 2 + 1)
        .x_label_formatter(&|x: &f64| slot_label(&names, *x - 0.5))
        .draw()?;

    let mut bases = vec![0.0; names.len()];
    for (category, color) in TIME_CATEGORIES.iter().zip(CATEGORY_COLORS) {
        let mut bars = Vec::new();
        for (i, name) in names.iter().enumerate() {
            if let Some(mean) = stacked.get(&((*name).to_string(), *category)) {
                let base = bases[i];
                bars.push(Rectangle::new(
                    [(slot(i) + 0.15, base), (slot(i) + 0.85, base + mean)],
                    color.filled(),
                ));
                bases[i] = base + mean;
            }
        }
        if bars.is_empty() {
            continue;
        }
        chart
            .draw_series(bars)?
            .label(category.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart.configure_series_labels().border_style(&BLACK).draw()?;

    root.present()?;
    Ok(())
}

struct TimePanels {
    by_hour: BTreeMap<u32, f64>,
    by_weekday: BTreeMap<u32, f64>,
    by_month: BTreeMap<u32, f64>,
    by_time_category: Vec<(TimeCategory, f64)>,
}

fn draw_time_analysis(path: &Path, panels: &TimePanels) -> DrawResult {
    let root = BitMapBackend::new(path, (1500, 1200)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 2));

    let hourly: Vec<(f64, f64)> = panels
        .by_hour
        .iter()
        .map(|(h, mean)| (f64::from(*h), *mean))
        .collect();
    draw_line(&areas[0], "Average Wait Time by Hour", "Hour of Day", &hourly, -0.5..23.5)?;

    let weekdays: Vec<(String, f64)> = panels
        .by_weekday
        .iter()
        .map(|(d, mean)| (WEEKDAY_NAMES[*d as usize].to_string(), *mean))
        .collect();
    draw_bars(
        &areas[1],
        "Average Wait Time by Day of Week",
        "Day of Week",
        &weekdays,
        RGBColor(240, 128, 128),
    )?;

    let monthly: Vec<(f64, f64)> = panels
        .by_month
        .iter()
        .map(|(m, mean)| (f64::from(*m), *mean))
        .collect();
    draw_line(&areas[2], "Average Wait Time by Month", "Month", &monthly, 0.5..12.5)?;

    let categories: Vec<(String, f64)> = panels
        .by_time_category
        .iter()
        .map(|(c, mean)| (c.as_str().to_string(), *mean))
        .collect();
    draw_bars(
        &areas[3],
        "Average Wait Time by Time Category",
        "Time Category",
        &categories,
        RGBColor(255, 165, 0),
    )?;

    root.present()?;
    Ok(())
}

fn draw_line(
    area: &Area<'_>,
    caption: &str,
    x_desc: &str,
    points: &[(f64, f64)],
    x_range: Range<f64>,
) -> DrawResult {
    let top = upper_bound(points.iter().map(|(_, y)| *y));
    let mut chart = ChartBuilder::on(area)
        .caption(caption, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0f64..top)?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Average Wait Count")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 4, BLUE.filled())),
    )?;
    Ok(())
}

fn draw_bars(
    area: &Area<'_>,
    caption: &str,
    x_desc: &str,
    bars: &[(String, f64)],
    color: RGBColor,
) -> DrawResult {
    let names: Vec<&str> = bars.iter().map(|(name, _)| name.as_str()).collect();
    let top = upper_bound(bars.iter().map(|(_, mean)| *mean));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..slot(bars.len()), 0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Average Wait Count")
        .x_labels(bars.len() * 2 + 1)
        .x_label_formatter(&|x: &f64| slot_label(&names, *x - 0.5))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, mean))| {
        Rectangle::new([(slot(i) + 0.15, 0.0), (slot(i) + 0.85, *mean)], color.filled())
    }))?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn slot(index: usize) -> f64 {
    index as f64
}

/// Label for an axis position that falls on a whole slot index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slot_label<S: AsRef<str>>(labels: &[S], position: f64) -> String {
    if position < 0.0 || (position - position.round()).abs() > 1e-6 {
        return String::new();
    }
    labels
        .get(position.round() as usize)
        .map_or_else(String::new, |label| label.as_ref().to_string())
}

#[allow(clippy::cast_precision_loss)]
fn day_offset(first: NaiveDate, date: NaiveDate) -> f64 {
    (date - first).num_days() as f64
}

#[allow(clippy::cast_possible_truncation)]
fn date_label(first: NaiveDate, offset: f64) -> String {
    if (offset - offset.round()).abs() > 1e-6 {
        return String::new();
    }
    first
        .checked_add_signed(TimeDelta::days(offset.round() as i64))
        .map_or_else(String::new, |d| d.format("%m-%d").to_string())
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Axis ceiling with headroom; at least 1 so empty or all-zero data still
/// gets a drawable range.
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(1.0, f64::max) * 1.1
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn heat_color(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    RGBColor(255, (240.0 - 200.0 * t) as u8, (160.0 - 160.0 * t) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_label_only_on_whole_positions() {
        let names = ["a", "b"];
        assert_eq!(slot_label(&names, 0.0), "a");
        assert_eq!(slot_label(&names, 1.0), "b");
        assert_eq!(slot_label(&names, 0.5), "");
        assert_eq!(slot_label(&names, 2.0), "");
        assert_eq!(slot_label(&names, -1.0), "");
    }

    #[test]
    fn date_label_counts_days_from_first() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        assert_eq!(date_label(first, 0.0), "01-30");
        assert_eq!(date_label(first, 3.0), "02-02");
        assert_eq!(date_label(first, 1.5), "");
    }

    #[test]
    fn heat_color_runs_light_to_dark() {
        assert_eq!(heat_color(0.0, 0.0, 10.0), RGBColor(255, 240, 160));
        assert_eq!(heat_color(10.0, 0.0, 10.0), RGBColor(255, 40, 0));
    }

    #[test]
    fn upper_bound_has_floor() {
        assert!((upper_bound(std::iter::empty()) - 1.1).abs() < 1e-12);
        assert!((upper_bound([5.0, 10.0].into_iter()) - 11.0).abs() < 1e-9);
    }
}
