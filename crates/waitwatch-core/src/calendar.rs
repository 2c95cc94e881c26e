//! Calendar and category helpers shared by the collectors and the analysis
//! stage: weekday naming, time-of-day buckets, seasons, weather categories,
//! and cyclical encodings.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// English weekday names indexed Monday = 0.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday index with Monday = 0.
#[must_use]
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    weekday_index(date) >= 5
}

/// Time-of-day bucket. Buckets are half-open hour intervals; everything
/// outside 06:00–21:00 is `Night`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCategory {
    Morning,
    MorningPeak,
    Afternoon,
    EveningPeak,
    Evening,
    Night,
    Unknown,
}

impl TimeCategory {
    #[must_use]
    pub fn from_hour(hour: Option<u32>) -> Self {
        match hour {
            None => Self::Unknown,
            Some(6..=8) => Self::Morning,
            Some(9..=11) => Self::MorningPeak,
            Some(12..=14) => Self::Afternoon,
            Some(15..=17) => Self::EveningPeak,
            Some(18..=20) => Self::Evening,
            Some(_) => Self::Night,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::MorningPeak => "morning_peak",
            Self::Afternoon => "afternoon",
            Self::EveningPeak => "evening_peak",
            Self::Evening => "evening",
            Self::Night => "night",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meteorological season; winter spans December through February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    #[must_use]
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Autumn,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
        })
    }
}

/// Coarse weather category derived from a free-text forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
    Other,
    Unknown,
}

/// Keyword table checked top to bottom; the first matching row wins.
const WEATHER_KEYWORDS: &[(WeatherCategory, &[&str])] = &[
    (WeatherCategory::Sunny, &["晴れ", "sunny"]),
    (WeatherCategory::Rainy, &["雨", "rain"]),
    (WeatherCategory::Cloudy, &["曇り", "くもり", "cloud"]),
    (WeatherCategory::Snowy, &["雪", "snow"]),
];

impl WeatherCategory {
    /// Classify a forecast description by keyword containment.
    ///
    /// Missing or blank text is `Unknown`; text matching no keyword is `Other`.
    #[must_use]
    pub fn classify(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Unknown;
        };
        let lower = text.to_lowercase();
        WEATHER_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(Self::Other, |(category, _)| *category)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Rainy => "rainy",
            Self::Cloudy => "cloudy",
            Self::Snowy => "snowy",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sine/cosine encoding of `value` on a cycle of length `period`.
#[must_use]
pub fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_category_boundaries_are_half_open() {
        assert_eq!(TimeCategory::from_hour(Some(5)), TimeCategory::Night);
        assert_eq!(TimeCategory::from_hour(Some(6)), TimeCategory::Morning);
        assert_eq!(TimeCategory::from_hour(Some(8)), TimeCategory::Morning);
        assert_eq!(TimeCategory::from_hour(Some(9)), TimeCategory::MorningPeak);
        assert_eq!(TimeCategory::from_hour(Some(12)), TimeCategory::Afternoon);
        assert_eq!(TimeCategory::from_hour(Some(15)), TimeCategory::EveningPeak);
        assert_eq!(TimeCategory::from_hour(Some(18)), TimeCategory::Evening);
        assert_eq!(TimeCategory::from_hour(Some(21)), TimeCategory::Night);
        assert_eq!(TimeCategory::from_hour(Some(23)), TimeCategory::Night);
        assert_eq!(TimeCategory::from_hour(None), TimeCategory::Unknown);
    }

    #[test]
    fn season_starts_winter_in_december() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }

    #[test]
    fn weather_classification_prefers_sunny() {
        assert_eq!(
            WeatherCategory::classify(Some("晴れ時々雨")),
            WeatherCategory::Sunny
        );
        assert_eq!(
            WeatherCategory::classify(Some("Rain then sunny")),
            WeatherCategory::Sunny
        );
    }

    #[test]
    fn weather_classification_checks_rain_before_cloud() {
        assert_eq!(
            WeatherCategory::classify(Some("曇り時々雨")),
            WeatherCategory::Rainy
        );
        assert_eq!(WeatherCategory::classify(Some("くもり")), WeatherCategory::Cloudy);
        assert_eq!(WeatherCategory::classify(Some("Snow")), WeatherCategory::Snowy);
    }

    #[test]
    fn weather_classification_handles_missing_and_unmatched() {
        assert_eq!(WeatherCategory::classify(None), WeatherCategory::Unknown);
        assert_eq!(WeatherCategory::classify(Some("  ")), WeatherCategory::Unknown);
        assert_eq!(WeatherCategory::classify(Some("fog")), WeatherCategory::Other);
    }

    #[test]
    fn weekday_helpers_use_monday_zero() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(weekday_index(monday), 0);
        assert_eq!(weekday_index(sunday), 6);
        assert_eq!(weekday_name(monday.weekday()), "Monday");
        assert!(!is_weekend(monday));
        assert!(is_weekend(sunday));
    }

    #[test]
    fn cyclical_encoding_wraps_period() {
        let (sin0, cos0) = cyclical(0.0, 24.0);
        let (sin6, cos6) = cyclical(6.0, 24.0);
        assert!(sin0.abs() < 1e-12);
        assert!((cos0 - 1.0).abs() < 1e-12);
        assert!((sin6 - 1.0).abs() < 1e-12);
        assert!(cos6.abs() < 1e-12);
    }
}
