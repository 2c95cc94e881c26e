//! Today's forecast from the JMA forecast endpoint.

use serde_json::Value;
use waitwatch_core::Forecast;

use crate::client::HttpClient;
use crate::error::ScraperError;

const WEATHER_TEXT: &str = "/0/timeSeries/0/areas/0/weathers/0";
const AREA_NAME: &str = "/0/timeSeries/0/areas/0/area/name";
const TEMPS: &str = "/0/timeSeries/2/areas/0/temps";

/// Fetches `{base}/{area_code}.json` and extracts today's forecast.
pub(crate) async fn fetch_forecast(
    client: &HttpClient,
    base_url: &str,
    area_code: &str,
) -> Result<Forecast, ScraperError> {
    let url = format!("{}/{area_code}.json", base_url.trim_end_matches('/'));
    let body: Value = client.get_json(&url).await?;
    parse_forecast(&body, &url)
}

/// Pulls the weather sentence, area name and temperatures out of a forecast
/// document.
///
/// The weather text and area name are required. Temperatures are optional:
/// the max is `temps[1]` and the min is `temps[2]`, and either being
/// unparseable drops both.
pub(crate) fn parse_forecast(body: &Value, context: &str) -> Result<Forecast, ScraperError> {
    let shape_error = |field: &str| ScraperError::UnexpectedShape {
        context: context.to_string(),
        field: field.to_string(),
    };

    let weather_text = body
        .pointer(WEATHER_TEXT)
        .and_then(Value::as_str)
        .ok_or_else(|| shape_error("weathers[0]"))?;
    let area_name = body
        .pointer(AREA_NAME)
        .and_then(Value::as_str)
        .ok_or_else(|| shape_error("area.name"))?;

    let (temp_min, temp_max) = body
        .pointer(TEMPS)
        .and_then(Value::as_array)
        .filter(|temps| temps.len() >= 2)
        .and_then(|temps| {
            let max = temp_cell(&temps[1])?;
            let min = match temps.get(2) {
                Some(cell) => temp_cell(cell)?,
                None => None,
            };
            Some((min, max))
        })
        .unwrap_or((None, None));

    Ok(Forecast {
        area_name: Some(area_name.to_string()),
        weather: Some(simplify_forecast(weather_text)),
        temp_min,
        temp_max,
    })
}

/// `Some(None)` for a blank cell, `None` when the cell is not a number.
fn temp_cell(cell: &Value) -> Option<Option<f64>> {
    match cell {
        Value::Null => Some(None),
        Value::Number(n) => n.as_f64().map(Some),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => s.trim().parse::<f64>().ok().map(Some),
        _ => None,
    }
}

/// Condenses a JMA forecast sentence into a short label.
///
/// Checks for 晴れ, then 曇り/くもり, then 雨, then 雪, combining with a
/// secondary keyword where one is present. Anything else longer than ten
/// characters is cut to ten plus `...`. Empty text is `不明`.
#[must_use]
pub fn simplify_forecast(text: &str) -> String {
    if text.is_empty() {
        return "不明".to_string();
    }
    let text = text.replace('\u{3000}', " ");
    let cloudy = text.contains("くもり") || text.contains("曇り");

    let label = if text.contains("晴れ") {
        if cloudy {
            "晴れ時々曇り"
        } else if text.contains('雨') {
            "晴れ時々雨"
        } else {
            "晴れ"
        }
    } else if cloudy {
        if text.contains('雨') {
            "曇り時々雨"
        } else {
            "曇り"
        }
    } else if text.contains('雨') {
        if text.contains('雷') {
            "雨時々雷雨"
        } else {
            "雨"
        }
    } else if text.contains('雪') {
        "雪"
    } else if text.chars().count() > 10 {
        return format!("{}...", text.chars().take(10).collect::<String>());
    } else {
        return text;
    };
    label.to_string()
}
