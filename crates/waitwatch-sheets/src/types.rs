//! Google Sheets v4 request and response shapes, limited to the fields the
//! client reads or writes.

use serde::{Deserialize, Serialize};

/// `GET spreadsheets/{id}?fields=sheets.properties`.
#[derive(Debug, Deserialize)]
pub struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
}

/// `GET spreadsheets/{id}/values/{range}`. `values` is omitted by the API
/// when the range is empty.
#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// First row rendered as strings.
    #[must_use]
    pub fn first_row(&self) -> Vec<String> {
        self.values
            .first()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Body for `values.update` and `values.append`.
#[derive(Debug, Serialize)]
pub struct ValuesBody<'a> {
    pub values: &'a [Vec<String>],
}

/// Body for `spreadsheets.batchUpdate`.
#[derive(Debug, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<BatchRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchRequest {
    AddSheet {
        properties: NewSheetProperties,
    },
    #[serde(rename_all = "camelCase")]
    InsertDimension {
        range: DimensionRange,
        inherit_from_before: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct NewSheetProperties {
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: &'static str,
    pub start_index: u32,
    pub end_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_dimension_serializes_in_api_shape() {
        let body = BatchUpdate {
            requests: vec![BatchRequest::InsertDimension {
                range: DimensionRange {
                    sheet_id: 7,
                    dimension: "ROWS",
                    start_index: 0,
                    end_index: 1,
                },
                inherit_from_before: false,
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"requests": [{"insertDimension": {
                "range": {"sheetId": 7, "dimension": "ROWS", "startIndex": 0, "endIndex": 1},
                "inheritFromBefore": false
            }}]})
        );
    }

    #[test]
    fn add_sheet_serializes_in_api_shape() {
        let body = BatchUpdate {
            requests: vec![BatchRequest::AddSheet {
                properties: NewSheetProperties {
                    title: "barber_data".to_string(),
                },
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"requests": [{"addSheet": {"properties": {"title": "barber_data"}}}]})
        );
    }

    #[test]
    fn value_range_without_values_is_empty() {
        let range: ValueRange = serde_json::from_value(json!({"range": "barber_data!A1:Z1"})).unwrap();
        assert!(range.first_row().is_empty());
    }

    #[test]
    fn value_range_renders_non_string_cells() {
        let range: ValueRange =
            serde_json::from_value(json!({"values": [["timestamp", 3, true]]})).unwrap();
        assert_eq!(range.first_row(), vec!["timestamp", "3", "true"]);
    }
}
