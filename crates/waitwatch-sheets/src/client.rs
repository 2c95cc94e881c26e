//! HTTP client for the Google Sheets v4 REST API.
//!
//! Authenticates with a bearer access token supplied by the caller. Only the
//! handful of calls the sink needs are wrapped: listing sheet tabs, adding a
//! tab, reading and writing the header row, inserting a row, and appending
//! rows.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SinkError;
use crate::types::{
    BatchRequest, BatchUpdate, DimensionRange, NewSheetProperties, SheetProperties,
    SpreadsheetMeta, ValueRange, ValuesBody,
};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Client for one Google account's spreadsheets.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests.
pub struct SheetsClient {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("access_token", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Creates a client pointed at the production Sheets API.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64) -> Result<Self, SinkError> {
        Self::with_base_url(access_token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SinkError::InvalidUrl`] if `base_url` is not a valid base URL.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("waitwatch/0.1 (sheets-sink)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| SinkError::InvalidUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
        })
    }

    /// Makes sure `sheet` exists in the spreadsheet and starts with
    /// `headers`.
    ///
    /// A missing tab is created and given the header row. For an existing
    /// tab whose first row differs from `headers`, a blank row is inserted
    /// at the top (only when the tab already has content) and the header is
    /// written into it. Failures while reconciling an existing tab's header
    /// are logged and do not fail the call.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the tab list cannot be read or a missing
    /// tab cannot be created.
    pub async fn ensure_sheet(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        headers: &[&str],
    ) -> Result<(), SinkError> {
        let tabs = self.sheet_properties(spreadsheet_id).await?;
        let Some(existing) = tabs.into_iter().find(|p| p.title == sheet) else {
            self.add_sheet(spreadsheet_id, sheet).await?;
            self.write_header(spreadsheet_id, sheet, headers).await?;
            tracing::info!(sheet, "created sheet with header row");
            return Ok(());
        };

        if let Err(e) = self
            .reconcile_header(spreadsheet_id, &existing, headers)
            .await
        {
            tracing::warn!(sheet, error = %e, "could not check or repair header row");
        }
        Ok(())
    }

    /// Appends `rows` after the last non-empty row of `sheet`.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] on HTTP or authorization failure.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SinkError> {
        let mut url = self.values_url(spreadsheet_id, &format!("{sheet}!A:A:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = ValuesBody { values: rows };
        self.send_json::<serde_json::Value, _>(Method::POST, url, Some(&body))
            .await?;
        tracing::debug!(sheet, rows = rows.len(), "appended rows");
        Ok(())
    }

    async fn reconcile_header(
        &self,
        spreadsheet_id: &str,
        sheet: &SheetProperties,
        headers: &[&str],
    ) -> Result<(), SinkError> {
        let first_row = self.read_first_row(spreadsheet_id, &sheet.title).await?;
        if first_row.iter().map(String::as_str).eq(headers.iter().copied()) {
            return Ok(());
        }

        if !first_row.is_empty() {
            self.insert_top_row(spreadsheet_id, sheet.sheet_id).await?;
        }
        self.write_header(spreadsheet_id, &sheet.title, headers).await?;
        tracing::info!(sheet = %sheet.title, "wrote header row to existing sheet");
        Ok(())
    }

    async fn sheet_properties(
        &self,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetProperties>, SinkError> {
        let mut url = self.spreadsheet_url(spreadsheet_id, "")?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let meta: SpreadsheetMeta = self.send_json(Method::GET, url, None::<&()>).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), SinkError> {
        let body = BatchUpdate {
            requests: vec![BatchRequest::AddSheet {
                properties: NewSheetProperties {
                    title: title.to_string(),
                },
            }],
        };
        self.batch_update(spreadsheet_id, &body).await
    }

    async fn insert_top_row(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<(), SinkError> {
        let body = BatchUpdate {
            requests: vec![BatchRequest::InsertDimension {
                range: DimensionRange {
                    sheet_id,
                    dimension: "ROWS",
                    start_index: 0,
                    end_index: 1,
                },
                inherit_from_before: false,
            }],
        };
        self.batch_update(spreadsheet_id, &body).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdate,
    ) -> Result<(), SinkError> {
        let url = self.spreadsheet_url(spreadsheet_id, ":batchUpdate")?;
        self.send_json::<serde_json::Value, _>(Method::POST, url, Some(body))
            .await?;
        Ok(())
    }

    async fn read_first_row(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<String>, SinkError> {
        let url = self.values_url(spreadsheet_id, &format!("{sheet}!1:1"))?;
        let range: ValueRange = self.send_json(Method::GET, url, None::<&()>).await?;
        Ok(range.first_row())
    }

    async fn write_header(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        headers: &[&str],
    ) -> Result<(), SinkError> {
        let mut url = self.values_url(spreadsheet_id, &format!("{sheet}!1:1"))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let row = vec![headers.iter().map(|h| (*h).to_string()).collect::<Vec<_>>()];
        let body = ValuesBody { values: &row };
        self.send_json::<serde_json::Value, _>(Method::PUT, url, Some(&body))
            .await?;
        Ok(())
    }

    /// `{base}/v4/spreadsheets/{id}{suffix}`, where `suffix` is appended to
    /// the id segment (e.g. `:batchUpdate`).
    fn spreadsheet_url(&self, spreadsheet_id: &str, suffix: &str) -> Result<Url, SinkError> {
        let id_segment = format!("{spreadsheet_id}{suffix}");
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SinkError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", id_segment.as_str()]);
        Ok(url)
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}`.
    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SinkError> {
        let mut url = self.spreadsheet_url(spreadsheet_id, "")?;
        url.path_segments_mut()
            .map_err(|()| SinkError::InvalidUrl(self.base_url.to_string()))?
            .extend(["values", range]);
        Ok(url)
    }

    /// Sends an authorized request and parses the JSON response.
    ///
    /// # Errors
    ///
    /// - [`SinkError::Unauthorized`] on 401/403.
    /// - [`SinkError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SinkError::Http`] on network failure.
    /// - [`SinkError::Deserialize`] if the body does not match `T`.
    async fn send_json<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, SinkError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(SinkError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(SinkError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| SinkError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
