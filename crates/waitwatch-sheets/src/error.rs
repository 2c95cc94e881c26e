use thiserror::Error;

/// Errors returned by the spreadsheet client and the local CSV writer.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected (401/403).
    #[error("spreadsheet access denied (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidUrl(String),

    /// No spreadsheet id or credentials for this destination.
    #[error("spreadsheet sink not configured: {0}")]
    NotConfigured(String),

    #[error("sheet '{0}' not found in spreadsheet")]
    SheetNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
