use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("selector \"{selector}\" matched nothing")]
    NoMatch { selector: String },

    #[error("unexpected response shape from {context}: missing {field}")]
    UnexpectedShape { context: String, field: String },
}

impl ScraperError {
    /// Short tag used in the `scraping_status` column, e.g. `timeout` in
    /// `timeout_error: ...`.
    #[must_use]
    pub fn status_kind(&self) -> &'static str {
        match self {
            ScraperError::Http(e) if e.is_timeout() => "timeout",
            ScraperError::Http(_)
            | ScraperError::RateLimited { .. }
            | ScraperError::NotFound { .. }
            | ScraperError::UnexpectedStatus { .. } => "http",
            ScraperError::InvalidSelector { .. } | ScraperError::NoMatch { .. } => "extract",
            ScraperError::Deserialize { .. } | ScraperError::UnexpectedShape { .. } => "parse",
        }
    }
}
