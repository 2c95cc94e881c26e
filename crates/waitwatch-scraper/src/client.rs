use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use waitwatch_core::ScrapingSettings;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Shared HTTP client for store pages and the weather API.
///
/// Maps 429, 404, and other non-2xx responses to typed errors. Transient
/// failures (429, 5xx, network errors and timeouts) are retried with
/// exponential backoff up to `max_retries` additional attempts.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl HttpClient {
    /// Creates an `HttpClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_settings(settings: &ScrapingSettings) -> Result<Self, ScraperError> {
        Self::new(
            settings.timeout_secs,
            &settings.user_agent,
            settings.max_retries,
            settings.retry_backoff_base_secs,
        )
    }

    /// Fetches `url` and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network failure or timeout after all retries.
    pub async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.send(url).await?;
            Ok(response.text().await?)
        })
        .await
    }

    /// Fetches `url` and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_text`], plus [`ScraperError::Deserialize`] when
    /// the body does not match `T` (not retried).
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScraperError> {
        let body = self.get_text(url).await?;
        serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
            context: url.to_owned(),
            source: e,
        })
    }

    async fn send(&self, url: &str) -> Result<Response, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }
}
