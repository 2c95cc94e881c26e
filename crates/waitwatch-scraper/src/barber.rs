//! Wait-count collection from barbershop status pages.

use chrono::{Local, NaiveDateTime, Timelike};
use rand::Rng;
use waitwatch_core::{DelayWindow, ScrapeStatus, ScrapingSettings, StoreTarget, WaitRecord};

use crate::client::HttpClient;
use crate::error::ScraperError;
use crate::rate_limit::politeness_delay;
use crate::selector::{extract_wait_text, parse_wait_count};

const DEBUG_EXCERPT_CHARS: usize = 500;

/// Scrapes the current queue length for each configured barber store.
///
/// Never fails past this boundary: every target yields exactly one
/// [`WaitRecord`], with failures recorded in its status.
pub struct BarberCollector {
    client: HttpClient,
    delay: DelayWindow,
    mock_mode: bool,
    debug: bool,
}

impl BarberCollector {
    #[must_use]
    pub fn new(client: HttpClient, delay: DelayWindow, mock_mode: bool) -> Self {
        Self {
            client,
            delay,
            mock_mode,
            debug: false,
        }
    }

    /// Logs the matched element text and a page excerpt for each store.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_settings(settings: &ScrapingSettings) -> Result<Self, ScraperError> {
        Ok(Self::new(
            HttpClient::from_settings(settings)?,
            settings.delay,
            settings.mock_mode,
        )
        .with_debug(settings.debug))
    }

    /// Reads one store's wait count, stamping the record with `at`.
    pub async fn collect_store(&self, target: &StoreTarget, at: NaiveDateTime) -> WaitRecord {
        if self.mock_mode {
            let count = mock_wait_count(at.hour());
            tracing::debug!(store_id = %target.id, count, "mock wait count");
            return WaitRecord::observed(target, at, Some(count), ScrapeStatus::Mock);
        }

        let html = match self.client.get_text(&target.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    store_id = %target.id,
                    url = %target.url,
                    error = %e,
                    "failed to fetch store page"
                );
                return WaitRecord::failed(target, at, failure_status(&e));
            }
        };

        if self.debug {
            let excerpt: String = html.chars().take(DEBUG_EXCERPT_CHARS).collect();
            tracing::info!(store_id = %target.id, bytes = html.len(), %excerpt, "fetched store page");
        }

        match extract_wait_text(&html, &target.selector) {
            Ok(text) => {
                if self.debug {
                    tracing::info!(store_id = %target.id, text = %text, "matched wait element");
                }
                let count = parse_wait_count(&text);
                tracing::info!(
                    store_id = %target.id,
                    store = %target.name,
                    wait_count = ?count,
                    "collected wait count"
                );
                WaitRecord::observed(target, at, count, ScrapeStatus::Success)
            }
            Err(e) => {
                tracing::warn!(store_id = %target.id, error = %e, "wait-count element not found");
                WaitRecord::failed(target, at, failure_status(&e))
            }
        }
    }

    /// Collects every `barber` target in order, pausing a random interval
    /// between consecutive stores. Non-barber targets are skipped.
    pub async fn collect_all(&self, targets: &[StoreTarget]) -> Vec<WaitRecord> {
        let barbers: Vec<&StoreTarget> = targets.iter().filter(|t| t.is_barber()).collect();
        tracing::info!(stores = barbers.len(), mock = self.mock_mode, "collecting wait counts");

        let mut records = Vec::with_capacity(barbers.len());
        for (i, target) in barbers.into_iter().enumerate() {
            if i > 0 {
                politeness_delay(self.delay).await;
            }
            let at = Local::now().naive_local();
            records.push(self.collect_store(target, at).await);
        }

        let failed = records.iter().filter(|r| r.status.is_error()).count();
        tracing::info!(
            collected = records.len() - failed,
            failed,
            "wait-count collection finished"
        );
        records
    }
}

fn failure_status(err: &ScraperError) -> ScrapeStatus {
    ScrapeStatus::error(err.status_kind(), err.to_string())
}

/// Plausible synthetic queue length for `hour`: busier late morning and
/// early evening, busiest over lunch, near-empty otherwise.
#[must_use]
pub fn mock_wait_count(hour: u32) -> u32 {
    let mut rng = rand::rng();
    match hour {
        10..=12 | 15..=18 => rng.random_range(3..=15),
        13..=14 => rng.random_range(8..=20),
        _ => rng.random_range(0..=5),
    }
}
