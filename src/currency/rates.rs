//! Exchange-rate table and the feed it is refreshed from.
//!
//! Rates are expressed as units of currency per 1 USD. A table is never
//! mutated after construction; refreshing builds a new table and swaps it in.

use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Currency every rate is relative to.
pub const BASE_CURRENCY: &str = "USD";

/// Immutable snapshot of exchange rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRateTable {
    rates: HashMap<String, f64>,
    as_of: DateTime<Utc>,
}

impl CurrencyRateTable {
    /// Build a table, keeping only positive, finite rates.
    ///
    /// Codes are stored uppercase and the base currency is always 1.0.
    pub fn new<I, S>(rates: I, as_of: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(code, rate)| (code.as_ref().trim().to_ascii_uppercase(), rate))
            .filter(|(code, _)| !code.is_empty())
            .collect();
        rates.insert(BASE_CURRENCY.to_string(), 1.0);

        Self { rates, as_of }
    }

    /// Build a table from feed data, or `None` if the feed had no usable rates.
    pub fn from_feed(rates: HashMap<String, f64>, as_of: DateTime<Utc>) -> Option<Self> {
        let table = Self::new(rates, as_of);
        // Only the forced base entry means nothing usable came back
        (table.rates.len() > 1).then_some(table)
    }

    /// Static startup snapshot.
    pub fn snapshot() -> Self {
        let as_of = Utc
            .with_ymd_and_hms(2024, 11, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();

        Self::new(
            [
                ("USD", 1.00),
                ("EUR", 0.92),
                ("GBP", 0.79),
                ("CAD", 1.36),
                ("AUD", 1.52),
                ("MXN", 17.05),
                ("ARS", 350.00),
                ("BRL", 4.97),
                ("CLP", 900.00),
                ("JPY", 149.50),
                ("CNY", 7.24),
                ("KRW", 1320.00),
                ("INR", 83.12),
                ("PKR", 278.50),
                ("RUB", 92.00),
                ("SAR", 3.75),
                ("AED", 3.67),
                ("TRY", 28.50),
                ("CHF", 0.88),
                ("SEK", 10.50),
                ("NOK", 10.60),
                ("DKK", 6.85),
                ("PLN", 4.05),
                ("CZK", 23.00),
                ("HUF", 360.00),
                ("RON", 4.58),
                ("BGN", 1.80),
                ("HRK", 6.93),
                ("ILS", 3.65),
                ("ZAR", 18.75),
                ("NZD", 1.65),
                ("SGD", 1.34),
                ("HKD", 7.82),
                ("THB", 35.50),
                ("MYR", 4.70),
                ("IDR", 15600.00),
                ("PHP", 56.00),
                ("VND", 24500.00),
            ],
            as_of,
        )
    }

    /// Rate for a currency (case-insensitive).
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rate(code).is_some()
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Currency codes in alphabetical order.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Anything that can supply fresh USD-relative rates.
pub trait RateSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    fn fetch_rates(&self) -> impl Future<Output = Result<HashMap<String, f64>>> + Send;
}

/// Non-success HTTP status from the feed.
#[derive(Debug, Error)]
#[error("Exchange-rate feed error ({status}): {body}")]
pub struct FeedStatusError {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct RateFeedResponse {
    rates: HashMap<String, f64>,
}

/// JSON feed returning `{"rates": {"EUR": 0.92, ...}}` relative to USD.
pub struct HttpRateFeed {
    client: reqwest::Client,
    url: String,
    retry: RetryConfig,
}

impl HttpRateFeed {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client for exchange-rate feed")?;

        Ok(Self {
            client,
            url: url.to_string(),
            retry: RetryConfig::rate_feed(),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> Result<HashMap<String, f64>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach exchange-rate feed")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedStatusError { status, body }.into());
        }

        let parsed: RateFeedResponse = response
            .json()
            .await
            .context("Failed to parse exchange-rate feed response")?;

        Ok(parsed.rates)
    }
}

impl RateSource for HttpRateFeed {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
        with_retry(
            &self.retry,
            "Exchange-rate feed",
            || self.fetch_once(),
            is_retryable_error,
        )
        .await
    }
}

/// Retry 429 and 5xx responses plus network/parse failures; other 4xx are final.
fn is_retryable_error(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<FeedStatusError>() {
        Some(FeedStatusError { status, .. }) => *status == 429 || *status >= 500,
        None => true,
    }
}
