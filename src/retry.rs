use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often and how patiently to retry a failing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total tries including the first; zero is treated as one
    pub max_attempts: u32,
    /// Wait before the second try
    pub initial_delay: Duration,
    /// Upper bound on any single wait
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Exchange-rate feed: 3 tries, waiting 2s then 4s.
    pub fn rate_feed() -> Self {
        Self::new(3, Duration::from_secs(2)).with_max_delay(Duration::from_secs(10))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Waits between tries, in order. Yields `attempts() - 1` values.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.attempts().saturating_sub(1)).map(move |retry| {
            let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(retry as i32);
            Duration::try_from_secs_f64(scaled)
                .unwrap_or(self.max_delay)
                .min(self.max_delay)
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::rate_feed()
    }
}

/// Run `operation` until it succeeds, the attempts run out, or
/// `is_transient` says the error will not go away (e.g. a 4xx response).
pub async fn with_retry<T, E, F, Fut, P>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
    is_transient: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let total = config.attempts();
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on try {}/{}", label, attempt, total);
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !is_transient(&error) {
            debug!("{}: permanent error, not retrying: {}", label, error);
            return Err(error);
        }

        let Some(delay) = delays.next() else {
            warn!("{}: gave up after {} tries: {}", label, total, error);
            return Err(error);
        };

        warn!(
            "{}: try {}/{} failed ({}), retrying in {:?}",
            label, attempt, total, error, delay
        );
        sleep(delay).await;
        attempt += 1;
    }
}
