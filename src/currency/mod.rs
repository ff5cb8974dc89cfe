//! Currency conversion and formatting.
//!
//! [`CurrencyConverter`] holds the active [`CurrencyRateTable`] behind an
//! `RwLock<Arc<..>>`. Readers clone the `Arc` and never see a half-applied
//! refresh; a refresh builds a complete table and swaps it in at once.
//!
//! Refreshes are gated to once per [`REFRESH_INTERVAL_HOURS`] and coalesced:
//! callers that arrive while a refresh is in flight wait for it and share its
//! outcome instead of starting their own.

mod format;
mod rates;

pub use format::{currency_symbol, format_money, format_plain};
pub use rates::{CurrencyRateTable, FeedStatusError, HttpRateFeed, RateSource, BASE_CURRENCY};

use crate::clock::Clock;
use crate::i18n::LocaleEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Minimum time between successful refreshes.
pub const REFRESH_INTERVAL_HOURS: i64 = 24;

const ZERO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "VND", "IDR"];

/// Number of minor-unit digits shown for a currency.
pub fn decimal_places(currency: &str) -> u32 {
    let currency = currency.trim().to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str()) {
        0
    } else {
        2
    }
}

/// Round to `decimals` places, ties away from zero.
///
/// A scaled fraction within a few ULPs below one half counts as a tie, so
/// inputs like `1.005` (stored as `1.00499999...`) still round up. Values
/// too large to carry a fraction at this scale come back unchanged.
pub fn round_half_away_from_zero(amount: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = amount * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_FRACTIONAL {
        return amount;
    }

    let magnitude = scaled.abs();
    let whole = magnitude.trunc();
    let tie_slack = magnitude * f64::EPSILON * 4.0;
    let rounded = if magnitude - whole + tie_slack >= 0.5 {
        whole + 1.0
    } else {
        whole
    };
    rounded.copysign(scaled) / factor
}

/// 2^52: from here on every f64 is a whole number.
const MAX_EXACT_FRACTIONAL: f64 = 4_503_599_627_370_496.0;

#[derive(Debug, Default)]
struct RefreshState {
    last_success: Option<DateTime<Utc>>,
    last_outcome: bool,
}

/// Snapshot of the refresh lifecycle, for the admin endpoint and logs.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub attempts: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_outcome: bool,
    pub rates_as_of: DateTime<Utc>,
    pub currencies: usize,
}

pub struct CurrencyConverter {
    table: RwLock<Arc<CurrencyRateTable>>,
    clock: Arc<dyn Clock>,
    refresh: Mutex<RefreshState>,
    attempts: AtomicU64,
}

impl CurrencyConverter {
    /// Start from `table`; the first refresh is not gated.
    pub fn new(table: CurrencyRateTable, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
            clock,
            refresh: Mutex::new(RefreshState::default()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Start from the built-in snapshot.
    pub fn with_snapshot(clock: Arc<dyn Clock>) -> Self {
        Self::new(CurrencyRateTable::snapshot(), clock)
    }

    /// The table currently in effect.
    pub fn table(&self) -> Arc<CurrencyRateTable> {
        self.table
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn has_rate(&self, currency: &str) -> bool {
        self.table().contains(currency)
    }

    /// Convert between two currencies through USD.
    ///
    /// The result is rounded to the target's decimal places. If either
    /// currency has no rate, `amount` is returned unchanged.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        let table = self.table();
        match (table.rate(from), table.rate(to)) {
            (Some(from_rate), Some(to_rate)) => {
                round_half_away_from_zero(amount / from_rate * to_rate, decimal_places(to))
            }
            _ => {
                debug!("No rate for {} -> {}, returning amount unconverted", from, to);
                amount
            }
        }
    }

    /// Format for display, falling back to `"{CODE} {amount}"`.
    pub fn format(&self, amount: f64, currency: &str, locale: &str) -> String {
        format_money(amount, currency, locale).unwrap_or_else(|| format_plain(amount, currency))
    }

    /// Currency a locale prices in.
    pub fn currency_for_locale<'a>(&self, locale: &'a LocaleEntry) -> &'a str {
        &locale.currency_code
    }

    /// Refresh from `source` unless the last success is under 24 hours old.
    ///
    /// Returns `true` when fresh rates are in effect (including the gated
    /// case) and `false` when the fetch failed; previous rates stay active.
    pub async fn refresh_rates<S: RateSource>(&self, source: &S) -> bool {
        self.refresh_inner(source, false).await
    }

    /// Refresh from `source` regardless of the 24-hour gate.
    pub async fn force_refresh<S: RateSource>(&self, source: &S) -> bool {
        self.refresh_inner(source, true).await
    }

    async fn refresh_inner<S: RateSource>(&self, source: &S, force: bool) -> bool {
        let seen = self.attempts.load(Ordering::SeqCst);
        let mut state = self.refresh.lock().await;

        if self.attempts.load(Ordering::SeqCst) != seen {
            debug!("Joined an in-flight rate refresh");
            return state.last_outcome;
        }

        let now = self.clock.now();
        if !force {
            if let Some(last) = state.last_success {
                if now - last < chrono::Duration::hours(REFRESH_INTERVAL_HOURS) {
                    debug!("Rates refreshed at {}, skipping", last);
                    return true;
                }
            }
        }

        info!("Refreshing exchange rates from {}", source.name());
        let outcome = match source.fetch_rates().await {
            Ok(rates) => match CurrencyRateTable::from_feed(rates, now) {
                Some(table) => {
                    let count = table.len();
                    *self.table.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(table);
                    state.last_success = Some(now);
                    info!("✓ Exchange rates updated ({} currencies)", count);
                    true
                }
                None => {
                    warn!("Exchange-rate feed returned no usable rates, keeping previous table");
                    false
                }
            },
            Err(e) => {
                warn!("Exchange-rate refresh failed, keeping previous table: {:#}", e);
                false
            }
        };

        state.last_outcome = outcome;
        self.attempts.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    pub async fn status(&self) -> RefreshStatus {
        let state = self.refresh.lock().await;
        let table = self.table();
        RefreshStatus {
            attempts: self.attempts.load(Ordering::SeqCst),
            last_success: state.last_success,
            last_outcome: state.last_outcome,
            rates_as_of: table.as_of(),
            currencies: table.len(),
        }
    }
}
