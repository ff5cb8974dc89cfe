//! Locale resolution metrics.
//!
//! Counts which signal decided each resolution so operators can see, for
//! example, how often visitors fall all the way through to the default.

use crate::i18n::LocaleSource;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-source resolution counters.
///
/// Owned by a [`LocaleResolver`](crate::i18n::LocaleResolver); all counters use
/// relaxed atomics since they are observational only.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    cookie: AtomicUsize,
    path: AtomicUsize,
    geo: AtomicUsize,
    header: AtomicUsize,
    default: AtomicUsize,

    /// Accept-Language entries that were dropped as malformed
    skipped_header_entries: AtomicUsize,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution decided by `source`.
    pub fn record(&self, source: LocaleSource) {
        self.counter(source).fetch_add(1, Ordering::Relaxed);
    }

    /// Record Accept-Language entries skipped while parsing.
    pub fn record_skipped_header_entries(&self, count: usize) {
        if count > 0 {
            self.skipped_header_entries
                .fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Current count for one source.
    pub fn count(&self, source: LocaleSource) -> usize {
        self.counter(source).load(Ordering::Relaxed)
    }

    fn counter(&self, source: LocaleSource) -> &AtomicUsize {
        match source {
            LocaleSource::Cookie => &self.cookie,
            LocaleSource::Path => &self.path,
            LocaleSource::Geo => &self.geo,
            LocaleSource::Header => &self.header,
            LocaleSource::Default => &self.default,
        }
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let cookie = self.count(LocaleSource::Cookie);
        let path = self.count(LocaleSource::Path);
        let geo = self.count(LocaleSource::Geo);
        let header = self.count(LocaleSource::Header);
        let default = self.count(LocaleSource::Default);
        let total = cookie + path + geo + header + default;

        let default_rate = if total > 0 {
            (default as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cookie,
            path,
            geo,
            header,
            default,
            total,
            default_rate,
            skipped_header_entries: self.skipped_header_entries.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of resolution statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cookie: usize,
    pub path: usize,
    pub geo: usize,
    pub header: usize,
    pub default: usize,

    /// Total resolutions
    pub total: usize,

    /// Share of resolutions that fell back to the default, as a percentage (0-100)
    pub default_rate: f64,

    /// Malformed Accept-Language entries skipped
    pub skipped_header_entries: usize,
}
