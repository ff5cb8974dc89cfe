//! Locale resolution: pick one locale per request from several signals.
//!
//! Priority is fixed and first match wins:
//! cookie > URL path > geo country > Accept-Language > catalog default.
//! Missing, empty or unsupported signals are skipped; resolution never fails.

use crate::i18n::code;
use crate::i18n::{LanguageCatalog, LocaleEntry, ResolutionMetrics};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Signals available for one request. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Stored locale preference (cookie or browser storage)
    pub cookie_value: Option<String>,

    /// Path of the visited page (e.g., "/es-mx/pricing")
    pub url_path: Option<String>,

    /// ISO 3166-1 alpha-2 country supplied by the edge network
    pub geo_country_code: Option<String>,

    /// Raw Accept-Language header
    pub accept_language: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, value: impl Into<String>) -> Self {
        self.cookie_value = Some(value.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.url_path = Some(path.into());
        self
    }

    pub fn with_geo(mut self, country: impl Into<String>) -> Self {
        self.geo_country_code = Some(country.into());
        self
    }

    pub fn with_accept_language(mut self, header: impl Into<String>) -> Self {
        self.accept_language = Some(header.into());
        self
    }
}

/// Which signal decided a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleSource {
    Cookie,
    Path,
    Geo,
    Header,
    Default,
}

impl LocaleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocaleSource::Cookie => "cookie",
            LocaleSource::Path => "path",
            LocaleSource::Geo => "geo",
            LocaleSource::Header => "header",
            LocaleSource::Default => "default",
        }
    }
}

impl fmt::Display for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The locale chosen for a request, tagged with the deciding signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocale {
    pub locale: LocaleEntry,
    pub source: LocaleSource,
}

/// Country code -> locale code table used for geo resolution.
#[derive(Debug, Clone, Default)]
pub struct GeoLocaleMap {
    entries: HashMap<String, String>,
}

impl GeoLocaleMap {
    /// Build a table from `(country, locale)` pairs. Countries are stored uppercase.
    pub fn new<I, C, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: AsRef<str>,
        L: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(country, locale)| (country.as_ref().trim().to_ascii_uppercase(), locale.into()))
            .collect();
        Self { entries }
    }

    /// The built-in country table.
    pub fn builtin() -> Self {
        Self::new([
            ("US", "en-US"),
            ("GB", "en-GB"),
            ("AU", "en-AU"),
            ("CA", "en-CA"),
            ("ES", "es-ES"),
            ("MX", "es-MX"),
            ("AR", "es-AR"),
            ("FR", "fr-FR"),
            ("DE", "de-DE"),
            ("AT", "de-AT"),
            ("BR", "pt-BR"),
            ("PT", "pt-PT"),
            ("IT", "it-IT"),
            ("SA", "ar-SA"),
            ("AE", "ar-AE"),
            ("CN", "zh-CN"),
            ("TW", "zh-TW"),
            ("JP", "ja-JP"),
            ("KR", "ko-KR"),
            ("NL", "nl-NL"),
            ("RU", "ru-RU"),
            ("IN", "hi-IN"),
            ("PK", "ur-PK"),
        ])
    }

    /// Locale code mapped to a country, if any (case-insensitive).
    pub fn locale_for(&self, country: &str) -> Option<&str> {
        self.entries
            .get(&country.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One language range from an Accept-Language header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
    pub tag: String,
    pub quality: f32,
}

/// Parsed Accept-Language header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptLanguage {
    /// Usable entries, sorted by descending quality (header order on ties)
    pub preferences: Vec<LanguagePreference>,

    /// Entries dropped as malformed
    pub skipped: usize,
}

/// Parse an Accept-Language header (RFC 7231 section 5.3.5).
///
/// Entries are `tag[;q=value]`; quality defaults to 1.0. Malformed entries
/// (bad tag, unparseable or out-of-range `q`) are skipped and counted, and
/// entries with `q=0` or the `*` wildcard are dropped since they never name
/// a usable locale.
pub fn parse_accept_language(header: &str) -> AcceptLanguage {
    let mut parsed = AcceptLanguage::default();

    for raw in header.split(',') {
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }

        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or_default().trim();

        let mut quality = Some(1.0_f32);
        for param in parts {
            let param = param.trim();
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    quality = value
                        .trim()
                        .parse::<f32>()
                        .ok()
                        .filter(|q| (0.0..=1.0).contains(q));
                    break;
                }
            }
        }

        if tag == "*" {
            continue;
        }

        let Some(quality) = quality else {
            parsed.skipped += 1;
            continue;
        };

        if !code::is_language_tag(tag) {
            parsed.skipped += 1;
            continue;
        }

        if quality == 0.0 {
            continue;
        }

        parsed.preferences.push(LanguagePreference {
            tag: tag.to_string(),
            quality,
        });
    }

    // sort_by is stable, so equal qualities keep header order
    parsed
        .preferences
        .sort_by(|a, b| b.quality.total_cmp(&a.quality));

    parsed
}

/// Resolves the effective locale for a request.
pub struct LocaleResolver {
    catalog: Arc<LanguageCatalog>,
    geo: GeoLocaleMap,
    metrics: ResolutionMetrics,
}

impl LocaleResolver {
    pub fn new(catalog: Arc<LanguageCatalog>, geo: GeoLocaleMap) -> Self {
        Self {
            catalog,
            geo,
            metrics: ResolutionMetrics::new(),
        }
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    /// Resolve exactly one locale for `ctx`.
    ///
    /// A supported cookie wins even when the URL path names a different
    /// locale: an explicit preference beats the page being visited.
    pub fn resolve(&self, ctx: &RequestContext) -> ResolvedLocale {
        let (entry, source) = self.pick(ctx);

        debug!(
            "Resolved locale {} from {} (cookie={:?}, path={:?}, geo={:?})",
            entry.code, source, ctx.cookie_value, ctx.url_path, ctx.geo_country_code
        );
        self.metrics.record(source);

        ResolvedLocale {
            locale: entry.clone(),
            source,
        }
    }

    fn pick(&self, ctx: &RequestContext) -> (&LocaleEntry, LocaleSource) {
        // 1. Cookie
        if let Some(entry) = present(&ctx.cookie_value).and_then(|c| self.catalog.get(c)) {
            return (entry, LocaleSource::Cookie);
        }

        // 2. URL path
        if let Some(entry) = present(&ctx.url_path).and_then(|p| self.path_locale(p)) {
            return (entry, LocaleSource::Path);
        }

        // 3. Geo
        if let Some(entry) = present(&ctx.geo_country_code).and_then(|c| self.geo_locale(c)) {
            return (entry, LocaleSource::Geo);
        }

        // 4. Accept-Language
        if let Some(entry) = present(&ctx.accept_language).and_then(|h| self.header_locale(h)) {
            return (entry, LocaleSource::Header);
        }

        // 5. Default
        (self.catalog.default_locale(), LocaleSource::Default)
    }

    /// Locale named by the first segment of `path`, if supported.
    pub fn path_locale(&self, path: &str) -> Option<&LocaleEntry> {
        let segment = path.split('/').find(|s| !s.is_empty())?;
        if !code::is_path_locale_segment(segment) {
            return None;
        }
        self.catalog.get(segment)
    }

    /// Locale mapped to a country, if the mapping exists and is supported.
    pub fn geo_locale(&self, country: &str) -> Option<&LocaleEntry> {
        self.geo
            .locale_for(country)
            .and_then(|locale| self.catalog.get(locale))
    }

    /// First supported locale from an Accept-Language header.
    ///
    /// Each candidate is tried as an exact code, then by its base language.
    pub fn header_locale(&self, header: &str) -> Option<&LocaleEntry> {
        let parsed = parse_accept_language(header);
        self.metrics.record_skipped_header_entries(parsed.skipped);

        parsed.preferences.iter().find_map(|pref| {
            self.catalog
                .get(&pref.tag)
                .or_else(|| self.catalog.get(code::base_language(&pref.tag)))
        })
    }

    /// Geo-based locale suggestion for a banner. Never used to redirect.
    ///
    /// Only offered when the visitor is not already on a localized path and
    /// the suggestion differs from the default locale.
    pub fn suggest(&self, ctx: &RequestContext) -> Option<&LocaleEntry> {
        if present(&ctx.url_path)
            .and_then(|p| self.path_locale(p))
            .is_some()
        {
            return None;
        }

        present(&ctx.geo_country_code)
            .and_then(|c| self.geo_locale(c))
            .filter(|entry| entry.code != self.catalog.default_locale().code)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
