//! Internationalization (i18n) module: which locales exist and which one a
//! visitor gets.
//!
//! # Architecture
//!
//! - `catalog`: Single source of truth for all supported locales and their metadata
//! - `code`: Locale code validation and normalization
//! - `resolver`: Priority-ordered locale detection (cookie, path, geo, header, default)
//! - `strings`: Localized strings behind an explicit fallback chain
//! - `metrics`: Counters for which signal decided each resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use site_locale::i18n::{GeoLocaleMap, LanguageCatalog, LocaleResolver, RequestContext};
//!
//! let catalog = Arc::new(LanguageCatalog::builtin());
//! let resolver = LocaleResolver::new(catalog, GeoLocaleMap::builtin());
//!
//! let ctx = RequestContext::new().with_accept_language("es-MX,es;q=0.9");
//! let resolved = resolver.resolve(&ctx);
//! assert_eq!(resolved.locale.code, "es-MX");
//! ```

mod catalog;
pub mod code;
mod metrics;
mod resolver;
mod strings;

pub use catalog::{CatalogError, LanguageCatalog, LocaleEntry, DEFAULT_LOCALE};
pub use metrics::{MetricsReport, ResolutionMetrics};
pub use resolver::{
    parse_accept_language, AcceptLanguage, GeoLocaleMap, LanguagePreference, LocaleResolver,
    LocaleSource, RequestContext, ResolvedLocale,
};
pub use strings::TextCatalog;
