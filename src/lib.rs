//! Locale resolution, localized pricing and multilingual SEO files for a
//! marketing site.
//!
//! - [`i18n`]: locale catalog, request locale resolution, localized strings
//! - [`currency`]: exchange rates, conversion and money formatting
//! - [`url_strategy`], [`hreflang`], [`sitemap`]: alternate URLs and sitemaps
//! - [`pricing`]: subscription plans priced per locale
//! - [`server`], [`scheduler`]: HTTP service and the daily rate refresh

pub mod clock;
pub mod config;
pub mod currency;
pub mod hreflang;
pub mod i18n;
pub mod pricing;
pub mod retry;
pub mod scheduler;
pub mod security;
pub mod server;
pub mod sitemap;
pub mod url_strategy;
