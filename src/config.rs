use crate::url_strategy::{SiteUrls, UrlStrategyKind};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Site identity
    pub site_base_url: String,
    pub site_domain: String,
    pub site_brand: String,
    pub url_strategy: UrlStrategyKind,

    // Locale
    pub default_locale: String,
    pub locale_cookie_name: String,
    pub locale_cookie_max_age_days: u32,

    // Exchange rates
    pub rate_feed_url: String,
    pub rate_refresh_schedule: String,

    // Admin
    pub api_key: Option<String>,

    // Sitemaps
    pub sitemap_output_dir: PathBuf,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Site identity
            site_base_url: std::env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "https://zynstro.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            site_domain: std::env::var("SITE_DOMAIN")
                .unwrap_or_else(|_| "zynstro.com".to_string()),
            site_brand: std::env::var("SITE_BRAND").unwrap_or_else(|_| "zynstro".to_string()),
            url_strategy: std::env::var("URL_STRATEGY")
                .ok()
                .map(|v| v.parse::<UrlStrategyKind>())
                .transpose()
                .context("URL_STRATEGY is invalid")?
                .unwrap_or_default(),

            // Locale
            default_locale: std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string()),
            locale_cookie_name: std::env::var("LOCALE_COOKIE_NAME")
                .unwrap_or_else(|_| "lang_pref".to_string()),
            locale_cookie_max_age_days: std::env::var("LOCALE_COOKIE_MAX_AGE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(365),

            // Exchange rates
            rate_feed_url: std::env::var("RATE_FEED_URL")
                .unwrap_or_else(|_| "https://api.exchangerate-api.com/v4/latest/USD".to_string()),
            rate_refresh_schedule: std::env::var("RATE_REFRESH_SCHEDULE")
                .unwrap_or_else(|_| "0 0 3 * * *".to_string()),

            // Admin (optional; admin routes reject every request without it)
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),

            // Sitemaps
            sitemap_output_dir: std::env::var("SITEMAP_OUTPUT_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    pub fn site_urls(&self) -> SiteUrls {
        SiteUrls {
            base_url: self.site_base_url.clone(),
            domain: self.site_domain.clone(),
            brand: self.site_brand.clone(),
            default_locale: self.default_locale.clone(),
        }
    }

    pub fn locale_cookie_max_age_secs(&self) -> u64 {
        u64::from(self.locale_cookie_max_age_days) * 86_400
    }
}
