//! Write sitemap.xml, per-locale sitemaps, the image sitemap and robots.txt
//! to a directory.
//!
//! Usage: cargo run --bin generate-sitemaps [OUTPUT_DIR]
//!
//! OUTPUT_DIR defaults to SITEMAP_OUTPUT_DIR (or `public`).

use anyhow::{Context, Result};
use site_locale::clock::SystemClock;
use site_locale::config::Config;
use site_locale::hreflang::HreflangSetBuilder;
use site_locale::i18n::LanguageCatalog;
use site_locale::sitemap::{default_pages, SitemapEmitter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_locale=info".parse()?)
                .add_directive("generate_sitemaps=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.sitemap_output_dir.clone());

    let catalog = LanguageCatalog::builtin_with_default(&config.default_locale)
        .context("DEFAULT_LOCALE is not a supported locale")?;
    let builder = HreflangSetBuilder::new(
        config.url_strategy.build(&config.site_urls()),
        &catalog.default_locale().code,
    );
    let emitter = SitemapEmitter::new(&config.site_base_url, builder, Arc::new(SystemClock));

    info!(
        "Generating sitemaps for {} locales ({} URLs)",
        catalog.len(),
        config.url_strategy
    );

    let written = emitter.write_all(&output_dir, &default_pages(), catalog.all_locales())?;
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}
