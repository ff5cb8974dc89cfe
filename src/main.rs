use anyhow::Result;
use site_locale::clock::SystemClock;
use site_locale::config::Config;
use site_locale::currency::{CurrencyConverter, HttpRateFeed};
use site_locale::scheduler;
use site_locale::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_locale=info".parse()?),
        )
        .init();

    info!("Starting locale service");

    let config = Config::from_env()?;
    info!(
        "Site {} ({} URLs, default locale {})",
        config.site_base_url, config.url_strategy, config.default_locale
    );

    let clock = Arc::new(SystemClock);
    let converter = Arc::new(CurrencyConverter::with_snapshot(clock.clone()));
    let rate_feed = Arc::new(HttpRateFeed::new(&config.rate_feed_url)?);

    // Startup refresh; the snapshot keeps serving if the feed is down
    if !converter.refresh_rates(rate_feed.as_ref()).await {
        warn!("Initial rate refresh failed, serving built-in snapshot");
    }

    let _scheduler = scheduler::start_scheduler(
        &config.rate_refresh_schedule,
        Arc::clone(&converter),
        Arc::clone(&rate_feed),
    )
    .await?;

    if config.api_key.is_none() {
        warn!("API_KEY not set, admin endpoints are disabled");
    }

    let state = Arc::new(AppState::new(config, converter, rate_feed, clock)?);
    server::serve(state).await
}
