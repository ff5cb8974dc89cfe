use crate::currency::{CurrencyConverter, RateSource};
use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

/// Start the exchange-rate refresh job on `schedule` (6-field cron, UTC).
///
/// The job goes through the 24-hour gate, so a schedule that fires more
/// often than daily only retries after failures.
pub async fn start_scheduler<S>(
    schedule: &str,
    converter: Arc<CurrencyConverter>,
    source: Arc<S>,
) -> Result<JobScheduler>
where
    S: RateSource + 'static,
{
    let scheduler = JobScheduler::new().await?;

    info!("Scheduling exchange-rate refresh (cron: {})", schedule);

    let job = Job::new_async(schedule, move |_uuid, _l| {
        let converter = Arc::clone(&converter);
        let source = Arc::clone(&source);

        Box::pin(async move {
            info!("⏰ Scheduled rate refresh triggered");
            if !converter.refresh_rates(source.as_ref()).await {
                warn!("Scheduled rate refresh failed, serving previous rates");
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("✓ Scheduler started");

    Ok(scheduler)
}
