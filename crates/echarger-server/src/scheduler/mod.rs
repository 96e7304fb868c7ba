//! Background job scheduler.
//!
//! Scheduled ingestion is opt-in: with no `ECHARGER_INGEST_SCHEDULE` set the
//! scheduler starts empty and the server only serves what is stored.

mod ingest;

use std::sync::Arc;

use echarger_core::AppConfig;
use sqlx::PgPool;
use tokio_cron_scheduler::{JobScheduler, JobSchedulerError};

use crate::cache::ChargerCache;

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
    cache: ChargerCache,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match config.ingest_schedule.clone() {
        Some(cron) => ingest::register_ingest_job(&scheduler, &cron, pool, config, cache).await?,
        None => tracing::info!("scheduler: ECHARGER_INGEST_SCHEDULE not set; ingestion disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}
