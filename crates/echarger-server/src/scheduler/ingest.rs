//! Scheduled charger ingestion from OpenChargeMap.

use std::sync::Arc;

use echarger_core::{AppConfig, SegmentInfo, SEGMENTS};
use echarger_db::IngestRunCounts;
use echarger_scraper::{sweep_segments, OcmClient, SweepSettings};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::cache::ChargerCache;

pub(super) async fn register_ingest_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    config: Arc<AppConfig>,
    cache: ChargerCache,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let cache = cache.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting charger ingest run");
            run_ingest_job(&pool, &config, &cache).await;
            tracing::info!("scheduler: charger ingest run complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered charger ingest job");
    Ok(())
}

/// One full ingest run, recorded in `ingest_runs`. Errors are logged, never
/// propagated, so a bad run does not take the scheduler down.
async fn run_ingest_job(pool: &PgPool, config: &AppConfig, cache: &ChargerCache) {
    let run = match echarger_db::create_ingest_run(pool, "scheduler").await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to create ingest run");
            return;
        }
    };

    if let Err(e) = echarger_db::start_ingest_run(pool, run.id).await {
        tracing::error!(run_id = run.id, error = %e, "scheduler: failed to start ingest run");
        return;
    }

    match ingest_all_segments(pool, config).await {
        Ok(counts) => {
            if let Err(e) = echarger_db::complete_ingest_run(pool, run.id, counts).await {
                tracing::error!(run_id = run.id, error = %e, "scheduler: failed to complete ingest run");
            }
            tracing::info!(
                run_id = run.id,
                segments = counts.segments_processed,
                fetched = counts.pois_fetched,
                inserted = counts.chargers_inserted,
                "scheduler: ingest run succeeded"
            );
            if counts.chargers_inserted > 0 {
                cache.invalidate().await;
            }
        }
        Err(e) => {
            tracing::error!(run_id = run.id, error = %e, "scheduler: ingest run failed");
            if let Err(fail_err) =
                echarger_db::fail_ingest_run(pool, run.id, &format!("{e:#}")).await
            {
                tracing::error!(run_id = run.id, error = %fail_err, "scheduler: failed to mark ingest run failed");
            }
        }
    }
}

/// Sweep every corridor segment in order and insert what is new. A segment
/// whose fetch fails is skipped; database errors abort the run.
async fn ingest_all_segments(pool: &PgPool, config: &AppConfig) -> anyhow::Result<IngestRunCounts> {
    let client = OcmClient::from_app_config(config)?;
    let mut known = echarger_db::list_known_sites(pool).await?;
    let segments: Vec<&SegmentInfo> = SEGMENTS.iter().collect();

    let report = sweep_segments(
        &client,
        &segments,
        SweepSettings::from_app_config(config),
        &mut known,
        |accepted| async move {
            let inserted = echarger_db::insert_charger_candidates(pool, &accepted).await?;
            Ok::<_, sqlx::Error>(usize::try_from(inserted).unwrap_or(usize::MAX))
        },
    )
    .await?;

    if report.segments_skipped() > 0 {
        tracing::warn!(
            skipped = report.segments_skipped(),
            "scheduler: some segments could not be fetched"
        );
    }

    Ok(IngestRunCounts::new(
        report.segments_processed(),
        report.pois_fetched(),
        report.chargers_stored(),
    ))
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use echarger_core::Environment;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_for(ocm_base_url: String) -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".to_string(),
            env: Environment::Test,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            log_level: "info".to_string(),
            db_max_connections: 2,
            db_min_connections: 0,
            db_acquire_timeout_secs: 5,
            ocm_api_key: None,
            ocm_base_url,
            ocm_max_results: 200,
            ocm_min_power_kw: 100,
            scraper_request_timeout_secs: 5,
            scraper_user_agent: "echarger-test".to_string(),
            scraper_inter_request_delay_ms: 0,
            scraper_max_retries: 0,
            scraper_retry_backoff_base_secs: 0,
            safety_margin_km: 10.0,
            fast_charge_threshold_kw: 150,
            default_result_limit: 3,
            cache_ttl_secs: 300,
            rate_limit_per_minute: 120,
            ingest_schedule: Some("0 0 3 * * *".to_string()),
        }
    }

    async fn mock_ocm() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/poi"))
            .and(query_param("boundingbox", "(49.5,3),(51.4,5)"))
            .respond_with(ResponseTemplate::new(503))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/poi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "ID": 2001,
                    "AddressInfo": {"Title": "Fastned Breda", "Latitude": 51.5719, "Longitude": 4.7683},
                    "OperatorInfo": {"Title": "Fastned"},
                    "Connections": [{"ConnectionTypeID": 33, "PowerKW": 300.0}],
                    "NumberOfPoints": 8
                },
                {
                    "ID": 2002,
                    "AddressInfo": {"Title": "Allego Moerdijk", "Latitude": 51.70, "Longitude": 4.62},
                    "OperatorInfo": null,
                    "Connections": [{"ConnectionTypeID": 2, "PowerKW": 50.0}],
                    "NumberOfPoints": null
                }
            ])))
            .mount(&server)
            .await;

        server
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn ingest_sweeps_segments_and_skips_failed_fetches(pool: PgPool) {
        let server = mock_ocm().await;
        let config = config_for(server.uri());

        let counts = ingest_all_segments(&pool, &config).await.expect("ingest");

        assert_eq!(counts.segments_processed, 8);
        assert_eq!(counts.pois_fetched, 16);
        assert_eq!(counts.chargers_inserted, 1);
        assert_eq!(echarger_db::count_chargers(&pool).await.expect("count"), 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn scheduled_run_is_recorded_and_invalidates_cache(pool: PgPool) {
        let server = mock_ocm().await;
        let config = config_for(server.uri());
        let cache = ChargerCache::new(Duration::from_secs(300));
        cache.store(Vec::new()).await;

        run_ingest_job(&pool, &config, &cache).await;

        let runs = echarger_db::list_ingest_runs(&pool, 10).await.expect("runs");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, "succeeded");
        assert_eq!(runs[0].trigger_source, "scheduler");
        assert_eq!(runs[0].chargers_inserted, 1);

        let reloaded = cache
            .get_or_refresh(|| echarger_db::fetch_charger_records(&pool, None))
            .await
            .expect("reload");
        assert_eq!(reloaded.records.len(), 1);
        assert_eq!(reloaded.records[0].name, "Fastned Breda");
    }
}
