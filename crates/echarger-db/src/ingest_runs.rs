//! Database operations for `ingest_runs`.
//!
//! A run moves `queued -> running -> succeeded | failed`. Each transition
//! only applies from the expected prior status.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `ingest_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngestRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub segments_processed: i32,
    pub pois_fetched: i32,
    pub chargers_inserted: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Totals recorded when a run succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestRunCounts {
    pub segments_processed: i32,
    pub pois_fetched: i32,
    pub chargers_inserted: i32,
}

impl IngestRunCounts {
    /// Build counts from in-memory tallies, saturating at `i32::MAX`.
    #[must_use]
    pub fn new(segments_processed: usize, pois_fetched: usize, chargers_inserted: usize) -> Self {
        let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            segments_processed: clamp(segments_processed),
            pois_fetched: clamp(pois_fetched),
            chargers_inserted: clamp(chargers_inserted),
        }
    }
}

const INGEST_RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, \
     completed_at, segments_processed, pois_fetched, chargers_inserted, error_message, created_at";

/// Creates a run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_ingest_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<IngestRunRow, DbError> {
    let sql = format!(
        "INSERT INTO ingest_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {INGEST_RUN_COLUMNS}"
    );
    let row = sqlx::query_as::<_, IngestRunRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(trigger_source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Marks a queued run as `running`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_ingest_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a running run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_ingest_run(
    pool: &PgPool,
    id: i64,
    counts: IngestRunCounts,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             segments_processed = $1, pois_fetched = $2, chargers_inserted = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(counts.segments_processed)
    .bind(counts.pois_fetched)
    .bind(counts.chargers_inserted)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a running run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidIngestRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_ingest_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE ingest_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidIngestRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has this `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_ingest_run(pool: &PgPool, id: i64) -> Result<IngestRunRow, DbError> {
    let sql = format!("SELECT {INGEST_RUN_COLUMNS} FROM ingest_runs WHERE id = $1");
    sqlx::query_as::<_, IngestRunRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// The most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_ingest_runs(pool: &PgPool, limit: i64) -> Result<Vec<IngestRunRow>, DbError> {
    let sql = format!(
        "SELECT {INGEST_RUN_COLUMNS} FROM ingest_runs ORDER BY created_at DESC, id DESC LIMIT $1"
    );
    let rows = sqlx::query_as::<_, IngestRunRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
