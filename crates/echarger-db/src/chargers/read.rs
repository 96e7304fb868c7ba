//! Read operations for the `chargers` table.

use sqlx::PgPool;

use echarger_core::{ChargerRecord, RouteSegment, SiteFingerprint};

use super::types::ChargerRow;
use crate::DbError;

/// Rows per keyset page when walking the whole table.
pub const CHARGER_PAGE_SIZE: i64 = 100;

const CHARGER_COLUMNS: &str = "id, public_id, ocm_id, name, latitude, longitude, network, \
     power_kw, connector_types, num_chargers, highway_proximity, route_segment, on_route, \
     amenities, notes, reliability, status, country, created_at";

/// One keyset page: rows with `id > after_id`, ordered by `id`, optionally
/// restricted to one corridor segment.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_chargers_page(
    pool: &PgPool,
    after_id: Option<i64>,
    limit: i64,
    segment: Option<RouteSegment>,
) -> Result<Vec<ChargerRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {CHARGER_COLUMNS} \
         FROM chargers \
         WHERE id > $1 \
           AND ($2::text IS NULL OR route_segment = $2) \
         ORDER BY id \
         LIMIT $3"
    );

    sqlx::query_as::<_, ChargerRow>(&sql)
        .bind(after_id.unwrap_or(0))
        .bind(segment.map(RouteSegment::as_str))
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Walk every page and convert rows into [`ChargerRecord`]s. Rows without
/// a name or coordinates are skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any page query fails.
pub async fn fetch_charger_records(
    pool: &PgPool,
    segment: Option<RouteSegment>,
) -> Result<Vec<ChargerRecord>, DbError> {
    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut cursor = None;

    loop {
        let page = list_chargers_page(pool, cursor, CHARGER_PAGE_SIZE, segment).await?;
        let Some(last) = page.last() else {
            break;
        };
        cursor = Some(last.id);
        let full_page = i64::try_from(page.len()).unwrap_or(i64::MAX) >= CHARGER_PAGE_SIZE;

        for row in page {
            let row_id = row.id;
            match row.into_record() {
                Some(record) => records.push(record),
                None => {
                    tracing::debug!(row_id, "skipping charger row without name or coordinates");
                    dropped += 1;
                }
            }
        }

        if !full_page {
            break;
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, kept = records.len(), "dropped unusable charger rows");
    }

    Ok(records)
}

/// Name and coordinates of every stored charger, for duplicate checks
/// during ingestion. Unlike [`fetch_charger_records`] this keeps rows with
/// missing coordinates: they can still match by name.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_known_sites(pool: &PgPool) -> Result<Vec<SiteFingerprint>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Option<String>, Option<f64>, Option<f64>)>(
        "SELECT name, latitude, longitude FROM chargers ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(name, latitude, longitude)| {
            SiteFingerprint::new(name.unwrap_or_default(), latitude, longitude)
        })
        .collect())
}

/// Total stored rows, usable or not.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_chargers(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chargers")
        .fetch_one(pool)
        .await
}
