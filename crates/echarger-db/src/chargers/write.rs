//! Write operations for the `chargers` table.

use sqlx::PgPool;

use echarger_core::kinds::join_list;
use echarger_core::{ChargerCandidate, ConnectorType};

/// Highway proximity recorded for imported sites until someone checks them.
pub const IMPORT_HIGHWAY_PROXIMITY: &str = "near_exit";
/// Verification status of an imported site.
pub const IMPORT_STATUS: &str = "untested";
pub const IMPORT_NOTES: &str = "Auto-imported from OpenChargeMap. Needs verification.";

/// Insert `candidates` in one round-trip and return how many rows were
/// actually written.
///
/// Candidates whose `ocm_id` is already stored are skipped by the partial
/// unique index (`ON CONFLICT DO NOTHING`), so re-running an import is safe.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn insert_charger_candidates(
    pool: &PgPool,
    candidates: &[ChargerCandidate],
) -> Result<u64, sqlx::Error> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let mut ocm_ids: Vec<i64> = Vec::with_capacity(candidates.len());
    let mut names: Vec<String> = Vec::with_capacity(candidates.len());
    let mut latitudes: Vec<f64> = Vec::with_capacity(candidates.len());
    let mut longitudes: Vec<f64> = Vec::with_capacity(candidates.len());
    let mut networks: Vec<String> = Vec::with_capacity(candidates.len());
    let mut powers: Vec<i32> = Vec::with_capacity(candidates.len());
    let mut connectors: Vec<String> = Vec::with_capacity(candidates.len());
    let mut counts: Vec<i32> = Vec::with_capacity(candidates.len());
    let mut segments: Vec<String> = Vec::with_capacity(candidates.len());
    let mut countries: Vec<String> = Vec::with_capacity(candidates.len());

    for c in candidates {
        ocm_ids.push(c.ocm_id);
        names.push(c.name.clone());
        latitudes.push(c.latitude);
        longitudes.push(c.longitude);
        networks.push(c.network.clone());
        powers.push(i32::try_from(c.power_kw).unwrap_or(i32::MAX));
        connectors.push(join_list(
            c.connector_types.iter().copied(),
            ConnectorType::as_str,
        ));
        counts.push(i32::try_from(c.num_chargers).unwrap_or(i32::MAX));
        segments.push(c.route_segment.as_str().to_owned());
        countries.push(c.country.clone());
    }

    let inserted: Vec<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO chargers \
             (ocm_id, name, latitude, longitude, network, power_kw, connector_types, \
              num_chargers, route_segment, country, \
              highway_proximity, status, notes) \
         SELECT u.*, $11, $12, $13 FROM UNNEST(\
              $1::int8[], $2::text[], $3::float8[], $4::float8[], $5::text[], $6::int4[], \
              $7::text[], $8::int4[], $9::text[], $10::text[]) AS u \
         ON CONFLICT (ocm_id) WHERE ocm_id IS NOT NULL DO NOTHING \
         RETURNING id",
    )
    .bind(&ocm_ids)
    .bind(&names)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&networks)
    .bind(&powers)
    .bind(&connectors)
    .bind(&counts)
    .bind(&segments)
    .bind(&countries)
    .bind(IMPORT_HIGHWAY_PROXIMITY)
    .bind(IMPORT_STATUS)
    .bind(IMPORT_NOTES)
    .fetch_all(pool)
    .await?;

    Ok(inserted.len() as u64)
}
