use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use echarger_core::{
    find_waypoint, rank_reachable, ChargerRecord, ChargerWithDistance, Location, RangeQuery,
    RouteSegment,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{load_chargers, ApiError, ApiResponse, AppState, ResponseMeta};

/// Upper bound on `range_km`; no car on the corridor gets further on a charge.
pub(super) const MAX_RANGE_KM: f64 = 400.0;
/// Upper bound on `limit`.
pub(super) const MAX_RESULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub(super) struct ChargerListQuery {
    pub segment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChargerListData {
    chargers: Vec<ChargerRecord>,
    count: usize,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ReachableQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub city: Option<String>,
    pub range_km: Option<f64>,
    pub limit: Option<i64>,
    pub on_route_only: Option<bool>,
    pub segment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ReachableData {
    origin: Location,
    range_km: f64,
    safety_margin_km: f64,
    chargers: Vec<ChargerWithDistance>,
    stale: bool,
    fetched_at: DateTime<Utc>,
}

/// A validated reachable-charger search.
#[derive(Debug)]
pub(super) struct ReachableSearch {
    pub query: RangeQuery,
    pub segment: Option<RouteSegment>,
}

fn parse_segment(raw: Option<&str>) -> Result<Option<RouteSegment>, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse().map(Some).map_err(|e| format!("{e}")),
        None => Ok(None),
    }
}

fn resolve_origin(query: &ReachableQuery) -> Result<Location, String> {
    let city = query.city.as_deref().map(str::trim).filter(|s| !s.is_empty());

    match (city, query.lat, query.lng) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
            Err("provide either city or lat/lng, not both".to_string())
        }
        (Some(city), None, None) => find_waypoint(city)
            .map(|wp| Location::labelled(wp.latitude, wp.longitude, wp.name))
            .ok_or_else(|| format!("unknown city \"{city}\"")),
        (None, Some(lat), Some(lng)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err("lat must be between -90 and 90".to_string());
            }
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err("lng must be between -180 and 180".to_string());
            }
            Ok(Location::new(lat, lng))
        }
        (None, _, _) => Err("provide city or both lat and lng".to_string()),
    }
}

/// Negative limits mean "nothing"; large ones are capped.
pub(super) fn normalize_limit(limit: Option<i64>, default_limit: usize) -> usize {
    match limit {
        None => default_limit.min(MAX_RESULT_LIMIT),
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n)
            .unwrap_or(MAX_RESULT_LIMIT)
            .min(MAX_RESULT_LIMIT),
    }
}

pub(super) fn validate_reachable(
    query: &ReachableQuery,
    default_limit: usize,
    safety_margin_km: f64,
) -> Result<ReachableSearch, String> {
    let origin = resolve_origin(query)?;

    let range_km = query
        .range_km
        .ok_or_else(|| "range_km is required".to_string())?;
    if !range_km.is_finite() || range_km < 0.0 || range_km > MAX_RANGE_KM {
        return Err(format!("range_km must be between 0 and {MAX_RANGE_KM}"));
    }

    let segment = parse_segment(query.segment.as_deref())?;

    let query = RangeQuery::new(origin, range_km)
        .with_limit(normalize_limit(query.limit, default_limit))
        .with_safety_margin(safety_margin_km)
        .on_route_only(query.on_route_only.unwrap_or(false));

    Ok(ReachableSearch { query, segment })
}

pub(super) async fn list_chargers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ChargerListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ChargerListData>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;
    let segment = parse_segment(query.segment.as_deref())
        .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;

    let snapshot = load_chargers(&state, &req_id.0).await?;

    let chargers: Vec<ChargerRecord> = snapshot
        .records
        .iter()
        .filter(|c| segment.is_none_or(|s| c.route_segment == s))
        .cloned()
        .collect();

    Ok(Json(ApiResponse {
        data: ChargerListData {
            count: chargers.len(),
            chargers,
            stale: snapshot.stale,
            fetched_at: snapshot.fetched_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_reachable_chargers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ReachableQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ReachableData>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(req_id.0.clone(), e.body_text()))?;
    let search = validate_reachable(
        &query,
        state.config.default_result_limit,
        state.config.safety_margin_km,
    )
    .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;

    let snapshot = load_chargers(&state, &req_id.0).await?;

    let chargers = match search.segment {
        Some(segment) => {
            let in_segment: Vec<ChargerRecord> = snapshot
                .records
                .iter()
                .filter(|c| c.route_segment == segment)
                .cloned()
                .collect();
            rank_reachable(&in_segment, &search.query)
        }
        None => rank_reachable(&snapshot.records, &search.query),
    };

    tracing::debug!(
        lat = search.query.location.latitude,
        lng = search.query.location.longitude,
        range_km = search.query.remaining_range_km,
        found = chargers.len(),
        "reachable charger search"
    );

    Ok(Json(ApiResponse {
        data: ReachableData {
            origin: search.query.location,
            range_km: search.query.remaining_range_km,
            safety_margin_km: search.query.safety_margin_km,
            chargers,
            stale: snapshot.stale,
            fetched_at: snapshot.fetched_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
