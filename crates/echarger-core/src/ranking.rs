//! Reachable-charger ranking.
//!
//! Given a charger set, an origin and the remaining range, keep the chargers
//! that can be reached with the safety margin intact, nearest first, capped
//! at the result limit. Filtering and ordering use raw distances; the output
//! fields are rounded to one decimal afterwards.

use crate::charger::{ChargerRecord, ChargerWithDistance, Location};
use crate::geo::{haversine_km, round_to_tenth};

/// Straight-line slack kept in reserve for road detours.
pub const SAFETY_MARGIN_KM: f64 = 10.0;

/// Shortlist size when the caller does not ask for one.
pub const DEFAULT_RESULT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub location: Location,
    pub remaining_range_km: f64,
    pub result_limit: usize,
    pub safety_margin_km: f64,
    pub on_route_only: bool,
}

impl RangeQuery {
    #[must_use]
    pub fn new(location: Location, remaining_range_km: f64) -> Self {
        Self {
            location,
            remaining_range_km,
            result_limit: DEFAULT_RESULT_LIMIT,
            safety_margin_km: SAFETY_MARGIN_KM,
            on_route_only: false,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    #[must_use]
    pub fn with_safety_margin(mut self, safety_margin_km: f64) -> Self {
        self.safety_margin_km = safety_margin_km;
        self
    }

    #[must_use]
    pub fn on_route_only(mut self, on_route_only: bool) -> Self {
        self.on_route_only = on_route_only;
        self
    }
}

/// Rank the chargers reachable from `query.location`.
///
/// A charger is admitted when its distance is at most
/// `remaining_range_km - safety_margin_km` and the range left on arrival is
/// non-negative. Results are sorted by ascending distance; equal distances
/// keep their input order. An empty result is a normal outcome.
#[must_use]
pub fn rank_reachable(chargers: &[ChargerRecord], query: &RangeQuery) -> Vec<ChargerWithDistance> {
    if query.result_limit == 0 {
        return Vec::new();
    }

    let max_distance = query.remaining_range_km - query.safety_margin_km;
    let origin = &query.location;

    let mut reachable: Vec<(f64, &ChargerRecord)> = chargers
        .iter()
        .filter(|charger| !query.on_route_only || charger.on_route.is_on_corridor())
        .map(|charger| {
            let distance = haversine_km(
                origin.latitude,
                origin.longitude,
                charger.latitude,
                charger.longitude,
            );
            (distance, charger)
        })
        .filter(|(distance, _)| {
            *distance <= max_distance && query.remaining_range_km - *distance >= 0.0
        })
        .collect();

    reachable.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    reachable.truncate(query.result_limit);

    reachable
        .into_iter()
        .map(|(distance, charger)| ChargerWithDistance {
            charger: charger.clone(),
            distance_km: round_to_tenth(distance),
            range_after_km: round_to_tenth(query.remaining_range_km - distance),
        })
        .collect()
}
