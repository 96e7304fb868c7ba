use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::corridor::RouteSegment;
use crate::kinds::{Amenity, ConnectorType, HighwayProximity, OnRoute};

/// Operator name used when a source does not report one.
pub const DEFAULT_NETWORK: &str = "Unknown";

/// Minimum rated power for a site to count as a corridor fast charger.
pub const FAST_CHARGE_THRESHOLD_KW: u32 = 150;

/// A stored charging site. Coordinates are always present; rows without
/// them are dropped before a record is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargerRecord {
    pub id: String,
    pub ocm_id: Option<i64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network: String,
    pub power_kw: u32,
    pub connector_types: BTreeSet<ConnectorType>,
    pub num_chargers: u32,
    pub highway_proximity: HighwayProximity,
    pub route_segment: RouteSegment,
    pub on_route: OnRoute,
    pub amenities: BTreeSet<Amenity>,
    pub notes: String,
    pub reliability: Option<f64>,
    pub status: Option<String>,
    pub country: Option<String>,
}

/// Query-time origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }

    #[must_use]
    pub fn labelled(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            label: Some(label.into()),
        }
    }
}

/// A ranking result. Both distances are rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargerWithDistance {
    #[serde(flatten)]
    pub charger: ChargerRecord,
    pub distance_km: f64,
    pub range_after_km: f64,
}

/// A normalized POI proposed for insertion by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargerCandidate {
    pub ocm_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub network: String,
    pub power_kw: u32,
    pub connector_types: BTreeSet<ConnectorType>,
    pub num_chargers: u32,
    pub route_segment: RouteSegment,
    pub country: String,
}
