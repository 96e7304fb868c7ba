//! Domain types and pure logic for the corridor charger finder.

pub mod app_config;
pub mod charger;
pub mod config;
pub mod corridor;
pub mod dedup;
pub mod geo;
pub mod kinds;
pub mod ranking;

pub use app_config::{AppConfig, Environment};
pub use charger::{ChargerCandidate, ChargerRecord, ChargerWithDistance, Location};
pub use config::{load_app_config, load_app_config_from_env};
pub use corridor::{
    find_waypoint, BoundingBox, ParseSegmentError, RouteSegment, SegmentInfo, Waypoint, SEGMENTS,
    WAYPOINTS,
};
pub use dedup::{is_duplicate, SiteFingerprint};
pub use geo::haversine_km;
pub use kinds::{Amenity, ConnectorType, HighwayProximity, OnRoute};
pub use ranking::{rank_reachable, RangeQuery};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
