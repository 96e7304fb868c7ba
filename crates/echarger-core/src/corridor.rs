//! The fixed Rotterdam ↔ Santa Pola corridor.
//!
//! Nine named segments, each with the motorway it follows, the bounding box
//! the importer sweeps, and the country code stamped on imported sites.
//! Segment ids are the strings stored in `chargers.route_segment`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Corridor segment a charger belongs to, north to south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteSegment {
    #[serde(rename = "NL-BE")]
    NlBe,
    #[serde(rename = "BE-FR")]
    BeFr,
    #[serde(rename = "FR-Paris")]
    FrParis,
    #[serde(rename = "Paris-Orleans")]
    ParisOrleans,
    #[serde(rename = "Orleans-Clermont")]
    OrleansClermont,
    #[serde(rename = "Clermont-Millau")]
    ClermontMillau,
    #[serde(rename = "Millau-ES")]
    MillauEs,
    #[serde(rename = "ES-Valencia")]
    EsValencia,
    #[serde(rename = "Valencia-SantaPola")]
    ValenciaSantaPola,
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

impl RouteSegment {
    /// All named segments in corridor order. Excludes [`RouteSegment::Unknown`].
    pub const ALL: [RouteSegment; 9] = [
        RouteSegment::NlBe,
        RouteSegment::BeFr,
        RouteSegment::FrParis,
        RouteSegment::ParisOrleans,
        RouteSegment::OrleansClermont,
        RouteSegment::ClermontMillau,
        RouteSegment::MillauEs,
        RouteSegment::EsValencia,
        RouteSegment::ValenciaSantaPola,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RouteSegment::NlBe => "NL-BE",
            RouteSegment::BeFr => "BE-FR",
            RouteSegment::FrParis => "FR-Paris",
            RouteSegment::ParisOrleans => "Paris-Orleans",
            RouteSegment::OrleansClermont => "Orleans-Clermont",
            RouteSegment::ClermontMillau => "Clermont-Millau",
            RouteSegment::MillauEs => "Millau-ES",
            RouteSegment::EsValencia => "ES-Valencia",
            RouteSegment::ValenciaSantaPola => "Valencia-SantaPola",
            RouteSegment::Unknown => "unknown",
        }
    }

    /// Lenient parse for stored values: anything unrecognised is `Unknown`.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok())
            .unwrap_or(RouteSegment::Unknown)
    }

    /// Static metadata for a named segment; `None` for `Unknown`.
    #[must_use]
    pub fn info(self) -> Option<&'static SegmentInfo> {
        SEGMENTS.iter().find(|info| info.segment == self)
    }
}

impl std::fmt::Display for RouteSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route segment \"{0}\"")]
pub struct ParseSegmentError(pub String);

impl FromStr for RouteSegment {
    type Err = ParseSegmentError;

    /// Strict parse used at API and CLI boundaries. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RouteSegment::ALL
            .into_iter()
            .find(|segment| segment.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseSegmentError(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Inclusive on every edge.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentInfo {
    pub segment: RouteSegment,
    pub name: &'static str,
    pub highway: &'static str,
    pub bbox: BoundingBox,
    /// ISO 3166-1 alpha-2 code stamped on sites imported from this segment.
    pub country: &'static str,
}

pub static SEGMENTS: [SegmentInfo; 9] = [
    SegmentInfo {
        segment: RouteSegment::NlBe,
        name: "Rotterdam - Belgium",
        highway: "A16 / E19",
        bbox: BoundingBox {
            min_lat: 51.4,
            max_lat: 52.0,
            min_lng: 4.0,
            max_lng: 5.0,
        },
        country: "NL",
    },
    SegmentInfo {
        segment: RouteSegment::BeFr,
        name: "Belgium - France",
        highway: "E19 / A2",
        bbox: BoundingBox {
            min_lat: 49.5,
            max_lat: 51.4,
            min_lng: 3.0,
            max_lng: 5.0,
        },
        country: "BE",
    },
    SegmentInfo {
        segment: RouteSegment::FrParis,
        name: "France - Paris",
        highway: "A1 / A104",
        bbox: BoundingBox {
            min_lat: 48.5,
            max_lat: 49.5,
            min_lng: 2.0,
            max_lng: 4.5,
        },
        country: "FR",
    },
    SegmentInfo {
        segment: RouteSegment::ParisOrleans,
        name: "Paris - Orleans",
        highway: "A10",
        bbox: BoundingBox {
            min_lat: 47.5,
            max_lat: 48.5,
            min_lng: 1.5,
            max_lng: 3.0,
        },
        country: "FR",
    },
    SegmentInfo {
        segment: RouteSegment::OrleansClermont,
        name: "Orleans - Clermont",
        highway: "A71",
        bbox: BoundingBox {
            min_lat: 46.0,
            max_lat: 47.5,
            min_lng: 2.0,
            max_lng: 3.5,
        },
        country: "FR",
    },
    SegmentInfo {
        segment: RouteSegment::ClermontMillau,
        name: "Clermont - Millau",
        highway: "A75",
        bbox: BoundingBox {
            min_lat: 44.0,
            max_lat: 46.0,
            min_lng: 2.5,
            max_lng: 3.5,
        },
        country: "FR",
    },
    SegmentInfo {
        segment: RouteSegment::MillauEs,
        name: "Millau - Spain",
        highway: "A75 / A9",
        bbox: BoundingBox {
            min_lat: 42.3,
            max_lat: 44.0,
            min_lng: 2.5,
            max_lng: 3.5,
        },
        country: "FR",
    },
    SegmentInfo {
        segment: RouteSegment::EsValencia,
        name: "Spain - Valencia",
        highway: "AP-7 / A-7",
        bbox: BoundingBox {
            min_lat: 39.0,
            max_lat: 42.5,
            min_lng: -0.5,
            max_lng: 3.0,
        },
        country: "ES",
    },
    SegmentInfo {
        segment: RouteSegment::ValenciaSantaPola,
        name: "Valencia - Santa Pola",
        highway: "A-7",
        bbox: BoundingBox {
            min_lat: 38.0,
            max_lat: 39.5,
            min_lng: -1.0,
            max_lng: 0.5,
        },
        country: "ES",
    },
];

/// A named preset search origin along the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Cities along the corridor, north to south.
pub const WAYPOINTS: &[Waypoint] = &[
    Waypoint {
        name: "Rotterdam",
        latitude: 51.924_4,
        longitude: 4.477_7,
    },
    Waypoint {
        name: "Breda",
        latitude: 51.571_9,
        longitude: 4.768_3,
    },
    Waypoint {
        name: "Antwerp",
        latitude: 51.219_4,
        longitude: 4.402_5,
    },
    Waypoint {
        name: "Brussels",
        latitude: 50.850_3,
        longitude: 4.351_7,
    },
    Waypoint {
        name: "Paris",
        latitude: 48.856_6,
        longitude: 2.352_2,
    },
    Waypoint {
        name: "Orleans",
        latitude: 47.902_9,
        longitude: 1.909_2,
    },
    Waypoint {
        name: "Clermont-Ferrand",
        latitude: 45.777_2,
        longitude: 3.087_0,
    },
    Waypoint {
        name: "Millau",
        latitude: 44.096_9,
        longitude: 3.083_3,
    },
    Waypoint {
        name: "Montpellier",
        latitude: 43.610_8,
        longitude: 3.876_7,
    },
    Waypoint {
        name: "Perpignan",
        latitude: 42.688_7,
        longitude: 2.894_8,
    },
    Waypoint {
        name: "Barcelona",
        latitude: 41.385_1,
        longitude: 2.173_4,
    },
    Waypoint {
        name: "Valencia",
        latitude: 39.469_9,
        longitude: -0.376_3,
    },
    Waypoint {
        name: "Alicante",
        latitude: 38.345_2,
        longitude: -0.481_5,
    },
    Waypoint {
        name: "Santa Pola",
        latitude: 38.191_1,
        longitude: -0.556_6,
    },
];

/// Look up a waypoint by name, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_waypoint(name: &str) -> Option<&'static Waypoint> {
    let wanted = name.trim();
    WAYPOINTS
        .iter()
        .find(|wp| wp.name.eq_ignore_ascii_case(wanted))
}
