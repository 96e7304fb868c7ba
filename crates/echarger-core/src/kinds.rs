//! Closed enumerations for the loosely-typed charger columns.
//!
//! Stored values are free text. Every parser here is lenient: matching is
//! case-insensitive and anything unrecognised lands in the explicit
//! unknown/other variant instead of failing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Physical connector family offered at a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "CCS")]
    Ccs,
    #[serde(rename = "CHAdeMO")]
    Chademo,
    #[serde(rename = "Type2")]
    Type2,
    #[serde(rename = "Tesla")]
    Tesla,
    #[serde(rename = "other")]
    #[serde(other)]
    Other,
}

impl ConnectorType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorType::Ccs => "CCS",
            ConnectorType::Chademo => "CHAdeMO",
            ConnectorType::Type2 => "Type2",
            ConnectorType::Tesla => "Tesla",
            ConnectorType::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ccs" | "ccs2" | "ccs combo" | "ccs (type 2)" => ConnectorType::Ccs,
            "chademo" => ConnectorType::Chademo,
            "type2" | "type 2" | "mennekes" => ConnectorType::Type2,
            "tesla" | "nacs" => ConnectorType::Tesla,
            _ => ConnectorType::Other,
        }
    }
}

impl std::fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated connector column into a non-empty set.
///
/// An empty column yields `{CCS}`, the same default the importer writes
/// when a provider lists no recognised connector.
#[must_use]
pub fn parse_connector_types(raw: &str) -> BTreeSet<ConnectorType> {
    let mut set: BTreeSet<ConnectorType> = split_list(raw).map(ConnectorType::parse).collect();
    if set.is_empty() {
        set.insert(ConnectorType::Ccs);
    }
    set
}

/// Facilities available at or next to a charging site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Food,
    Toilets,
    Coffee,
    Shop,
    Seating,
    Wifi,
    Hotel,
    #[serde(other)]
    Other,
}

impl Amenity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Amenity::Food => "food",
            Amenity::Toilets => "toilets",
            Amenity::Coffee => "coffee",
            Amenity::Shop => "shop",
            Amenity::Seating => "seating",
            Amenity::Wifi => "wifi",
            Amenity::Hotel => "hotel",
            Amenity::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "food" | "restaurant" => Amenity::Food,
            "toilets" | "toilet" | "wc" => Amenity::Toilets,
            "coffee" | "cafe" => Amenity::Coffee,
            "shop" | "store" => Amenity::Shop,
            "seating" => Amenity::Seating,
            "wifi" | "wi-fi" => Amenity::Wifi,
            "hotel" => Amenity::Hotel,
            _ => Amenity::Other,
        }
    }
}

/// Parse a comma-separated amenities column. Empty input gives an empty set.
#[must_use]
pub fn parse_amenities(raw: &str) -> BTreeSet<Amenity> {
    split_list(raw).map(Amenity::parse).collect()
}

/// How far a site sits from the motorway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighwayProximity {
    #[serde(rename = "at_exit")]
    AtExit,
    #[serde(rename = "near_exit")]
    NearExit,
    #[serde(rename = "town")]
    InTown,
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

impl HighwayProximity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HighwayProximity::AtExit => "at_exit",
            HighwayProximity::NearExit => "near_exit",
            HighwayProximity::InTown => "town",
            HighwayProximity::Unknown => "unknown",
        }
    }

    /// Missing and unrecognised values both map to [`HighwayProximity::Unknown`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return HighwayProximity::Unknown;
        };
        match raw.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "at_exit" => HighwayProximity::AtExit,
            "near_exit" => HighwayProximity::NearExit,
            "town" | "in_town" => HighwayProximity::InTown,
            _ => HighwayProximity::Unknown,
        }
    }
}

/// Confidence that a site lies directly on the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnRoute {
    Yes,
    No,
    Nearby,
    #[serde(other)]
    Unknown,
}

impl OnRoute {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OnRoute::Yes => "yes",
            OnRoute::No => "no",
            OnRoute::Nearby => "nearby",
            OnRoute::Unknown => "unknown",
        }
    }

    /// A missing tag means `no`; an unrecognised one means `unknown`.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return OnRoute::No;
        };
        match raw.to_ascii_lowercase().as_str() {
            "yes" => OnRoute::Yes,
            "no" => OnRoute::No,
            "nearby" => OnRoute::Nearby,
            _ => OnRoute::Unknown,
        }
    }

    /// `true` for tags admitted by the on-route-only search switch.
    #[must_use]
    pub fn is_on_corridor(self) -> bool {
        matches!(self, OnRoute::Yes | OnRoute::Nearby)
    }
}

/// Join a set back into the comma-separated storage form.
#[must_use]
pub fn join_list<T, I>(items: I, as_str: fn(T) -> &'static str) -> String
where
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(as_str).collect::<Vec<_>>().join(",")
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
