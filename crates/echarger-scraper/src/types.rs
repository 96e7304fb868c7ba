//! OpenChargeMap `GET /v3/poi` response types.
//!
//! Only the fields the importer reads are modelled. OCM omits or nulls
//! most of them freely, so nearly everything is optional. Field names are
//! PascalCase on the wire; the ones with acronyms (`ID`, `PowerKW`,
//! `ConnectionTypeID`) are renamed explicitly.

use serde::Deserialize;

/// One point of interest (a charging site).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcmPoi {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(default)]
    pub address_info: Option<OcmAddressInfo>,
    #[serde(default)]
    pub operator_info: Option<OcmOperatorInfo>,
    #[serde(default)]
    pub connections: Option<Vec<OcmConnection>>,
    #[serde(default)]
    pub number_of_points: Option<u32>,
}

impl OcmPoi {
    /// Connections, treating a null list as empty.
    #[must_use]
    pub fn connections(&self) -> &[OcmConnection] {
        self.connections.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcmAddressInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcmOperatorInfo {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcmConnection {
    #[serde(rename = "PowerKW", default)]
    pub power_kw: Option<f64>,
    #[serde(rename = "ConnectionTypeID", default)]
    pub connection_type_id: Option<i64>,
}
