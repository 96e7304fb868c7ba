//! Conversion from OpenChargeMap POIs to [`ChargerCandidate`]s.

use std::collections::BTreeSet;

use echarger_core::charger::DEFAULT_NETWORK;
use echarger_core::{ChargerCandidate, ConnectorType, SegmentInfo};

use crate::error::ScraperError;
use crate::types::{OcmConnection, OcmPoi};

/// OCM connection type ids for CCS (Type 1 and Type 2 combo).
const OCM_CCS_TYPE_IDS: [i64; 2] = [32, 33];
/// OCM connection type id for CHAdeMO.
const OCM_CHADEMO_TYPE_ID: i64 = 2;

/// Highest rated power across `connections`, in kW. Missing ratings count
/// as zero and an empty list gives zero.
#[must_use]
pub fn max_power_kw(connections: &[OcmConnection]) -> f64 {
    connections
        .iter()
        .map(|c| c.power_kw.unwrap_or(0.0))
        .filter(|kw| kw.is_finite())
        .fold(0.0, f64::max)
}

/// Connector families offered by `connections`. Falls back to `{CCS}` when
/// none of the type ids is recognised.
#[must_use]
pub fn connector_types(connections: &[OcmConnection]) -> BTreeSet<ConnectorType> {
    let mut types: BTreeSet<ConnectorType> = connections
        .iter()
        .filter_map(|c| match c.connection_type_id {
            Some(id) if OCM_CCS_TYPE_IDS.contains(&id) => Some(ConnectorType::Ccs),
            Some(OCM_CHADEMO_TYPE_ID) => Some(ConnectorType::Chademo),
            _ => None,
        })
        .collect();
    if types.is_empty() {
        types.insert(ConnectorType::Ccs);
    }
    types
}

/// Normalizes `poi` into a candidate tagged with `segment`'s id and country.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when the POI has no usable
/// title or coordinates.
pub fn normalize_poi(poi: &OcmPoi, segment: &SegmentInfo) -> Result<ChargerCandidate, ScraperError> {
    let invalid = |reason: &str| ScraperError::Normalization {
        ocm_id: poi.id,
        reason: reason.to_owned(),
    };

    let address = poi
        .address_info
        .as_ref()
        .ok_or_else(|| invalid("missing AddressInfo"))?;
    let name = address
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid("missing site title"))?;
    let (Some(latitude), Some(longitude)) = (address.latitude, address.longitude) else {
        return Err(invalid("missing coordinates"));
    };

    let network = poi
        .operator_info
        .as_ref()
        .and_then(|o| o.title.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_NETWORK);

    Ok(ChargerCandidate {
        ocm_id: poi.id,
        name: name.to_owned(),
        latitude,
        longitude,
        network: network.to_owned(),
        power_kw: whole_kw(max_power_kw(poi.connections())),
        connector_types: connector_types(poi.connections()),
        num_chargers: poi.number_of_points.filter(|n| *n > 0).unwrap_or(1),
        route_segment: segment.segment,
        country: segment.country.to_owned(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_kw(kw: f64) -> u32 {
    kw.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
