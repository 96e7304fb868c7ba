//! Row type for the `chargers` table and its conversion to the domain record.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use echarger_core::charger::DEFAULT_NETWORK;
use echarger_core::kinds::{parse_amenities, parse_connector_types};
use echarger_core::{ChargerRecord, HighwayProximity, OnRoute, RouteSegment};

/// A row from the `chargers` table. Every domain column is nullable.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChargerRow {
    pub id: i64,
    pub public_id: Uuid,
    pub ocm_id: Option<i64>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub network: Option<String>,
    pub power_kw: Option<i32>,
    pub connector_types: Option<String>,
    pub num_chargers: Option<i32>,
    pub highway_proximity: Option<String>,
    pub route_segment: Option<String>,
    pub on_route: Option<String>,
    pub amenities: Option<String>,
    pub notes: Option<String>,
    pub reliability: Option<f64>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChargerRow {
    /// Converts the row into a [`ChargerRecord`], filling in defaults.
    ///
    /// Returns `None` when the name or either coordinate is missing or not
    /// a finite number; those rows can never be ranked.
    #[must_use]
    pub fn into_record(self) -> Option<ChargerRecord> {
        let name = self.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())?;
        let latitude = self.latitude.filter(|v| v.is_finite())?;
        let longitude = self.longitude.filter(|v| v.is_finite())?;

        Some(ChargerRecord {
            id: self.public_id.to_string(),
            ocm_id: self.ocm_id,
            name,
            latitude,
            longitude,
            network: self
                .network
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NETWORK.to_owned()),
            power_kw: self
                .power_kw
                .and_then(|kw| u32::try_from(kw).ok())
                .unwrap_or(0),
            connector_types: parse_connector_types(self.connector_types.as_deref().unwrap_or("")),
            num_chargers: self
                .num_chargers
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n >= 1)
                .unwrap_or(1),
            highway_proximity: HighwayProximity::parse(self.highway_proximity.as_deref()),
            route_segment: RouteSegment::parse_lenient(self.route_segment.as_deref()),
            on_route: OnRoute::parse(self.on_route.as_deref()),
            amenities: parse_amenities(self.amenities.as_deref().unwrap_or("")),
            notes: self.notes.unwrap_or_default(),
            reliability: self.reliability.filter(|r| r.is_finite()),
            status: self.status.filter(|s| !s.trim().is_empty()),
            country: self.country.filter(|c| !c.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use echarger_core::{Amenity, ConnectorType};

    use super::*;

    fn bare_row() -> ChargerRow {
        ChargerRow {
            id: 1,
            public_id: Uuid::nil(),
            ocm_id: None,
            name: Some("Fastned Breda".to_owned()),
            latitude: Some(51.5719),
            longitude: Some(4.7683),
            network: None,
            power_kw: None,
            connector_types: None,
            num_chargers: None,
            highway_proximity: None,
            route_segment: None,
            on_route: None,
            amenities: None,
            notes: None,
            reliability: None,
            status: None,
            country: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_fields_take_defaults() {
        let record = bare_row().into_record().expect("usable row");
        assert_eq!(record.id, Uuid::nil().to_string());
        assert_eq!(record.network, "Unknown");
        assert_eq!(record.power_kw, 0);
        assert_eq!(record.num_chargers, 1);
        assert_eq!(
            record.connector_types.into_iter().collect::<Vec<_>>(),
            vec![ConnectorType::Ccs]
        );
        assert_eq!(record.highway_proximity, HighwayProximity::Unknown);
        assert_eq!(record.route_segment, RouteSegment::Unknown);
        assert_eq!(record.on_route, OnRoute::No);
        assert!(record.amenities.is_empty());
        assert!(record.notes.is_empty());
    }

    #[test]
    fn populated_columns_are_parsed() {
        let mut row = bare_row();
        row.network = Some("Fastned".to_owned());
        row.power_kw = Some(300);
        row.connector_types = Some("CCS,CHAdeMO".to_owned());
        row.num_chargers = Some(8);
        row.highway_proximity = Some("at_exit".to_owned());
        row.route_segment = Some("NL-BE".to_owned());
        row.on_route = Some("yes".to_owned());
        row.amenities = Some("food,toilets".to_owned());
        row.reliability = Some(4.5);
        let record = row.into_record().expect("usable row");
        assert_eq!(record.power_kw, 300);
        assert_eq!(record.connector_types.len(), 2);
        assert_eq!(record.num_chargers, 8);
        assert_eq!(record.highway_proximity, HighwayProximity::AtExit);
        assert_eq!(record.route_segment, RouteSegment::NlBe);
        assert_eq!(record.on_route, OnRoute::Yes);
        assert!(record.amenities.contains(&Amenity::Toilets));
        assert_eq!(record.reliability, Some(4.5));
    }

    #[test]
    fn rows_without_position_or_name_are_dropped() {
        let mut row = bare_row();
        row.latitude = None;
        assert!(row.into_record().is_none());

        let mut row = bare_row();
        row.longitude = Some(f64::NAN);
        assert!(row.into_record().is_none());

        let mut row = bare_row();
        row.name = Some("  ".to_owned());
        assert!(row.into_record().is_none());
    }

    #[test]
    fn negative_counts_fall_back() {
        let mut row = bare_row();
        row.power_kw = Some(-5);
        row.num_chargers = Some(0);
        let record = row.into_record().expect("usable row");
        assert_eq!(record.power_kw, 0);
        assert_eq!(record.num_chargers, 1);
    }
}
