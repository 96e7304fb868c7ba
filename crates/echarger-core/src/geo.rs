//! Great-circle distance on a spherical Earth.

/// Mean Earth radius used by every distance in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two WGS84 points.
///
/// Never panics. The haversine term is clamped to `[0, 1]` so rounding at
/// antipodal or identical points cannot produce `NaN` through `sqrt`.
#[must_use]
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round half away from zero to one decimal place.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
