//! Great-circle distance and bounding-box math shared by every provider.

const EARTH_RADIUS_NM: f64 = 3440.065;

/// Great-circle distance between two points in nautical miles.
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_NM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Nautical miles to degrees of latitude.
pub fn nm_to_degrees_lat(nm: f64) -> f64 {
    nm / 60.0
}

/// Nautical miles to degrees of longitude at the given latitude.
///
/// cos(lat) is clamped away from zero so a radius near the poles
/// widens to the full circle instead of dividing by zero.
pub fn nm_to_degrees_lon(nm: f64, lat: f64) -> f64 {
    let cos_lat = lat.to_radians().cos().abs().max(1e-6);
    nm / (60.0 * cos_lat)
}

/// Query bounding box in degrees, for providers that accept one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Box of `radius_nm` around an observer position.
    pub fn around(lat: f64, lon: f64, radius_nm: f64) -> Self {
        let dlat = nm_to_degrees_lat(radius_nm);
        let dlon = nm_to_degrees_lon(radius_nm, lat);
        BoundingBox {
            lat_min: lat - dlat,
            lat_max: lat + dlat,
            lon_min: lon - dlon,
            lon_max: lon + dlon,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
