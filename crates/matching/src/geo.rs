//! Great-circle distance between two coordinates.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Coordinates {
    /// Construct a coordinate pair.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other` in kilometres.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// Whether both components are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Haversine great-circle distance in kilometres.
///
/// Ellipsoid flattening is ignored. The result is symmetric in its two points
/// and exactly zero for identical points.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Distance between two optional locations; `None` if either is missing or invalid.
pub(crate) fn distance_between(a: Option<&Coordinates>, b: Option<&Coordinates>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) if a.is_valid() && b.is_valid() => Some(a.distance_to(b)),
        _ => None,
    }
}
