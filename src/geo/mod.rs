use async_trait::async_trait;

use crate::models::driver::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Great-circle distance rounded to two decimals, the precision used for
/// filtering, scoring and the audit trail.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (haversine_km(a, b) * 100.0).round() / 100.0
}

/// Resolves a free-text address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve_address(&self, address: &str) -> Option<GeoPoint>;
}

/// Resolves every address to the same point. Stands in until a real
/// geocoding service is wired up.
#[derive(Debug, Clone)]
pub struct FixedPointGeocoder {
    point: GeoPoint,
}

impl FixedPointGeocoder {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

impl Default for FixedPointGeocoder {
    fn default() -> Self {
        Self::new(GeoPoint::NAIROBI_CBD)
    }
}

#[async_trait]
impl Geocoder for FixedPointGeocoder {
    async fn resolve_address(&self, _address: &str) -> Option<GeoPoint> {
        Some(self.point)
    }
}
