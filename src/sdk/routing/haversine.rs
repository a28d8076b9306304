use super::error::RoutingError;
use super::service::DistanceMetric;
use crate::sdk::points::Point;
use std::future::Future;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
pub fn haversine_km(a: &Point, b: &Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // clamp guards asin against rounding just above 1.0 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn haversine_m(a: &Point, b: &Point) -> f64 {
    haversine_km(a, b) * 1000.0
}

/// Offline metric. Never fails and never waits on I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMetric;

impl DistanceMetric for HaversineMetric {
    fn distance_m(
        &self,
        from: &Point,
        to: &Point,
    ) -> impl Future<Output = Result<f64, RoutingError>> + Send {
        std::future::ready(Ok(haversine_m(from, to)))
    }

    fn name(&self) -> &'static str {
        "haversine"
    }
}
