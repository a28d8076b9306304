pub mod sdk;

pub use sdk::config::{OrsBackend, OrsConfig};
pub use sdk::points::{load_points, Point, PointKind};
pub use sdk::routing::{DistanceMetric, HaversineMetric, RoutingError, TourError};
pub use sdk::tour::{build_tour_haversine, Anchor, Tour, TourBuilder};
