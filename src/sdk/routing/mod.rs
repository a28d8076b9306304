pub mod cache;
pub mod error;
pub mod fallback;
pub mod haversine;
pub mod provider;
pub mod service;

pub use cache::{CachedMetric, DistanceCache, PairKey};
pub use error::{RoutingError, TourError};
pub use fallback::{measure_with_fallback, LegSource, Measured};
pub use haversine::{haversine_km, haversine_m, HaversineMetric};
pub use provider::{LocalOrsProvider, RemoteOrsProvider};
pub use service::DistanceMetric;
