use super::error::RoutingError;
use crate::sdk::points::Point;
use std::future::Future;

pub trait DistanceMetric: Send + Sync {
    /// Travel cost from `from` to `to` in meters. Need not be symmetric.
    fn distance_m(
        &self,
        from: &Point,
        to: &Point,
    ) -> impl Future<Output = Result<f64, RoutingError>> + Send;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Identifies the source of the distances when they are cached. Two
    /// metrics that can disagree on a pair must return different scopes.
    fn cache_scope(&self) -> String {
        self.name().to_string()
    }
}
