use super::types::request_distance;
use crate::sdk::points::Point;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::service::DistanceMetric;
use reqwest::Client;
use std::time::Duration;

/// Self-hosted ORS instance: no API key and no rate limit.
pub struct LocalOrsProvider {
    client: Client,
    directions_url: String,
}

impl LocalOrsProvider {
    pub fn new(base_url: &str, profile: &str) -> Result<Self, RoutingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()?,
            directions_url: format!(
                "{}/v2/directions/{}",
                base_url.trim_end_matches('/'),
                profile
            ),
        })
    }
}

impl DistanceMetric for LocalOrsProvider {
    async fn distance_m(&self, from: &Point, to: &Point) -> Result<f64, RoutingError> {
        if from.same_location(to) {
            return Ok(0.0);
        }

        log::debug!(
            "[PROVIDER] Calling local directions for {:?} -> {:?}",
            from.lon_lat(),
            to.lon_lat()
        );
        request_distance(&self.client, &self.directions_url, None, from, to).await
    }

    fn name(&self) -> &'static str {
        "ors-local"
    }

    fn cache_scope(&self) -> String {
        format!("{} {}", self.name(), self.directions_url)
    }
}
