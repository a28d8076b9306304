use super::types::request_distance;
use crate::sdk::points::Point;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::service::DistanceMetric;
use crate::sdk::util::rate_limit::Limiter;
use reqwest::Client;
use std::time::Duration;

pub const ORS_BASE_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_PROFILE: &str = "driving-car";

/// Hosted OpenRouteService directions, keyed and rate limited.
pub struct RemoteOrsProvider {
    client: Client,
    api_key: String,
    directions_url: String,
    limiter: Limiter,
}

impl RemoteOrsProvider {
    pub fn new(
        api_key: String,
        base_url: &str,
        profile: &str,
        limiter: Limiter,
    ) -> Result<Self, RoutingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()?,
            api_key,
            directions_url: format!(
                "{}/v2/directions/{}",
                base_url.trim_end_matches('/'),
                profile
            ),
            limiter,
        })
    }
}

impl DistanceMetric for RemoteOrsProvider {
    async fn distance_m(&self, from: &Point, to: &Point) -> Result<f64, RoutingError> {
        if from.same_location(to) {
            log::debug!("Start and end coordinates are identical. Returning zero distance.");
            return Ok(0.0);
        }

        self.limiter.until_ready().await;
        log::debug!(
            "[PROVIDER] Calling remote directions for {:?} -> {:?}",
            from.lon_lat(),
            to.lon_lat()
        );
        request_distance(
            &self.client,
            &self.directions_url,
            Some(&self.api_key),
            from,
            to,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "ors-remote"
    }

    fn cache_scope(&self) -> String {
        format!("{} {}", self.name(), self.directions_url)
    }
}
