use crate::sdk::points::Point;
use crate::sdk::routing::error::{OrsErrorPayload, RoutingError, ORS_UNROUTABLE_CODE};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

// --- Data Structures for parsing ORS responses ---

#[derive(Deserialize)]
pub struct DirectionsResponse {
    pub routes: Vec<Route>,
}
#[derive(Deserialize)]
pub struct Route {
    pub summary: DirectionsSummary,
}
// ORS leaves `distance` out of the summary for zero-length routes
#[derive(Deserialize, Clone, Copy)]
pub struct DirectionsSummary {
    #[serde(default)]
    pub distance: f64,
}

/// Sends one directions request and returns the route length in meters.
pub(super) async fn request_distance(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    from: &Point,
    to: &Point,
) -> Result<f64, RoutingError> {
    let body = json!({ "coordinates": [from.lon_lat(), to.lon_lat()] });

    let mut request = client.post(url).json(&body);
    if let Some(key) = api_key {
        request = request.header("Authorization", key);
    }

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            log::error!("Failed to send POST request. URL: {}\nError: {}", url, e);
            return Err(RoutingError::RequestError(e));
        }
    };

    let status = response.status();
    let text = response.text().await?;
    parse_directions_response(status, &text, url)
}

pub fn parse_directions_response(
    status: StatusCode,
    text: &str,
    url: &str,
) -> Result<f64, RoutingError> {
    if !status.is_success() {
        // Try to parse the structured error first
        if let Ok(payload) = serde_json::from_str::<OrsErrorPayload>(text) {
            if payload.error.code == ORS_UNROUTABLE_CODE {
                return Err(RoutingError::UnroutablePoint);
            }
            return Err(RoutingError::ApiError {
                code: payload.error.code,
                message: payload.error.message,
            });
        }
        log::error!(
            "API returned non-success status: {}. Unparseable Body: {}",
            status,
            text
        );
        return Err(RoutingError::RawApiError(text.to_string()));
    }

    let route_response: DirectionsResponse = serde_json::from_str(text).map_err(|e| {
        log::error!(
            "Failed to parse DirectionsResponse. URL: {}\nError: {}. Body: {}",
            url,
            e,
            text
        );
        e
    })?;

    let distance = route_response
        .routes
        .first()
        .ok_or_else(|| RoutingError::Generic("No route found in success response".to_string()))?
        .summary
        .distance;

    if !distance.is_finite() || distance < 0.0 {
        return Err(RoutingError::Generic(format!(
            "Route distance out of range: {}",
            distance
        )));
    }
    Ok(distance)
}
