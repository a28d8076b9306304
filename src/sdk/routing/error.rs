use serde::Deserialize;
use thiserror::Error;

// Helper structs to parse the JSON error response from ORS
#[derive(Deserialize, Debug)]
pub struct OrsErrorDetail {
    pub code: u32,
    pub message: String,
}
#[derive(Deserialize, Debug)]
pub struct OrsErrorPayload {
    pub error: OrsErrorDetail,
}

/// ORS error code for "Could not find routable point".
pub const ORS_UNROUTABLE_CODE: u32 = 2010;

/// Failure of a single pairwise distance lookup.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("A point was not routable on the road network")]
    UnroutablePoint,

    #[error("API Error (Code {code}): {message}")]
    ApiError { code: u32, message: String },

    // Non-success response whose body is not the structured ORS error
    #[error("Unstructured API Error: {0}")]
    RawApiError(String),

    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors that abort tour construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TourError {
    #[error("Cannot build a tour from an empty point list")]
    EmptyInput,

    #[error("Point {index} has an invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
}
