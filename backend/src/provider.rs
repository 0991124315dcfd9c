//! HTTP client for the Routes provider.
//!
//! Builds the provider-native request from resolved locations, applies the
//! field mask the rest of the pipeline relies on, and sorts provider
//! failures into the error taxonomy the handlers act on: configuration
//! problems surface with hint text, transport-level network failures are
//! the trigger for great-circle fallback.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::adapt::RoutesResponse;
use crate::models::{ResolvedLocation, RouteModifiers};

const FIELD_MASK: &str = concat!(
    "routes.distanceMeters,",
    "routes.duration,",
    "routes.polyline.encodedPolyline,",
    "routes.legs.distanceMeters,",
    "routes.legs.duration,",
    "routes.legs.polyline.encodedPolyline,",
    "routes.legs.startLocation,",
    "routes.legs.endLocation,",
    "routes.legs.steps.distanceMeters,",
    "routes.legs.steps.staticDuration,",
    "routes.legs.steps.polyline.encodedPolyline,",
    "routes.legs.steps.navigationInstruction"
);

const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("routing provider API key is not configured")]
    MissingKey,
    /// Provider answered with an error status. `hint` carries actionable
    /// configuration advice for the common cases.
    #[error("{message}")]
    Upstream {
        message: String,
        status: String,
        hint: Option<String>,
        details: Option<Value>,
    },
    /// Transport never reached the provider: connect refused/reset,
    /// unreachable host or network, timeout, DNS exhaustion.
    #[error("routing provider unreachable: {0}")]
    Network(reqwest::Error),
    #[error("routing provider returned an unreadable response: {0}")]
    Decode(reqwest::Error),
}

impl ProviderError {
    pub fn is_network(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ProviderError::Upstream { status, .. } if status == "PERMISSION_DENIED")
    }
}

#[derive(Debug, Clone)]
pub struct RoutesClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for RoutesClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct RoutesClient {
    http: reqwest::Client,
    config: RoutesClientConfig,
}

impl RoutesClient {
    pub fn new(http: reqwest::Client, config: RoutesClientConfig) -> Self {
        Self { http, config }
    }

    pub fn has_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn compute_route(
        &self,
        origin: &ResolvedLocation,
        destination: &ResolvedLocation,
        waypoints: &[ResolvedLocation],
        modifiers: RouteModifiers,
    ) -> Result<RoutesResponse, ProviderError> {
        let key = self.config.api_key.as_deref().ok_or(ProviderError::MissingKey)?;

        let body = ComputeRoutesBody::new(origin, destination, waypoints, modifiers);
        let url = format!("{}/directions/v2:computeRoutes", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .header("X-Goog-Api-Key", key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let http_status = response.status();
            let payload: Value = response.json().await.unwrap_or_default();
            return Err(upstream_error(http_status, &payload));
        }

        response.json().await.map_err(ProviderError::Decode)
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() || err.is_connect() {
        ProviderError::Network(err)
    } else {
        ProviderError::Decode(err)
    }
}

fn upstream_error(http_status: reqwest::StatusCode, payload: &Value) -> ProviderError {
    let google_error = payload.get("error").cloned().unwrap_or_default();
    let message = google_error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!("routing request failed with status {}", http_status.as_u16())
        });
    let status = google_error
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| http_status.as_u16().to_string());

    let hint = match (status.as_str(), http_status.as_u16()) {
        ("PERMISSION_DENIED", _) | (_, 403) => Some(
            "Verify that the routing API is enabled, billing is active, and the \
             provided API key allows server-side requests from this host."
                .to_string(),
        ),
        ("INVALID_ARGUMENT", _) | (_, 400) => Some(
            "Double-check the origin, destination, and waypoint values being sent \
             to the routing API."
                .to_string(),
        ),
        ("RESOURCE_EXHAUSTED", _) | (_, 429) => Some(
            "The routing quota has been exceeded. Try again later or adjust your \
             usage limits."
                .to_string(),
        ),
        _ => None,
    };

    let details = google_error
        .get("details")
        .cloned()
        .or_else(|| payload.get("details").cloned())
        .filter(|v| !v.is_null());

    ProviderError::Upstream {
        message,
        status,
        hint,
        details,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesBody {
    origin: LocationPayload,
    destination: LocationPayload,
    travel_mode: &'static str,
    routing_preference: &'static str,
    compute_alternative_routes: bool,
    language_code: &'static str,
    units: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    intermediates: Vec<LocationPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route_modifiers: Option<ModifiersPayload>,
}

impl ComputeRoutesBody {
    fn new(
        origin: &ResolvedLocation,
        destination: &ResolvedLocation,
        waypoints: &[ResolvedLocation],
        modifiers: RouteModifiers,
    ) -> Self {
        Self {
            origin: LocationPayload::from(origin),
            destination: LocationPayload::from(destination),
            travel_mode: "DRIVE",
            routing_preference: "TRAFFIC_UNAWARE",
            compute_alternative_routes: false,
            language_code: "en-US",
            units: "METRIC",
            intermediates: waypoints.iter().map(LocationPayload::from).collect(),
            route_modifiers: modifiers.any().then_some(ModifiersPayload {
                avoid_highways: modifiers.avoid_highways,
                avoid_tolls: modifiers.avoid_tolls,
                avoid_ferries: modifiers.avoid_ferries,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifiersPayload {
    avoid_highways: bool,
    avoid_tolls: bool,
    avoid_ferries: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum LocationPayload {
    Point {
        location: PointLocation,
    },
    Address {
        address: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PointLocation {
    lat_lng: LatLngPayload,
}

#[derive(Debug, Serialize)]
struct LatLngPayload {
    latitude: f64,
    longitude: f64,
}

impl From<&ResolvedLocation> for LocationPayload {
    fn from(location: &ResolvedLocation) -> Self {
        match location {
            ResolvedLocation::Point { coord, .. } => LocationPayload::Point {
                location: PointLocation {
                    lat_lng: LatLngPayload {
                        latitude: coord.lat,
                        longitude: coord.lon,
                    },
                },
            },
            ResolvedLocation::Address(address) => LocationPayload::Address {
                address: address.clone(),
            },
        }
    }
}
