pub mod adapt;
pub mod duration;
pub mod fallback;
pub mod fuel;
pub mod geocode;
pub mod geometry;
pub mod itinerary;
pub mod models;
pub mod polyline;
pub mod provider;
pub mod route;
pub mod segment;
pub mod units;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use serde::Serialize;
use serde_json::Value;
use shared::{ApiError, TripConfig};
use tower_http::cors::CorsLayer;

use crate::adapt::{normalize, AdaptError, RouteContext, RoutesResponse};
use crate::fallback::build_offline_route;
use crate::geocode::ReverseGeocoder;
use crate::itinerary::{accumulate_stops, ItineraryPlanner, PipelineParams};
use crate::models::{
    FuelSummary, ItineraryRequest, ItineraryResponse, ResolvedLocation, RouteProxyRequest,
};
use crate::provider::{ProviderError, RoutesClient};

#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RoutesClient>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub planner: Arc<ItineraryPlanner>,
    pub maps_key: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/maps-key", get(maps_key_handler))
        .route("/api/compute-route", post(compute_route_handler))
        .route("/api/itinerary", post(itinerary_handler))
        .route("/api/itinerary/saved", post(saved_trip_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct MapsKeyResponse {
    key: String,
}

/// Error body of the proxy endpoint, mirroring what the UI already parses:
/// `{error, status?, hint?, details?}`.
#[derive(Serialize)]
struct ProxyErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ProxyErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            hint: None,
            details: None,
        }
    }
}

async fn maps_key_handler(
    State(state): State<AppState>,
) -> Result<Json<MapsKeyResponse>, (StatusCode, Json<ProxyErrorBody>)> {
    match state.maps_key {
        Some(key) => Ok(Json(MapsKeyResponse { key })),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProxyErrorBody::message("Maps API key is not configured.")),
        )),
    }
}

async fn compute_route_handler(
    State(state): State<AppState>,
    Json(req): Json<RouteProxyRequest>,
) -> Result<Json<RoutesResponse>, (StatusCode, Json<ProxyErrorBody>)> {
    if !state.routes.has_key() {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProxyErrorBody::message("Routing API key is not configured.")),
        ));
    }

    let (Some(origin_input), Some(destination_input)) = (&req.origin, &req.destination) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ProxyErrorBody::message("Origin and destination are required.")),
        ));
    };

    let (Some(origin), Some(destination)) = (origin_input.resolve(), destination_input.resolve())
    else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ProxyErrorBody::message(
                "Unable to resolve coordinates for origin or destination.",
            )),
        ));
    };

    let waypoints: Vec<ResolvedLocation> = req
        .waypoints
        .unwrap_or_default()
        .iter()
        .filter_map(|w| w.resolve())
        .collect();

    let modifiers = req.route_modifiers.unwrap_or_default();

    match state
        .routes
        .compute_route(&origin, &destination, &waypoints, modifiers)
        .await
    {
        Ok(response) => Ok(Json(response)),
        Err(err) if err.is_network() => {
            let fallback = build_offline_route(
                origin.coordinate(),
                destination.coordinate(),
                &origin.display_label("Origin"),
                &destination.display_label("Destination"),
            );
            match fallback {
                Some(response) => {
                    tracing::warn!("routing provider unreachable, returning offline fallback route");
                    Ok(Json(response))
                }
                None => Err((
                    StatusCode::BAD_GATEWAY,
                    Json(ProxyErrorBody {
                        error: "Unable to reach the routing provider and no fallback route \
                                could be generated."
                            .into(),
                        status: Some("NETWORK_UNREACHABLE".into()),
                        hint: Some(
                            "Check the server's internet connectivity or try again later.".into(),
                        ),
                        details: None,
                    }),
                )),
            }
        }
        Err(err) => Err(proxy_error(err)),
    }
}

fn proxy_error(err: ProviderError) -> (StatusCode, Json<ProxyErrorBody>) {
    match err {
        ProviderError::MissingKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProxyErrorBody::message("Routing API key is not configured.")),
        ),
        ProviderError::Upstream {
            message,
            status,
            hint,
            details,
        } => (
            StatusCode::BAD_GATEWAY,
            Json(ProxyErrorBody {
                error: message,
                status: Some(status),
                hint,
                details,
            }),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(ProxyErrorBody::message(other.to_string())),
        ),
    }
}

async fn itinerary_handler(
    State(state): State<AppState>,
    Json(req): Json<ItineraryRequest>,
) -> Result<Json<ItineraryResponse>, (StatusCode, Json<ApiError>)> {
    run_itinerary(&state, req).await.map(Json)
}

/// Recompute an itinerary from a persisted trip configuration, exactly as
/// the planner UI saved it. Corrupt stored JSON is treated as absent.
async fn saved_trip_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ItineraryResponse>, (StatusCode, Json<ApiError>)> {
    let Some(trip) = TripConfig::from_json(&body) else {
        return Err(validation_error("Saved trip is missing or unreadable."));
    };
    run_itinerary(&state, trip.into()).await.map(Json)
}

async fn run_itinerary(
    state: &AppState,
    req: ItineraryRequest,
) -> Result<ItineraryResponse, (StatusCode, Json<ApiError>)> {
    let origin = req
        .origin
        .as_ref()
        .and_then(|o| o.resolve())
        .ok_or_else(|| validation_error("Please enter a starting point."))?;
    let destination = req
        .destination
        .as_ref()
        .and_then(|d| d.resolve())
        .ok_or_else(|| validation_error("Please enter a destination."))?;
    if req.max_daily_distance <= 0.0 {
        return Err(validation_error(
            "Please enter a maximum daily driving distance.",
        ));
    }

    // Unresolvable user stops are dropped, routed around, and reported.
    let mut waypoints = Vec::new();
    let mut stay_overrides = Vec::new();
    let mut skipped_stops = Vec::new();
    for (index, stop) in req.stops.iter().enumerate() {
        match stop.location.resolve() {
            Some(resolved) => {
                stay_overrides.push(stop.nights.unwrap_or(1).max(1));
                waypoints.push(resolved);
            }
            None => skipped_stops.push(format!("stop {}", index + 1)),
        }
    }
    if !skipped_stops.is_empty() {
        tracing::warn!("skipping unresolvable stops: {skipped_stops:?}");
    }

    let modifiers = req.route_modifiers.unwrap_or_default();
    let token = state.planner.begin_run();

    let response = match state
        .routes
        .compute_route(&origin, &destination, &waypoints, modifiers)
        .await
    {
        Ok(response) => response,
        Err(err) if err.is_network() => build_offline_route(
            origin.coordinate(),
            destination.coordinate(),
            &origin.display_label("Origin"),
            &destination.display_label("Destination"),
        )
        .ok_or_else(|| {
            (
                StatusCode::BAD_GATEWAY,
                api_error(
                    "The routing provider is unreachable and the endpoints are not \
                     coordinate-resolvable, so no approximate route could be built.",
                ),
            )
        })?,
        Err(err) => return Err(itinerary_provider_error(err)),
    };

    // A newer calculation may have started while the route was in flight.
    if token.is_stale() {
        return Err(superseded());
    }

    let context = RouteContext {
        origin_label: origin.display_label("Origin"),
        destination_label: destination.display_label("Destination"),
        waypoint_labels: waypoints
            .iter()
            .map(|w| w.display_label(""))
            .collect(),
    };

    let route = normalize(&response, &context).map_err(|err| match err {
        AdaptError::NoRoutes => (
            StatusCode::UNPROCESSABLE_ENTITY,
            api_error(
                "No drivable route found between one or more points. Please adjust \
                 your stops and try again.",
            ),
        ),
        other => (StatusCode::BAD_GATEWAY, api_error(other.to_string())),
    })?;

    let start_date = req
        .from_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut params = PipelineParams::new(
        units::to_meters(req.max_daily_distance, req.distance_unit),
        start_date,
    );
    params.stay_overrides = stay_overrides;

    let Some(stops) = accumulate_stops(&route, &params, state.geocoder.as_ref(), &token).await
    else {
        return Err(superseded());
    };

    let total_distance_m = route.total_distance_m();
    let total_duration_s = route.total_duration_s();

    let fuel = req.vehicle.as_ref().map(|vehicle| {
        let current_year = chrono::Local::now().year();
        let estimate = fuel::estimate_trip_cost(
            total_distance_m,
            req.distance_unit,
            vehicle.vehicle_type.as_deref().unwrap_or("car"),
            vehicle.fuel_type.as_deref().unwrap_or("gas"),
            vehicle.vehicle_year,
            current_year,
            vehicle.fuel_price.unwrap_or(0.0),
        );
        FuelSummary {
            consumption: estimate.consumption,
            consumption_text: estimate.consumption_text,
            total_cost: estimate.total_cost,
        }
    });

    Ok(ItineraryResponse {
        stops,
        total_distance_m,
        total_duration_s,
        total_distance_text: units::format_distance_m(total_distance_m, req.distance_unit),
        total_duration_text: duration::format_duration(total_duration_s),
        fallback: route.is_fallback(),
        skipped_stops,
        fuel,
    })
}

fn itinerary_provider_error(err: ProviderError) -> (StatusCode, Json<ApiError>) {
    let message = match &err {
        ProviderError::Upstream {
            message,
            hint: Some(hint),
            ..
        } => format!("{message} {hint}"),
        other => other.to_string(),
    };
    let status = match err {
        ProviderError::MissingKey => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, api_error(message))
}

fn validation_error(message: &str) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, api_error(message))
}

fn superseded() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::CONFLICT,
        api_error("This calculation was superseded by a newer one."),
    )
}

fn api_error(message: impl Into<String>) -> Json<ApiError> {
    Json(ApiError {
        message: message.into(),
    })
}
