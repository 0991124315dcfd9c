//! Provider response adaptation.
//!
//! The Routes provider answers in a camelCase wire shape with encoded
//! polylines and text durations; the fallback synthesizer mimics the same
//! shape. Everything downstream of this module works on [`crate::route`]
//! types only.

use serde::{Deserialize, Serialize};
use shared::Coordinate;

use crate::duration::parse_duration_text;
use crate::polyline;
use crate::route::{Leg, Route, RouteSource, Step};

#[derive(Debug, thiserror::Error)]
pub enum AdaptError {
    #[error("provider returned no routes")]
    NoRoutes,
    #[error("leg {0} has no usable geometry")]
    MalformedLeg(usize),
}

/// Caller-side context for label synthesis: the provider omits leg
/// addresses under the field mask, so they are paired positionally with the
/// user's waypoint labels.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    pub origin_label: String,
    pub destination_label: String,
    pub waypoint_labels: Vec<String>,
}

impl RouteContext {
    fn leg_addresses(&self, index: usize) -> (String, String) {
        let or_nonempty = |label: Option<&String>, fallback: &str| {
            label
                .filter(|l| !l.is_empty())
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        let start = if index == 0 {
            self.origin_label.clone()
        } else {
            or_nonempty(self.waypoint_labels.get(index - 1), &self.origin_label)
        };

        let end = if index < self.waypoint_labels.len() {
            or_nonempty(self.waypoint_labels.get(index), &self.destination_label)
        } else {
            self.destination_label.clone()
        };

        (start, end)
    }
}

/// Normalize the first provider route into the internal model.
pub fn normalize(response: &RoutesResponse, context: &RouteContext) -> Result<Route, AdaptError> {
    let wire = response.routes.first().ok_or(AdaptError::NoRoutes)?;

    let source = if wire.fallback_info.is_some() || response.fallback.is_some() {
        RouteSource::OfflineFallback
    } else {
        RouteSource::Provider
    };

    let mut legs = Vec::with_capacity(wire.legs.len());
    for (index, wire_leg) in wire.legs.iter().enumerate() {
        legs.push(normalize_leg(wire_leg, index, context)?);
    }

    let encoded = wire
        .polyline
        .as_ref()
        .map(|p| p.encoded_polyline.clone())
        .unwrap_or_default();
    let overview_path = if encoded.is_empty() {
        legs.iter().flat_map(|leg| leg.path.iter().copied()).collect()
    } else {
        polyline::decode(&encoded)
    };
    let encoded_polyline = if encoded.is_empty() {
        polyline::encode(&overview_path)
    } else {
        encoded
    };

    Ok(Route {
        legs,
        overview_path,
        encoded_polyline,
        source,
    })
}

fn normalize_leg(
    wire: &WireLeg,
    index: usize,
    context: &RouteContext,
) -> Result<Leg, AdaptError> {
    let steps: Vec<Step> = wire
        .steps
        .iter()
        .map(|step| Step {
            distance_m: step.distance_meters.unwrap_or(0.0),
            duration_s: step
                .static_duration
                .as_deref()
                .or(step.duration.as_deref())
                .map(parse_duration_text)
                .unwrap_or(0),
            path: step
                .polyline
                .as_ref()
                .map(|p| polyline::decode(&p.encoded_polyline))
                .unwrap_or_default(),
            instructions: step
                .navigation_instruction
                .as_ref()
                .and_then(|n| n.instructions.clone())
                .unwrap_or_default(),
        })
        .collect();

    let mut path: Vec<Coordinate> = steps.iter().flat_map(|s| s.path.iter().copied()).collect();
    if path.is_empty() {
        if let Some(poly) = &wire.polyline {
            path = polyline::decode(&poly.encoded_polyline);
        }
    }

    let provider_start = wire.start_location.as_ref().and_then(|l| l.coordinate());
    let provider_end = wire.end_location.as_ref().and_then(|l| l.coordinate());

    if path.is_empty() {
        if let (Some(start), Some(end)) = (provider_start, provider_end) {
            path = vec![start, end];
        } else {
            return Err(AdaptError::MalformedLeg(index));
        }
    }

    let start = provider_start.or_else(|| path.first().copied());
    let end = provider_end.or_else(|| path.last().copied());
    let (Some(start), Some(end)) = (start, end) else {
        return Err(AdaptError::MalformedLeg(index));
    };

    let (start_address, end_address) = context.leg_addresses(index);

    Ok(Leg {
        start,
        end,
        distance_m: wire.distance_meters.unwrap_or(0.0),
        duration_s: wire
            .duration
            .as_deref()
            .map(parse_duration_text)
            .unwrap_or(0),
        start_address,
        end_address,
        steps,
        path,
    })
}

// ---- wire types (provider field-mask subset) ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<WireRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackNotice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<WirePolyline>,
    #[serde(default)]
    pub legs: Vec<WireLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_info: Option<FallbackInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<WirePolyline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<WireLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<WireLocation>,
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<WirePolyline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_instruction: Option<WireNavigation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePolyline {
    pub encoded_polyline: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<WireLatLng>,
}

impl WireLocation {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.lat_lng
            .as_ref()
            .map(|l| Coordinate::new(l.latitude, l.longitude))
    }

    pub fn from_coordinate(coord: Coordinate) -> Self {
        Self {
            lat_lng: Some(WireLatLng {
                latitude: coord.lat,
                longitude: coord.lon,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNavigation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackInfo {
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackNotice {
    pub reason: String,
    pub strategy: String,
}
