//! Offline great-circle route synthesis.
//!
//! When the routing provider is unreachable at the transport level, a
//! single-leg, single-step pseudo-route between the two endpoints keeps the
//! planner usable. The result wears the same wire shape as a real provider
//! response so the adaptation layer needs no special case, and it carries a
//! fallback marker so callers can disclose the approximation.

use shared::Coordinate;

use crate::adapt::{
    FallbackInfo, FallbackNotice, RoutesResponse, WireLeg, WireLocation, WirePolyline, WireRoute,
    WireStep, WireNavigation,
};
use crate::duration::to_iso_duration;
use crate::geometry::haversine_m;
use crate::polyline;

/// Assumed cruising speed for the straight-line estimate, ~100 km/h.
const AVERAGE_SPEED_MPS: f64 = 27.7778;
const MIN_DURATION_S: i64 = 60;

pub const FALLBACK_SOURCE: &str = "offline-direct";
pub const FALLBACK_REASON: &str = "routing provider unreachable";
pub const FALLBACK_STRATEGY: &str = "great-circle";

/// Build the straight-line pseudo-route. Returns `None` when either
/// endpoint lacks a resolved coordinate; the caller must then surface a
/// hard network error instead.
pub fn build_offline_route(
    origin: Option<Coordinate>,
    destination: Option<Coordinate>,
    origin_label: &str,
    destination_label: &str,
) -> Option<RoutesResponse> {
    let origin = origin?;
    let destination = destination?;

    let distance_m = haversine_m(origin, destination).round();
    let duration_s = ((distance_m / AVERAGE_SPEED_MPS).round() as i64).max(MIN_DURATION_S);
    let duration = to_iso_duration(duration_s);
    let encoded_polyline = polyline::encode(&[origin, destination]);

    let step = WireStep {
        distance_meters: Some(distance_m),
        static_duration: Some(duration.clone()),
        duration: None,
        polyline: Some(WirePolyline {
            encoded_polyline: encoded_polyline.clone(),
        }),
        navigation_instruction: Some(WireNavigation {
            maneuver: Some("DRIVE_STRAIGHT".into()),
            instructions: Some(format!("Drive from {origin_label} to {destination_label}.")),
        }),
    };

    let leg = WireLeg {
        distance_meters: Some(distance_m),
        duration: Some(duration.clone()),
        polyline: Some(WirePolyline {
            encoded_polyline: encoded_polyline.clone(),
        }),
        start_location: Some(WireLocation::from_coordinate(origin)),
        end_location: Some(WireLocation::from_coordinate(destination)),
        steps: vec![step],
    };

    let route = WireRoute {
        distance_meters: Some(distance_m),
        duration: Some(duration),
        polyline: Some(WirePolyline { encoded_polyline }),
        legs: vec![leg],
        fallback_info: Some(FallbackInfo {
            source: FALLBACK_SOURCE.into(),
            message: "Routing provider was unreachable. Distances are approximated \
                      using the great-circle distance between the two points."
                .into(),
        }),
    };

    Some(RoutesResponse {
        routes: vec![route],
        fallback: Some(FallbackNotice {
            reason: FALLBACK_REASON.into(),
            strategy: FALLBACK_STRATEGY.into(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapt::{normalize, RouteContext};

    #[test]
    fn test_missing_coordinates_yield_no_fallback() {
        let coord = Some(Coordinate::new(0.0, 0.0));
        assert!(build_offline_route(None, coord, "A", "B").is_none());
        assert!(build_offline_route(coord, None, "A", "B").is_none());
    }

    #[test]
    fn test_one_degree_of_equator_constants() {
        // (0,0) -> (0,1): ~111.2 km at ~100 km/h.
        let response = build_offline_route(
            Some(Coordinate::new(0.0, 0.0)),
            Some(Coordinate::new(0.0, 1.0)),
            "Origin",
            "Destination",
        )
        .expect("fallback route");

        let route = &response.routes[0];
        let distance = route.distance_meters.expect("distance");
        assert!((distance - 111_195.0).abs() < 1_112.0); // within 1%

        let expected_duration = (distance / AVERAGE_SPEED_MPS).round() as i64;
        assert_eq!(
            route.duration.as_deref(),
            Some(to_iso_duration(expected_duration).as_str())
        );
        assert!(route.fallback_info.is_some());
        assert!(response.fallback.is_some());
    }

    #[test]
    fn test_short_hop_clamps_to_minimum_duration() {
        let response = build_offline_route(
            Some(Coordinate::new(0.0, 0.0)),
            Some(Coordinate::new(0.0, 0.001)),
            "A",
            "B",
        )
        .expect("fallback route");
        assert_eq!(response.routes[0].duration.as_deref(), Some("PT1M"));
    }

    #[test]
    fn test_polyline_carries_exactly_the_endpoints() {
        let origin = Coordinate::new(53.5461, -113.4938);
        let destination = Coordinate::new(49.2827, -123.1207);
        let response =
            build_offline_route(Some(origin), Some(destination), "Edmonton", "Vancouver")
                .expect("fallback route");

        let encoded = &response.routes[0]
            .polyline
            .as_ref()
            .expect("polyline")
            .encoded_polyline;
        let decoded = polyline::decode(encoded);
        assert_eq!(decoded.len(), 2);
        assert!((decoded[0].lat - origin.lat).abs() < 1e-5);
        assert!((decoded[1].lon - destination.lon).abs() < 1e-5);
    }

    #[test]
    fn test_fallback_flows_through_the_adapter() {
        let response = build_offline_route(
            Some(Coordinate::new(0.0, 0.0)),
            Some(Coordinate::new(0.0, 1.0)),
            "Origin",
            "Destination",
        )
        .expect("fallback route");

        let route = normalize(
            &response,
            &RouteContext {
                origin_label: "Origin".into(),
                destination_label: "Destination".into(),
                waypoint_labels: vec![],
            },
        )
        .expect("normalized");

        assert!(route.is_fallback());
        assert_eq!(route.legs.len(), 1);
        assert_eq!(route.legs[0].steps.len(), 1);
        assert_eq!(
            route.legs[0].steps[0].instructions,
            "Drive from Origin to Destination."
        );
        // The ISO duration survives normalization.
        assert!(route.legs[0].duration_s >= 3_900);
        assert_eq!(route.legs[0].path.len(), 2);
    }
}
