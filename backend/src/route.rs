//! Provider-agnostic route model.
//!
//! The segmentation and stop-accumulation pipeline only ever sees these
//! types; provider response shapes are confined to the adaptation layer.

use serde::{Deserialize, Serialize};
use shared::Coordinate;

/// Where a route came from. Fallback routes are approximations and callers
/// are expected to disclose that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteSource {
    Provider,
    OfflineFallback,
}

/// One turn-by-turn sub-segment within a leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub distance_m: f64,
    pub duration_s: i64,
    pub path: Vec<Coordinate>,
    pub instructions: String,
}

/// One segment between consecutive user-significant points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leg {
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance_m: f64,
    pub duration_s: i64,
    pub start_address: String,
    pub end_address: String,
    pub steps: Vec<Step>,
    /// Concatenation of the step paths; never empty for a valid leg.
    pub path: Vec<Coordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub legs: Vec<Leg>,
    pub overview_path: Vec<Coordinate>,
    pub encoded_polyline: String,
    pub source: RouteSource,
}

impl Route {
    pub fn total_distance_m(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_m).sum()
    }

    pub fn total_duration_s(&self) -> i64 {
        self.legs.iter().map(|leg| leg.duration_s).sum()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RouteSource::OfflineFallback
    }
}
