//! Leg segmentation: place overnight-stop candidates along a leg that is
//! too long to drive in one day.

use shared::Coordinate;

use crate::geometry::{haversine_m, interpolate, segment_lengths_m};

#[derive(Debug, Clone, Copy)]
pub struct SegmentationConfig {
    /// Daily driving budget in meters.
    pub max_leg_meters: f64,
    /// Candidates closer than this to the leg's destination are dropped;
    /// an overnight stop within walking distance of the destination is
    /// never useful.
    pub min_stop_gap_m: f64,
}

impl SegmentationConfig {
    pub fn new(max_leg_meters: f64) -> Self {
        Self {
            max_leg_meters,
            min_stop_gap_m: 1000.0,
        }
    }
}

/// Evenly budget-spaced stop candidates along `path`, in traversal order.
///
/// Walks the cumulative path distance, placing one candidate at every whole
/// multiple of the daily budget and interpolating within the straddling
/// segment. A leg shorter than the budget yields no candidates, as does a
/// malformed path of fewer than two points.
pub fn compute_stops_along_path(
    path: &[Coordinate],
    destination: Coordinate,
    config: &SegmentationConfig,
) -> Vec<Coordinate> {
    let mut stops = Vec::new();
    if path.len() < 2 || config.max_leg_meters <= 0.0 {
        return stops;
    }

    let seg_dist = segment_lengths_m(path);
    let total: f64 = seg_dist.iter().sum();
    if total < config.max_leg_meters {
        return stops;
    }

    let num_targets = (total / config.max_leg_meters).floor() as usize;
    let mut cum = 0.0;
    let mut seg_index = 0;

    for n in 1..=num_targets {
        let target = n as f64 * config.max_leg_meters;
        while seg_index < seg_dist.len() && cum + seg_dist[seg_index] < target {
            cum += seg_dist[seg_index];
            seg_index += 1;
        }
        if seg_index >= seg_dist.len() {
            break;
        }

        let fraction = (target - cum) / seg_dist[seg_index];
        let candidate = interpolate(path[seg_index], path[seg_index + 1], fraction);

        if haversine_m(candidate, destination) > config.min_stop_gap_m {
            stops.push(candidate);
        }
    }

    stops
}
