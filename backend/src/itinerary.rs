//! Stop accumulation: turn a normalized route and a daily driving budget
//! into an ordered, dated list of overnight stops.
//!
//! Every calculation run is tagged with a monotonically increasing sequence
//! number. A run that discovers it has been superseded after an
//! asynchronous suspension abandons quietly; only the newest run may
//! publish its stops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{Days, NaiveDate};
use shared::{Coordinate, Stop};

use crate::geocode::ReverseGeocoder;
use crate::geometry::snap_to_path;
use crate::route::Route;
use crate::segment::{compute_stops_along_path, SegmentationConfig};

#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Daily driving budget in meters.
    pub max_daily_meters: f64,
    /// Near-destination discard threshold for synthetic stops.
    pub min_stop_gap_m: f64,
    /// Check-in date of the first stop.
    pub start_date: NaiveDate,
    /// Nights per user-declared stop, matched positionally against the
    /// non-synthetic stops in traversal order.
    pub stay_overrides: Vec<u32>,
}

impl PipelineParams {
    pub fn new(max_daily_meters: f64, start_date: NaiveDate) -> Self {
        Self {
            max_daily_meters,
            min_stop_gap_m: 1000.0,
            start_date,
            stay_overrides: Vec::new(),
        }
    }
}

/// Owns the run-sequence counter and the last published stop list.
#[derive(Debug, Default)]
pub struct ItineraryPlanner {
    seq: AtomicU64,
    last_stops: Mutex<Vec<Stop>>,
}

impl ItineraryPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new calculation run, superseding all earlier ones.
    pub fn begin_run(&self) -> RunToken<'_> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken { seq, planner: self }
    }

    /// Stops published by the most recent completed run.
    pub fn last_stops(&self) -> Vec<Stop> {
        self.last_stops
            .lock()
            .map(|stops| stops.clone())
            .unwrap_or_default()
    }

    fn publish(&self, stops: &[Stop]) {
        if let Ok(mut slot) = self.last_stops.lock() {
            *slot = stops.to_vec();
        }
    }
}

pub struct RunToken<'a> {
    seq: u64,
    planner: &'a ItineraryPlanner,
}

impl RunToken<'_> {
    /// True once a newer run has been issued; the holder must stop without
    /// publishing. Checked after every asynchronous suspension point.
    pub fn is_stale(&self) -> bool {
        self.planner.seq.load(Ordering::SeqCst) != self.seq
    }
}

/// Run the full accumulation pipeline over `route`.
///
/// Returns `None` when the run went stale mid-flight; that is a silent
/// discard, not an error. On success the stop list is also published as the
/// planner's latest result.
pub async fn accumulate_stops(
    route: &Route,
    params: &PipelineParams,
    geocoder: &dyn ReverseGeocoder,
    token: &RunToken<'_>,
) -> Option<Vec<Stop>> {
    if token.is_stale() {
        return None;
    }

    let config = SegmentationConfig {
        max_leg_meters: params.max_daily_meters,
        min_stop_gap_m: params.min_stop_gap_m,
    };

    // Collect (leg index, coordinate, name, auto flag) in traversal order;
    // synthetic stops within a leg precede the leg-ending stop.
    let mut collected: Vec<(usize, Coordinate, String, bool)> = Vec::new();

    for (leg_index, leg) in route.legs.iter().enumerate() {
        if params.max_daily_meters > 0.0 && leg.distance_m > params.max_daily_meters {
            let candidates = compute_stops_along_path(&leg.path, leg.end, &config);
            for coord in candidates {
                let name = resolve_stop_name(geocoder, coord).await;
                if token.is_stale() {
                    return None;
                }
                collected.push((leg_index, coord, name, true));
            }
        }

        let end_name = if leg.end_address.is_empty() {
            leg.end.display()
        } else {
            leg.end_address.clone()
        };
        collected.push((leg_index, leg.end, end_name, false));
    }

    // Nights: synthetic stops always stay one night; user-declared stops
    // take their overrides positionally. The final destination sits past
    // the override list and keeps the default.
    let mut nights: Vec<u32> = Vec::with_capacity(collected.len());
    let mut user_stop_index = 0usize;
    for (_, _, _, is_auto) in &collected {
        if *is_auto {
            nights.push(1);
        } else {
            let stay = params
                .stay_overrides
                .get(user_stop_index)
                .copied()
                .unwrap_or(1)
                .max(1);
            user_stop_index += 1;
            nights.push(stay);
        }
    }

    // Dates accumulate without gaps: each check-in is the previous check-out.
    let mut stops = Vec::with_capacity(collected.len());
    let mut current = params.start_date;
    for (position, ((leg_index, coord, name, is_auto), stay_nights)) in
        collected.into_iter().zip(nights).enumerate()
    {
        let check_in = current;
        let check_out = add_nights(check_in, stay_nights);
        current = check_out;

        let snapped = snap_to_path(coord, &route.legs[leg_index].path);

        stops.push(Stop {
            position: position + 1,
            coord: snapped,
            name,
            stay_nights,
            check_in,
            check_out,
            is_auto_stop: is_auto,
        });
    }

    if token.is_stale() {
        return None;
    }

    token.planner.publish(&stops);
    Some(stops)
}

async fn resolve_stop_name(geocoder: &dyn ReverseGeocoder, coord: Coordinate) -> String {
    match geocoder.reverse(coord).await {
        Ok(Some(place)) => place.display_name(),
        Ok(None) => coord.display(),
        Err(err) => {
            tracing::warn!("reverse geocode failed for auto stop: {err}");
            coord.display()
        }
    }
}

fn add_nights(date: NaiveDate, nights: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(nights)))
        .unwrap_or(date)
}
