//! Distance and consumption unit conversions. Pure multiplicative mappings.

use shared::DistanceUnit;

/// Statute mile in meters. Fixed conversion constant, matches the UI side.
pub const METERS_PER_MILE: f64 = 1609.34;
pub const METERS_PER_KM: f64 = 1000.0;

/// mpg = MPG_FACTOR / (L/100 km).
pub const MPG_FACTOR: f64 = 235.214583;

const KM_PER_MILE: f64 = 1.60934;

pub fn to_meters(distance: f64, unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Km => distance * METERS_PER_KM,
        DistanceUnit::Mi => distance * METERS_PER_MILE,
    }
}

pub fn from_meters(meters: f64, unit: DistanceUnit) -> f64 {
    match unit {
        DistanceUnit::Km => meters / METERS_PER_KM,
        DistanceUnit::Mi => meters / METERS_PER_MILE,
    }
}

/// L/100 km expressed as miles per US gallon.
pub fn l_per_100km_to_mpg(l_per_100km: f64) -> f64 {
    MPG_FACTOR / l_per_100km
}

/// kWh per 100 km expressed as kWh per 100 mi.
pub fn kwh_per_100km_to_per_100mi(rate: f64) -> f64 {
    rate * KM_PER_MILE
}

/// "343 km" / "2.4 mi" / "850 m" style text for itinerary output.
pub fn format_distance_m(meters: f64, unit: DistanceUnit) -> String {
    match unit {
        DistanceUnit::Mi => format!("{:.1} mi", meters / METERS_PER_MILE),
        DistanceUnit::Km if meters >= 1000.0 => format!("{:.1} km", meters / 1000.0),
        DistanceUnit::Km => format!("{} m", meters.round() as i64),
    }
}
