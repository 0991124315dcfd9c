use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{Coordinate, DistanceUnit, Stop, TripConfig};

/// A location as the planner UI sends it: coordinates under any of the
/// historical field spellings, a nested provider-shaped pair, or free text.
/// Resolved exactly once at the API boundary via [`LocationInput::resolve`];
/// nothing downstream re-sniffs these fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub label: Option<String>,
    pub location: Option<NestedLocation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NestedLocation {
    pub lat_lng: Option<NestedLatLng>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedLatLng {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A location once normalized: either a coordinate (optionally labelled) or
/// a free-text address left for the provider to geocode.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    Point { coord: Coordinate, label: Option<String> },
    Address(String),
}

impl ResolvedLocation {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            ResolvedLocation::Point { coord, .. } => Some(*coord),
            ResolvedLocation::Address(_) => None,
        }
    }

    pub fn display_label(&self, fallback: &str) -> String {
        let label = match self {
            ResolvedLocation::Point { label: Some(label), .. } => label.clone(),
            ResolvedLocation::Point { coord, .. } => coord.display(),
            ResolvedLocation::Address(address) => address.clone(),
        };
        if label.trim().is_empty() {
            fallback.to_string()
        } else {
            label
        }
    }
}

impl LocationInput {
    /// Pick coordinates from any of the accepted spellings, else fall back
    /// to address text. Returns `None` when the input carries neither.
    pub fn resolve(&self) -> Option<ResolvedLocation> {
        let lat = self
            .lat
            .or(self.latitude)
            .or_else(|| self.location.as_ref()?.lat_lng.as_ref()?.latitude);
        let lon = self
            .lng
            .or(self.longitude)
            .or_else(|| self.location.as_ref()?.lat_lng.as_ref()?.longitude);

        if let (Some(lat), Some(lon)) = (lat, lon) {
            if lat.is_finite() && lon.is_finite() {
                return Some(ResolvedLocation::Point {
                    coord: Coordinate::new(lat, lon),
                    label: self.text(),
                });
            }
        }

        self.text().map(ResolvedLocation::Address)
    }

    fn text(&self) -> Option<String> {
        [self.address.as_deref(), self.label.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteModifiers {
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
}

impl RouteModifiers {
    pub fn any(&self) -> bool {
        self.avoid_highways || self.avoid_tolls || self.avoid_ferries
    }
}

/// Body of `POST /api/compute-route`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteProxyRequest {
    pub origin: Option<LocationInput>,
    pub destination: Option<LocationInput>,
    pub waypoints: Option<Vec<LocationInput>>,
    pub route_modifiers: Option<RouteModifiers>,
}

/// One user-declared stop in an itinerary request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopInput {
    pub location: LocationInput,
    pub nights: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleInput {
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub vehicle_year: Option<i32>,
    pub fuel_price: Option<f64>,
}

/// Body of `POST /api/itinerary`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryRequest {
    pub origin: Option<LocationInput>,
    pub destination: Option<LocationInput>,
    pub stops: Vec<StopInput>,
    pub max_daily_distance: f64,
    pub distance_unit: DistanceUnit,
    pub route_modifiers: Option<RouteModifiers>,
    pub from_date: Option<NaiveDate>,
    pub vehicle: Option<VehicleInput>,
}

impl From<TripConfig> for ItineraryRequest {
    /// Saved trips store free-text locations; the provider geocodes them
    /// during routing.
    fn from(trip: TripConfig) -> Self {
        let text_location = |text: &str| LocationInput {
            address: Some(text.to_string()),
            ..Default::default()
        };
        let nonempty = |text: String| {
            let trimmed = text.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };

        Self {
            origin: nonempty(trip.start).map(|s| text_location(&s)),
            destination: nonempty(trip.destination).map(|s| text_location(&s)),
            stops: trip
                .stops
                .iter()
                .map(|s| StopInput {
                    location: text_location(s.location()),
                    nights: Some(s.nights()),
                })
                .collect(),
            max_daily_distance: trip.max_daily_distance,
            distance_unit: trip.distance_unit,
            route_modifiers: Some(RouteModifiers {
                avoid_highways: trip.avoid_highways,
                avoid_tolls: trip.avoid_tolls,
                avoid_ferries: trip.avoid_ferries,
            }),
            from_date: trip.from_date,
            vehicle: Some(VehicleInput {
                vehicle_type: nonempty(trip.vehicle_type),
                fuel_type: nonempty(trip.fuel_type),
                vehicle_year: None,
                fuel_price: Some(trip.fuel_price),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelSummary {
    /// L/100 km for combustion, kWh/100 km for electric.
    pub consumption: f64,
    pub consumption_text: String,
    pub total_cost: f64,
}

/// Body of a successful `POST /api/itinerary` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub stops: Vec<Stop>,
    pub total_distance_m: f64,
    pub total_duration_s: i64,
    pub total_distance_text: String,
    pub total_duration_text: String,
    pub fallback: bool,
    /// Labels of user stops dropped because they could not be resolved.
    pub skipped_stops: Vec<String>,
    pub fuel: Option<FuelSummary>,
}
