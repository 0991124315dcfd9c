use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Display form used when no reverse-geocoded name is available.
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Mi,
}

/// Reverse-geocoded place description for a stop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Place {
    pub formatted_address: String,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Place {
    /// Prefer "Town, ST, CC"; fall back to the full formatted address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [
            self.town.as_deref(),
            self.state.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        if parts.is_empty() {
            self.formatted_address.clone()
        } else {
            parts.join(", ")
        }
    }
}

/// One overnight stop in a computed itinerary.
///
/// Stops are emitted in traversal order; `position` is the 1-based ordinal
/// shown to travellers. `check_out` is always `check_in + stay_nights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub position: usize,
    pub coord: Coordinate,
    pub name: String,
    pub stay_nights: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub is_auto_stop: bool,
}

/// A user-declared stop in a saved trip. Older saves stored bare strings,
/// newer ones `{ location, nights }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripStop {
    Detailed {
        location: String,
        #[serde(default = "default_nights")]
        nights: u32,
    },
    Location(String),
}

impl TripStop {
    pub fn location(&self) -> &str {
        match self {
            TripStop::Detailed { location, .. } => location,
            TripStop::Location(location) => location,
        }
    }

    pub fn nights(&self) -> u32 {
        match self {
            TripStop::Detailed { nights, .. } => (*nights).max(1),
            TripStop::Location(_) => 1,
        }
    }
}

fn default_nights() -> u32 {
    1
}

/// Persisted trip configuration, as saved by the planner UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripConfig {
    pub title: String,
    pub start: String,
    pub destination: String,
    pub stops: Vec<TripStop>,
    pub max_daily_distance: f64,
    pub distance_unit: DistanceUnit,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
    pub num_adults: u32,
    pub num_children: u32,
    pub children_ages: Vec<u32>,
    pub num_rooms: u32,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub vehicle_type: String,
    pub fuel_type: String,
    pub fuel_price: f64,
    pub date_saved: Option<String>,
}

impl TripConfig {
    /// Best-effort parse of a stored trip. Corrupt or non-JSON input is
    /// treated as absent, never an error.
    pub fn from_json(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        serde_json::from_str(raw).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
