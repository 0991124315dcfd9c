//! Reverse geocoding of stop coordinates into human-readable places.
//!
//! Failures here are never fatal: the pipeline keeps a numeric coordinate
//! string as the display name when a lookup comes back empty or broken.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;
use serde::Deserialize;
use shared::{Coordinate, Place};

const CACHE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding provider returned status {0}")]
    Upstream(String),
}

/// Maps a coordinate to a place, best-effort. `Ok(None)` means the provider
/// knows nothing about the location.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coord: Coordinate) -> Result<Option<Place>, GeocodeError>;
}

/// Geocoder that never resolves anything. Used when no API key is
/// configured; every stop keeps its coordinate display name.
pub struct NoopGeocoder;

#[async_trait]
impl ReverseGeocoder for NoopGeocoder {
    async fn reverse(&self, _coord: Coordinate) -> Result<Option<Place>, GeocodeError> {
        Ok(None)
    }
}

/// HTTP reverse geocoder against the Google geocoding API shape, with a
/// small LRU cache keyed by coordinate rounded to 1e-4 degrees (~11 m),
/// close enough for overnight-stop naming.
pub struct HttpGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Mutex<LruCache<(i64, i64), Option<Place>>>,
}

impl HttpGeocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn cache_key(coord: Coordinate) -> (i64, i64) {
        ((coord.lat * 1e4).round() as i64, (coord.lon * 1e4).round() as i64)
    }

    fn cache_get(&self, key: (i64, i64)) -> Option<Option<Place>> {
        self.cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(&key).cloned())
    }

    fn cache_put(&self, key: (i64, i64), value: Option<Place>) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, value);
        }
    }
}

#[async_trait]
impl ReverseGeocoder for HttpGeocoder {
    async fn reverse(&self, coord: Coordinate) -> Result<Option<Place>, GeocodeError> {
        let key = Self::cache_key(coord);
        if let Some(hit) = self.cache_get(key) {
            return Ok(hit);
        }

        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latlng", format!("{},{}", coord.lat, coord.lon)),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;

        let place = match body.status.as_str() {
            "OK" => body.results.into_iter().next().map(result_to_place),
            "ZERO_RESULTS" => None,
            other => return Err(GeocodeError::Upstream(other.to_string())),
        };

        self.cache_put(key, place.clone());
        Ok(place)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    types: Vec<String>,
}

fn result_to_place(result: GeocodeResult) -> Place {
    let component = |kind: &str| {
        result
            .address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == kind))
    };

    Place {
        town: component("locality").map(|c| c.long_name.clone()),
        state: component("administrative_area_level_1").map(|c| c.short_name.clone()),
        country: component("country").map(|c| c.short_name.clone()),
        formatted_address: result.formatted_address,
    }
}
