//! Address resolution via the Google Geocoding API.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Coordinate;

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Why a single address failed to resolve. Never fatal to the run; the
/// affected address is logged and skipped.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The service answered but reported no usable match.
    #[error("geocoder returned status {status}")]
    NoMatch { status: String },
    /// The service was unreachable or errored at the transport level.
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body could not be interpreted as a coordinate.
    #[error("geocoder response malformed: {0}")]
    Malformed(String),
}

/// Resolves a free-text address into a coordinate.
///
/// A trait seam so the pipeline can be exercised without the network.
pub trait AddressResolver {
    fn resolve(
        &self,
        address: &str,
    ) -> impl std::future::Future<Output = Result<Coordinate, ResolveError>> + Send;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

/// Google Geocoding API client.
pub struct GeocodeClient {
    client: Client,
    api_key: String,
}

impl GeocodeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Laurel/0.1 (protected-area proximity)")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            api_key,
        }
    }
}

impl AddressResolver for GeocodeClient {
    /// Look up an address and return the service's first (best) match.
    ///
    /// Tie-breaking among candidates defers entirely to the service's own
    /// ranking; results beyond the first are ignored.
    async fn resolve(&self, address: &str) -> Result<Coordinate, ResolveError> {
        let response = self
            .client
            .get(GEOCODE_ENDPOINT)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let data: GeocodeResponse = serde_json::from_str(&body)
            .map_err(|e| ResolveError::Malformed(e.to_string()))?;

        if data.status != "OK" {
            warn!("Geocode failed for address '{}': {}", address, data.status);
            return Err(ResolveError::NoMatch {
                status: data.status,
            });
        }

        let location = data
            .results
            .first()
            .map(|r| &r.geometry.location)
            .ok_or_else(|| {
                ResolveError::Malformed("status OK but result list is empty".to_string())
            })?;

        let coordinate = Coordinate::new(location.lat, location.lng).ok_or_else(|| {
            ResolveError::Malformed(format!(
                "coordinate ({}, {}) outside WGS84 range",
                location.lat, location.lng
            ))
        })?;

        info!("Address '{}' resolved to {}", address, coordinate);
        Ok(coordinate)
    }
}
