//! Run configuration: file paths, proximity radius, and the geocoding credential.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable holding the Google Geocoding API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Everything a single run needs, resolved up front.
///
/// Passed explicitly through the pipeline so nothing reads ambient
/// process state after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON array of `{id, address}` records.
    pub addresses_path: PathBuf,
    /// GeoJSON FeatureCollection of protected-area polygons.
    pub areas_path: PathBuf,
    /// CSV output path.
    pub output_path: PathBuf,
    /// Proximity radius in WGS84 degrees.
    pub radius_degrees: f64,
    /// Geocoding API credential.
    pub api_key: String,
}

impl Config {
    /// Read the geocoding credential from the environment.
    pub fn api_key_from_env() -> Result<String> {
        std::env::var(API_KEY_ENV)
            .with_context(|| format!("{} environment variable not set", API_KEY_ENV))
    }
}
