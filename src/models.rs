//! Core data types shared by the resolver, index, and pipeline.

use serde::{Deserialize, Serialize};

/// Geographic coordinate in WGS84 degrees (EPSG:4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the WGS84 valid range.
    ///
    /// Out-of-range values indicate an upstream resolver error and must not
    /// be fed into the spatial index.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(Self { lat, lon })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// One entry of the input address list.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRecord {
    pub id: i64,
    pub address: String,
}

/// An address record joined with its geocoded coordinate.
///
/// Only produced when resolution succeeds; failed addresses are dropped,
/// never defaulted to a sentinel coordinate.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub id: i64,
    pub coordinate: Coordinate,
}

/// One row of the output table.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub near_protected_area: bool,
}

impl ResultRow {
    pub fn new(location: &ResolvedLocation, near_protected_area: bool) -> Self {
        Self {
            id: location.id,
            latitude: location.coordinate.lat,
            longitude: location.coordinate.lon,
            near_protected_area,
        }
    }
}
