//! Protected-area dataset loading from a GeoJSON FeatureCollection.

use anyhow::{bail, Context, Result};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// A single protected-area geometry with optional site name for diagnostics.
#[derive(Debug, Clone)]
pub struct ProtectedArea {
    pub name: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl ProtectedArea {
    /// Get the bounding box of this area
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        use geo::BoundingRect;
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<CrsSpec>,
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct CrsSpec {
    properties: CrsProperties,
}

#[derive(Debug, Deserialize)]
struct CrsProperties {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<GeometrySpec>,
    #[serde(default)]
    properties: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeometrySpec {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// GeoJSON positions: [lon, lat] plus optional altitude, which we drop.
type RingCoords = Vec<Vec<f64>>;
type PolygonCoords = Vec<RingCoords>;

/// Load protected areas from a GeoJSON file.
///
/// Fatal if the file cannot be read or is not a parseable FeatureCollection
/// in the WGS84 frame. Individual features with null, empty, or non-areal
/// geometries are skipped with a warning rather than failing the load; the
/// buffer radius only makes sense in frame-local degrees, so a dataset that
/// declares any other reference frame is rejected outright.
pub fn load_protected_areas(path: &Path) -> Result<Vec<ProtectedArea>> {
    info!("Loading protected areas from {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read protected-area dataset {}", path.display()))?;
    let areas = parse_feature_collection(&content)
        .with_context(|| format!("Failed to parse protected-area dataset {}", path.display()))?;

    info!("Protected-area dataset loaded with {} records", areas.len());
    Ok(areas)
}

fn parse_feature_collection(content: &str) -> Result<Vec<ProtectedArea>> {
    let collection: FeatureCollection =
        serde_json::from_str(content).context("not valid GeoJSON")?;

    if collection.kind != "FeatureCollection" {
        bail!("expected a FeatureCollection, got '{}'", collection.kind);
    }

    if let Some(crs) = &collection.crs {
        if !is_wgs84(&crs.properties.name) {
            bail!(
                "dataset declares reference frame '{}'; only WGS84 (EPSG:4326) is supported",
                crs.properties.name
            );
        }
    }

    let mut areas = Vec::new();
    let mut skipped = 0usize;

    for feature in collection.features {
        let name = feature.properties.as_ref().and_then(site_name);

        let Some(geom) = feature.geometry else {
            skipped += 1;
            continue;
        };

        match convert_geometry(&geom) {
            Some(geometry) => areas.push(ProtectedArea { name, geometry }),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} features with null or non-areal geometry", skipped);
    }

    Ok(areas)
}

/// Accepted spellings of the WGS84 frame in a legacy GeoJSON `crs` member.
fn is_wgs84(name: &str) -> bool {
    matches!(
        name,
        "urn:ogc:def:crs:OGC:1.3:CRS84"
            | "urn:ogc:def:crs:OGC::CRS84"
            | "urn:ogc:def:crs:EPSG::4326"
            | "EPSG:4326"
            | "CRS84"
    )
}

fn site_name(properties: &serde_json::Value) -> Option<String> {
    // Natura 2000 exports carry SITENAME; fall back to a generic name key
    properties
        .get("SITENAME")
        .or_else(|| properties.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn convert_geometry(spec: &GeometrySpec) -> Option<MultiPolygon<f64>> {
    match spec.kind.as_str() {
        "Polygon" => {
            let coords: PolygonCoords = serde_json::from_value(spec.coordinates.clone()).ok()?;
            convert_polygon(&coords).map(|p| MultiPolygon(vec![p]))
        }
        "MultiPolygon" => {
            let coords: Vec<PolygonCoords> =
                serde_json::from_value(spec.coordinates.clone()).ok()?;
            let polygons: Vec<Polygon<f64>> =
                coords.iter().filter_map(|p| convert_polygon(p)).collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon(polygons))
            }
        }
        other => {
            warn!("Ignoring feature with non-areal geometry type '{}'", other);
            None
        }
    }
}

fn convert_polygon(coords: &PolygonCoords) -> Option<Polygon<f64>> {
    let mut rings = coords.iter().map(|ring| convert_ring(ring));
    let exterior = rings.next()??;
    let mut dropped = 0usize;
    let mut interiors: Vec<LineString<f64>> = Vec::new();
    for ring in rings {
        match ring {
            Some(ring) => interiors.push(ring),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        // dropping a hole enlarges the polygon, worth a trace
        warn!("Dropped {} degenerate interior rings from a polygon", dropped);
    }
    Some(Polygon::new(exterior, interiors))
}

fn convert_ring(ring: &RingCoords) -> Option<LineString<f64>> {
    // A closed ring needs at least 4 positions
    if ring.len() < 4 {
        return None;
    }
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| Coord {
            x: position[0],
            y: position[1],
        })
        .collect();
    if coords.len() < 4 {
        return None;
    }
    Some(LineString::new(coords))
}
