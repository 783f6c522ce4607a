//! Spatial index answering the "near a protected area?" predicate.

use geo::{Intersects, Point, Polygon};
use geo_types::{Coord, LineString};
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::ProtectedArea;
use crate::models::Coordinate;

/// The "1 km" proximity radius, approximated as a fixed angular buffer in
/// WGS84 degrees.
///
/// Deliberate simplification: true
/// ground distance per degree of longitude shrinks toward the poles, so the
/// effective radius varies with latitude. Callers needing uniform metric
/// accuracy must reproject into a planar frame before buffering.
pub const DEFAULT_BUFFER_DEGREES: f64 = 0.01;

/// Vertex count of the circle approximation used for proximity buffers.
const BUFFER_SEGMENTS: usize = 32;

/// Wrapper for R-tree indexing of protected areas
#[derive(Clone)]
pub struct IndexedArea {
    pub area: Arc<ProtectedArea>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedArea {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedArea {
    pub fn new(area: ProtectedArea) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = area.bbox()?;
        Some(Self {
            area: Arc::new(area),
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Read-only spatial index over the protected-area polygons.
///
/// Built once per run; queries never mutate it, so it is safely shareable.
pub struct ProximityIndex {
    tree: RTree<IndexedArea>,
}

impl ProximityIndex {
    /// Build the index from a protected-area collection.
    ///
    /// Areas whose geometry yields no bounding box (empty geometries) are
    /// skipped rather than failing the whole index.
    pub fn build(areas: Vec<ProtectedArea>) -> Self {
        info!("Building spatial index for {} protected areas...", areas.len());

        let indexed: Vec<IndexedArea> = areas.into_iter().filter_map(IndexedArea::new).collect();
        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// True iff a buffer of `radius_degrees` around the point intersects at
    /// least one protected-area polygon.
    ///
    /// The buffer is a [`BUFFER_SEGMENTS`]-gon inscribed approximation of the
    /// disk. A zero radius degenerates to a point-in-polygon test. An empty
    /// index always answers false.
    pub fn near(&self, point: Coordinate, radius_degrees: f64) -> bool {
        let center = Point::new(point.lon, point.lat);

        if radius_degrees <= 0.0 {
            let envelope = AABB::from_point([point.lon, point.lat]);
            return self
                .tree
                .locate_in_envelope_intersecting(&envelope)
                .any(|ia| ia.area.geometry.intersects(&center));
        }

        let buffer = buffer_polygon(center, radius_degrees);
        let envelope = AABB::from_corners(
            [point.lon - radius_degrees, point.lat - radius_degrees],
            [point.lon + radius_degrees, point.lat + radius_degrees],
        );

        // R-tree narrows to envelope candidates, exact intersection decides
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .any(|ia| buffer.intersects(&ia.area.geometry))
    }

    /// Number of indexed areas.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Inscribed polygon approximating the disk of `radius` around `center`.
fn buffer_polygon(center: Point<f64>, radius: f64) -> Polygon<f64> {
    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(BUFFER_SEGMENTS + 1);
    for i in 0..BUFFER_SEGMENTS {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (BUFFER_SEGMENTS as f64);
        ring.push(Coord {
            x: center.x() + radius * theta.cos(),
            y: center.y() + radius * theta.sin(),
        });
    }
    ring.push(ring[0]);
    Polygon::new(LineString::new(ring), vec![])
}
