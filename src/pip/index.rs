//! Spatial index for fast candidate polygon lookups.

use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

use super::Polygon;
use crate::models::{BoundingBox, Location};

/// Wrapper for R-tree indexing of polygon bounding boxes
#[derive(Debug, Clone)]
struct IndexedPolygon {
    polygon: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPolygon {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPolygon {
    fn new(bbox: BoundingBox, polygon: usize) -> Self {
        Self {
            polygon,
            envelope: AABB::from_corners(envelope_point(bbox.min), envelope_point(bbox.max)),
        }
    }
}

/// Raw fixed units, which `f64` represents exactly, so box tests keep integer semantics.
fn envelope_point(loc: Location) -> [f64; 2] {
    [f64::from(loc.x()), f64::from(loc.y())]
}

/// Read-only R-tree over polygon bounding boxes.
///
/// Queries return every polygon whose box contains the point; callers still run
/// the exact containment test.
pub struct SpatialIndex {
    tree: RTree<IndexedPolygon>,
}

impl SpatialIndex {
    /// Bulk load the index from (bounding box, polygon index) entries
    pub fn build(entries: Vec<(BoundingBox, usize)>) -> Self {
        let indexed: Vec<IndexedPolygon> = entries
            .into_iter()
            .map(|(bbox, polygon)| IndexedPolygon::new(bbox, polygon))
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// Build spatial index over a polygon collection, keyed by position
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        Self::build(
            polygons
                .iter()
                .enumerate()
                .map(|(i, polygon)| (polygon.bbox(), i))
                .collect(),
        )
    }

    /// Candidate polygon indices whose bounding box contains `loc`
    pub fn query(&self, loc: Location) -> impl Iterator<Item = usize> + '_ {
        let query_envelope = AABB::from_point(envelope_point(loc));

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|ip| ip.polygon)
    }

    /// Get total number of indexed polygons
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pip::Ring;

    fn square(name: &str, min_x: f64, min_y: f64, size: f64) -> Polygon {
        let corners = [
            (min_x, min_y),
            (min_x + size, min_y),
            (min_x + size, min_y + size),
            (min_x, min_y + size),
            (min_x, min_y),
        ]
        .iter()
        .map(|&(x, y)| Location::new(x, y))
        .collect();
        Polygon::new(name, Ring::new(corners).unwrap(), vec![]).unwrap()
    }

    fn triangle(name: &str, x: f64, y: f64) -> Polygon {
        let corners = [(x, y), (x + 3.0, y + 1.0), (x + 1.0, y + 4.0), (x, y)]
            .iter()
            .map(|&(x, y)| Location::new(x, y))
            .collect();
        Polygon::new(name, Ring::new(corners).unwrap(), vec![]).unwrap()
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::from_polygons(&[]);
        assert!(index.is_empty());
        assert_eq!(index.query(Location::new(8.5, 47.4)).count(), 0);
    }

    #[test]
    fn test_query_candidates() {
        let polygons = vec![
            square("a", 0.0, 0.0, 10.0),
            square("b", 5.0, 5.0, 10.0),
            square("c", 50.0, 50.0, 1.0),
        ];
        let index = SpatialIndex::from_polygons(&polygons);
        assert_eq!(index.len(), 3);

        let mut hits: Vec<usize> = index.query(Location::new(7.0, 7.0)).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1]);

        let hits: Vec<usize> = index.query(Location::new(50.5, 50.5)).collect();
        assert_eq!(hits, vec![2]);

        assert_eq!(index.query(Location::new(30.0, 30.0)).count(), 0);
    }

    #[test]
    fn test_box_edges_are_candidates() {
        let polygons = vec![square("a", 0.0, 0.0, 10.0)];
        let index = SpatialIndex::from_polygons(&polygons);

        assert_eq!(index.query(Location::new(10.0, 10.0)).count(), 1);
        assert_eq!(index.query(Location::new(0.0, 0.0)).count(), 1);
        assert_eq!(index.query(Location::new(10.0000001, 10.0)).count(), 0);
    }

    #[test]
    fn test_no_false_negatives() {
        let mut polygons = Vec::new();
        for i in 0..12 {
            for j in 0..12 {
                let (x, y) = (f64::from(i) * 2.5, f64::from(j) * 2.5);
                polygons.push(triangle(&format!("t{}-{}", i, j), x, y));
            }
        }
        let index = SpatialIndex::from_polygons(&polygons);

        for i in 0..160 {
            for j in 0..160 {
                let loc = Location::new(-1.0 + f64::from(i) * 0.2, -1.0 + f64::from(j) * 0.2);
                let candidates: Vec<usize> = index.query(loc).collect();
                for (k, polygon) in polygons.iter().enumerate() {
                    if polygon.contains(loc) {
                        assert!(candidates.contains(&k), "{} missed polygon {}", loc, k);
                    }
                }
            }
        }
    }
}
