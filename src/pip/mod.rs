//! Point-in-Polygon (PIP) geometry.
//!
//! Rings and polygons with an exact integer containment test, GeoJSON boundary
//! loading, and an R-tree index narrowing the candidate polygons for a point.

mod boundary;
mod index;
mod polygon;
mod ring;

pub use boundary::{boundaries_bbox, load_boundaries, parse_boundaries};
pub use index::SpatialIndex;
pub use polygon::Polygon;
pub use ring::Ring;
