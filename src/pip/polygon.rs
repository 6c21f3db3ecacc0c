//! Named polygons with holes.

use geo_types::{Coord, LineString};

use super::Ring;
use crate::error::{Error, Result};
use crate::models::{BoundingBox, Location};

/// One outer ring plus zero or more inner rings (holes).
#[derive(Debug, Clone)]
pub struct Polygon {
    name: String,
    outer: Ring,
    inners: Vec<Ring>,
}

impl Polygon {
    /// Build a polygon, rejecting holes whose bounding box leaves the outer one.
    pub fn new(name: impl Into<String>, outer: Ring, inners: Vec<Ring>) -> Result<Self> {
        let name = name.into();
        let outer_bbox = outer.bbox();

        if let Some(ring) = inners
            .iter()
            .position(|inner| !outer_bbox.contains_box(&inner.bbox()))
        {
            return Err(Error::HoleOutsideOuter {
                polygon: name,
                ring,
            });
        }

        Ok(Self {
            name,
            outer,
            inners,
        })
    }

    /// Convert an already-parsed `geo-types` polygon (x = longitude, y = latitude).
    pub fn from_geo(name: impl Into<String>, polygon: &geo_types::Polygon<f64>) -> Result<Self> {
        let outer = ring_from_line_string(polygon.exterior())?;
        let inners = polygon
            .interiors()
            .iter()
            .map(ring_from_line_string)
            .collect::<Result<Vec<_>>>()?;

        Self::new(name, outer, inners)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    pub fn inners(&self) -> &[Ring] {
        &self.inners
    }

    /// Inside the outer ring and outside every hole.
    pub fn contains(&self, loc: Location) -> bool {
        self.outer.contains(loc) && !self.inners.iter().any(|inner| inner.contains(loc))
    }

    /// Bounding box of the outer ring.
    pub fn bbox(&self) -> BoundingBox {
        self.outer.bbox()
    }
}

fn ring_from_line_string(line: &LineString<f64>) -> Result<Ring> {
    let corners = line
        .coords()
        .map(|&Coord { x, y }| Location::new(x, y))
        .collect();
    Ring::new(corners)
}
