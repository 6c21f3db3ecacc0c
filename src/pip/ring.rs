//! Closed rings and the winding-number containment test.

use crate::error::{Error, Result};
use crate::models::{BoundingBox, Location};

/// A closed polygonal boundary: at least 4 corners, first corner equal to the last.
#[derive(Debug, Clone)]
pub struct Ring {
    corners: Vec<Location>,
    bbox: BoundingBox,
}

impl Ring {
    pub fn new(corners: Vec<Location>) -> Result<Self> {
        if corners.len() < 4 {
            return Err(Error::MalformedRing(format!(
                "expected at least 4 corners, got {}",
                corners.len()
            )));
        }

        let (first, last) = (corners[0], corners[corners.len() - 1]);
        if first != last {
            return Err(Error::MalformedRing(format!(
                "first corner {} and last corner {} do not match",
                first, last
            )));
        }

        let bbox = BoundingBox::from_locations(&corners)
            .ok_or_else(|| Error::MalformedRing("ring has no corners".to_string()))?;

        Ok(Self { corners, bbox })
    }

    pub fn corners(&self) -> &[Location] {
        &self.corners
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Point-in-ring test.
    ///
    /// Bottom and left boundaries count as inside, top and right boundaries as
    /// outside.
    pub fn contains(&self, loc: Location) -> bool {
        self.bbox.contains(loc) && self.winding_number(loc) != 0
    }

    fn winding_number(&self, loc: Location) -> i32 {
        let mut wn = 0;

        for edge in self.corners.windows(2) {
            let (start, end) = (edge[0], edge[1]);
            if start.y() <= loc.y() {
                // Upward crossing with loc strictly left of the edge
                if end.y() > loc.y() && side(loc, start, end) > 0 {
                    wn += 1;
                }
            } else if end.y() <= loc.y() && side(loc, start, end) < 0 {
                // Downward crossing with loc strictly right of the edge
                wn -= 1;
            }
        }

        wn
    }
}

/// Z component of (start->end) x (start->point).
///
/// Positive when `point` is left of the directed line, negative when right, 0 on it.
fn side(point: Location, start: Location, end: Location) -> i128 {
    let u_x = i64::from(end.x()) - i64::from(start.x());
    let u_y = i64::from(end.y()) - i64::from(start.y());
    let v_x = i64::from(point.x()) - i64::from(start.x());
    let v_y = i64::from(point.y()) - i64::from(start.y());

    i128::from(u_x) * i128::from(v_y) - i128::from(u_y) * i128::from(v_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::new(coords.iter().map(|&(x, y)| Location::new(x, y)).collect()).unwrap()
    }

    fn unit_box() -> Ring {
        ring(&[(0.0, 0.0), (20.0, 0.0), (20.0, 50.0), (0.0, 50.0), (0.0, 0.0)])
    }

    fn lozenge() -> Ring {
        ring(&[(20.0, 0.0), (0.0, 40.0), (-20.0, 0.0), (0.0, -40.0), (20.0, 0.0)])
    }

    /// Even-odd crossing count, used as an independent reference.
    fn crossing_reference(ring: &Ring, loc: Location) -> bool {
        let (px, py) = (loc.lon(), loc.lat());
        let mut inside = false;
        for edge in ring.corners().windows(2) {
            let (ax, ay) = (edge[0].lon(), edge[0].lat());
            let (bx, by) = (edge[1].lon(), edge[1].lat());
            if (ay > py) != (by > py) {
                let x_cross = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    #[test]
    fn test_rejects_short_ring() {
        let corners = vec![
            Location::new(0.0, 0.0),
            Location::new(1.0, 0.0),
            Location::new(0.0, 0.0),
        ];
        assert!(matches!(Ring::new(corners), Err(Error::MalformedRing(_))));
    }

    #[test]
    fn test_rejects_open_ring() {
        let corners = vec![
            Location::new(0.0, 0.0),
            Location::new(1.0, 0.0),
            Location::new(1.0, 1.0),
            Location::new(0.0, 1.0),
        ];
        assert!(matches!(Ring::new(corners), Err(Error::MalformedRing(_))));
    }

    #[test]
    fn test_bbox() {
        let bbox = lozenge().bbox();
        assert_eq!(bbox.min, Location::new(-20.0, -40.0));
        assert_eq!(bbox.max, Location::new(20.0, 40.0));
    }

    #[test]
    fn test_box_corners() {
        let r = unit_box();
        assert!(r.contains(Location::new(0.0, 0.0)));
        // Upper horizontal and right-side boundaries are outside.
        assert!(!r.contains(Location::new(0.0, 50.0)));
        assert!(!r.contains(Location::new(20.0, 0.0)));
        assert!(!r.contains(Location::new(20.0, 50.0)));
    }

    #[test]
    fn test_box_limits() {
        let r = unit_box();
        assert!(r.contains(Location::new(10.0, 0.0)));
        assert!(r.contains(Location::new(0.0, 43.0)));
        assert!(!r.contains(Location::new(27.0, 0.0)));
        assert!(!r.contains(Location::new(32.0, 50.0)));
        assert!(!r.contains(Location::new(10.0, 50.0)));
        assert!(!r.contains(Location::new(20.0, 25.0)));
    }

    #[test]
    fn test_box_inside_and_outside() {
        let r = unit_box();
        let mut i = 1.0;
        while i < 20.0 {
            let mut j = 1.0;
            while j < 50.0 {
                assert!(r.contains(Location::new(i, j)), "({}, {})", i, j);
                j += 5.0;
            }
            i += 2.0;
        }

        assert!(!r.contains(Location::new(-1.0, 0.0)));
        assert!(!r.contains(Location::new(21.0, 0.0)));
        assert!(!r.contains(Location::new(32.0, 51.0)));
        assert!(!r.contains(Location::new(4.0, -2.0)));
    }

    #[test]
    fn test_lozenge_corners() {
        let r = lozenge();
        assert!(r.contains(Location::new(-20.0, 0.0)));
        assert!(!r.contains(Location::new(20.0, 0.0)));
        assert!(!r.contains(Location::new(0.0, 40.0)));
        assert!(!r.contains(Location::new(0.0, -40.0)));
    }

    #[test]
    fn test_lozenge_limits() {
        let r = lozenge();
        assert!(r.contains(Location::new(-7.0, 26.0)));
        assert!(r.contains(Location::new(-18.0, 4.0)));
        assert!(r.contains(Location::new(-18.0, -4.0)));
        assert!(r.contains(Location::new(-2.0, -36.0)));
        // Right-side boundaries are outside.
        assert!(!r.contains(Location::new(10.0, 20.0)));
        assert!(!r.contains(Location::new(8.0, 24.0)));
        assert!(!r.contains(Location::new(3.0, -34.0)));
        assert!(!r.contains(Location::new(10.0, -20.0)));
    }

    #[test]
    fn test_lozenge_inside() {
        let r = lozenge();
        for (x, y) in [
            (0.0, 0.0),
            (12.0, 0.0),
            (10.0, 3.0),
            (0.0, 37.0),
            (-1.0, 28.0),
            (-19.0, 0.0),
            (-5.0, -5.0),
            (0.0, -22.0),
            (4.0, -3.0),
        ] {
            assert!(r.contains(Location::new(x, y)), "({}, {})", x, y);
        }
    }

    #[test]
    fn test_lozenge_outside() {
        let r = lozenge();
        for (x, y) in [
            // Outside the bounding box
            (21.0, 0.0),
            (0.0, 41.0),
            (-41.0, 0.0),
            (0.0, -41.0),
            (27.0, 32.0),
            (-18.0, 49.0),
            // In the bounding box, not in the ring
            (10.0, 21.0),
            (-1.0, 39.0),
            (-5.0, -31.0),
            (18.0, -5.0),
        ] {
            assert!(!r.contains(Location::new(x, y)), "({}, {})", x, y);
        }
    }

    #[test]
    fn test_irregular_ring() {
        let r = ring(&[
            (2.30, 48.83),
            (2.25, 48.84),
            (2.25, 48.86),
            (2.28, 48.87),
            (2.31, 48.86),
            (2.29, 48.88),
            (2.33, 48.88),
            (2.36, 48.87),
            (2.37, 48.86),
            (2.35, 48.85),
            (2.38, 48.84),
            (2.38, 48.83),
            (2.345, 48.83),
            (2.34, 48.835),
            (2.33, 48.828),
            (2.325, 48.82),
            (2.30, 48.83),
        ]);

        // Corners
        assert!(r.contains(Location::new(2.30, 48.83)));
        assert!(r.contains(Location::new(2.25, 48.84)));
        assert!(r.contains(Location::new(2.31, 48.86)));
        assert!(!r.contains(Location::new(2.28, 48.87)));
        assert!(!r.contains(Location::new(2.29, 48.88)));
        assert!(!r.contains(Location::new(2.38, 48.84)));

        // Vertical edges, left and right, and the upper horizontal edge.
        assert!(r.contains(Location::new(2.25, 48.85)));
        assert!(!r.contains(Location::new(2.38, 48.835)));
        assert!(!r.contains(Location::new(2.31, 48.88)));

        assert!(r.contains(Location::new(2.37999, 48.835)));
        assert!(r.contains(Location::new(2.3345947265625, 48.86990906900767)));
        assert!(r.contains(Location::new(2.3009490966796875, 48.833763586380556)));

        // In the bounding box but not in the ring.
        assert!(!r.contains(Location::new(2.255115509033203, 48.8664086168748)));
        assert!(!r.contains(Location::new(2.3476409912109375, 48.876683442021886)));
        assert!(!r.contains(Location::new(2.264556884765625, 48.82415805606007)));

        // Far away.
        assert!(!r.contains(Location::new(132.1875, -23.241346102386135)));
    }

    #[test]
    fn test_outside_bbox_never_contained() {
        let r = lozenge();
        let bbox = r.bbox();
        for x in -30..=30 {
            for y in -50..=50 {
                let loc = Location::new(f64::from(x), f64::from(y));
                if !bbox.contains(loc) {
                    assert!(!r.contains(loc), "{}", loc);
                }
            }
        }
    }

    #[test]
    fn test_matches_crossing_reference_on_convex_rings() {
        let rings = [
            unit_box(),
            lozenge(),
            ring(&[(-3.0, -1.0), (4.0, -2.0), (5.0, 3.0), (1.0, 6.0), (-2.0, 4.0), (-3.0, -1.0)]),
        ];

        for r in &rings {
            // Offset grid so no sample lands on an edge or vertex.
            for i in 0..60 {
                for j in 0..120 {
                    let loc = Location::new(-29.69 + f64::from(i), -59.83 + f64::from(j));
                    assert_eq!(r.contains(loc), crossing_reference(r, loc), "{}", loc);
                }
            }
        }
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let clockwise = ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
        assert!(clockwise.contains(Location::new(5.0, 5.0)));
        assert!(!clockwise.contains(Location::new(15.0, 5.0)));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let r = ring(&[
            (-180.0, -90.0),
            (180.0, -90.0),
            (180.0, 90.0),
            (-180.0, 90.0),
            (-180.0, -90.0),
        ]);
        assert!(r.contains(Location::new(179.9, 89.9)));
        assert!(r.contains(Location::new(-179.9, -89.9)));
        assert!(!r.contains(Location::new(180.0, 0.0)));
    }
}
