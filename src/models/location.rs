//! Fixed-precision coordinates and bounding boxes.

use serde::Serialize;

/// Number of coordinate units per degree.
pub const COORDINATE_PRECISION: i32 = 10_000_000;

/// A (longitude, latitude) pair stored as integers in 1e-7 degree units.
///
/// Equality is exact, which is what ring closure checks rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    x: i32,
    y: i32,
}

impl Location {
    /// Build a location from degrees, rounding to the nearest unit.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            x: degrees_to_fixed(lon),
            y: degrees_to_fixed(lat),
        }
    }

    /// Build a location from raw 1e-7 degree units (the PBF `decimicro` encoding).
    pub const fn from_decimicro(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }

    pub fn lon(&self) -> f64 {
        f64::from(self.x) / f64::from(COORDINATE_PRECISION)
    }

    pub fn lat(&self) -> f64 {
        f64::from(self.y) / f64::from(COORDINATE_PRECISION)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})",
            format_coordinate(self.x),
            format_coordinate(self.y)
        )
    }
}

fn degrees_to_fixed(value: f64) -> i32 {
    // `as` saturates out-of-range values
    (value * f64::from(COORDINATE_PRECISION)).round() as i32
}

/// Render a fixed coordinate as decimal degrees without going through `f64`.
pub fn format_coordinate(value: i32) -> String {
    let precision = i64::from(COORDINATE_PRECISION);
    let abs = i64::from(value).abs();
    let sign = if value < 0 { "-" } else { "" };
    let whole = abs / precision;
    let fraction = abs % precision;

    if fraction == 0 {
        return format!("{}{}", sign, whole);
    }

    let digits = format!("{:07}", fraction);
    format!("{}{}.{}", sign, whole, digits.trim_end_matches('0'))
}

/// Axis-aligned bounding box, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub min: Location,
    pub max: Location,
}

impl BoundingBox {
    /// Degenerate box around a single location.
    pub fn from_location(loc: Location) -> Self {
        Self { min: loc, max: loc }
    }

    /// Smallest box covering every location, `None` for an empty input.
    pub fn from_locations<'a, I>(locations: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut iter = locations.into_iter();
        let mut bbox = Self::from_location(*iter.next()?);
        for loc in iter {
            bbox.extend(*loc);
        }
        Some(bbox)
    }

    pub fn extend(&mut self, loc: Location) {
        self.min.x = self.min.x.min(loc.x);
        self.min.y = self.min.y.min(loc.y);
        self.max.x = self.max.x.max(loc.x);
        self.max.y = self.max.y.max(loc.y);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        self.extend(other.min);
        self.extend(other.max);
    }

    pub fn contains(&self, loc: Location) -> bool {
        loc.x >= self.min.x && loc.y >= self.min.y && loc.x <= self.max.x && loc.y <= self.max.y
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_round_to_nearest_unit() {
        let loc = Location::new(2.30, 48.83);
        assert_eq!(loc.x(), 23_000_000);
        assert_eq!(loc.y(), 488_300_000);

        let loc = Location::new(-0.00000006, 0.00000004);
        assert_eq!(loc.x(), -1);
        assert_eq!(loc.y(), 0);
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(0), "0");
        assert_eq!(format_coordinate(200_000_000), "20");
        assert_eq!(format_coordinate(23_414_612), "2.3414612");
        assert_eq!(format_coordinate(-1_230_000), "-0.123");
        assert_eq!(format_coordinate(i32::MIN), "-214.7483648");
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(2.34, 48.86).to_string(), "(2.34,48.86)");
    }

    #[test]
    fn test_bbox_is_inclusive() {
        let bbox = BoundingBox::from_locations(&[Location::new(0.0, 0.0), Location::new(2.0, 1.0)])
            .unwrap();

        assert!(bbox.contains(Location::new(0.0, 0.0)));
        assert!(bbox.contains(Location::new(2.0, 1.0)));
        assert!(bbox.contains(Location::new(1.0, 0.5)));
        assert!(!bbox.contains(Location::new(2.0000001, 1.0)));
        assert!(!bbox.contains(Location::new(1.0, -0.0000001)));
    }

    #[test]
    fn test_bbox_contains_box() {
        let outer =
            BoundingBox::from_locations(&[Location::new(0.0, 0.0), Location::new(10.0, 10.0)])
                .unwrap();
        let inner =
            BoundingBox::from_locations(&[Location::new(2.0, 2.0), Location::new(10.0, 4.0)])
                .unwrap();
        let straddling =
            BoundingBox::from_locations(&[Location::new(8.0, 8.0), Location::new(12.0, 9.0)])
                .unwrap();

        assert!(outer.contains_box(&inner));
        assert!(!outer.contains_box(&straddling));
        assert!(BoundingBox::from_locations(&[] as &[Location]).is_none());
    }
}
