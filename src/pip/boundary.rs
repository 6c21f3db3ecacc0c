//! Boundary polygons loaded from GeoJSON.

use std::fs;
use std::path::Path;

use geojson::{Feature, GeoJson, Geometry, PolygonType, Value};
use tracing::{debug, info, warn};

use super::Polygon;
use crate::error::{Error, Result};
use crate::models::BoundingBox;

/// Load boundary polygons from a GeoJSON file
pub fn load_boundaries<P: AsRef<Path>>(path: P) -> Result<Vec<Polygon>> {
    let path = path.as_ref();
    info!("Loading boundaries from {}", path.display());

    let content = fs::read_to_string(path)?;
    parse_boundaries(&content)
}

/// Parse boundary polygons from a GeoJSON document.
///
/// Accepts a `FeatureCollection`, a single `Feature` or a bare geometry. Every
/// `Polygon` becomes one named polygon; `MultiPolygon` parts and
/// `GeometryCollection` members share the feature name.
pub fn parse_boundaries(json: &str) -> Result<Vec<Polygon>> {
    let geojson = json.parse::<GeoJson>()?;

    let mut polygons = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for (i, feature) in collection.features.into_iter().enumerate() {
                push_feature(&mut polygons, feature, i)?;
            }
        }
        GeoJson::Feature(feature) => push_feature(&mut polygons, feature, 0)?,
        GeoJson::Geometry(geometry) => push_geometry(&mut polygons, &default_name(0), geometry)?,
    }

    if polygons.is_empty() {
        return Err(Error::Boundary(
            "document contains no Polygon or MultiPolygon geometry".to_string(),
        ));
    }

    for polygon in &polygons {
        debug!(
            "Boundary '{}': {} corners, {} holes",
            polygon.name(),
            polygon.outer().corners().len(),
            polygon.inners().len()
        );
    }
    info!("Loaded {} boundary polygons", polygons.len());

    Ok(polygons)
}

/// Union of the polygons' bounding boxes
pub fn boundaries_bbox(polygons: &[Polygon]) -> Option<BoundingBox> {
    let mut iter = polygons.iter();
    let mut bbox = iter.next()?.bbox();
    for polygon in iter {
        bbox.merge(&polygon.bbox());
    }
    Some(bbox)
}

fn default_name(index: usize) -> String {
    format!("polygon-{}", index + 1)
}

fn push_feature(polygons: &mut Vec<Polygon>, mut feature: Feature, index: usize) -> Result<()> {
    let name = feature
        .property("name")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| default_name(index));

    match feature.geometry.take() {
        Some(geometry) => push_geometry(polygons, &name, geometry),
        None => {
            warn!("Skipping feature '{}' without geometry", name);
            Ok(())
        }
    }
}

fn push_geometry(polygons: &mut Vec<Polygon>, name: &str, geometry: Geometry) -> Result<()> {
    match geometry.value {
        Value::Polygon(rings) => polygons.push(build_polygon(name, rings)?),
        Value::MultiPolygon(parts) => {
            for rings in parts {
                polygons.push(build_polygon(name, rings)?);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                push_geometry(polygons, name, geometry)?;
            }
        }
        Value::Point(_) | Value::MultiPoint(_) | Value::LineString(_) | Value::MultiLineString(_) => {
            warn!("Skipping non-polygon geometry of '{}'", name);
        }
    }
    Ok(())
}

/// Convert through `geo-types`, which silently closes open rings, so closure is
/// checked on the raw positions first.
fn build_polygon(name: &str, rings: PolygonType) -> Result<Polygon> {
    if rings.is_empty() {
        return Err(Error::Boundary(format!("polygon '{}' has no rings", name)));
    }
    for ring in &rings {
        check_ring(ring)?;
    }

    let polygon = geo_types::Polygon::<f64>::try_from(Value::Polygon(rings))?;
    Polygon::from_geo(name, &polygon)
}

fn check_ring(ring: &[Vec<f64>]) -> Result<()> {
    if let Some(position) = ring.iter().find(|position| position.len() < 2) {
        return Err(Error::Boundary(format!(
            "position needs longitude and latitude, got {:?}",
            position
        )));
    }
    if ring.len() < 4 {
        return Err(Error::MalformedRing(format!(
            "expected at least 4 corners, got {}",
            ring.len()
        )));
    }
    if ring.first() != ring.last() {
        return Err(Error::MalformedRing(
            "first and last positions do not match".to_string(),
        ));
    }
    Ok(())
}
