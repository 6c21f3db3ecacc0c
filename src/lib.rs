//! Geofence - polygon-bounded extraction of OSM data
//!
//! Reads an OSM entity stream several times and keeps the nodes inside a set of
//! boundary polygons, every way touching them (with all of its nodes), and every
//! relation with a kept member.

pub mod error;
pub mod filter;
pub mod models;
pub mod pip;
pub mod stream;

pub use error::{Error, Result};
pub use filter::{ExtractOptions, ExtractReport, Extractor};
pub use models::{Entity, Location};
pub use pip::Polygon;
