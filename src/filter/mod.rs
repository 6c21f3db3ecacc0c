//! Geofenced selection of OSM entities.

mod locations;
mod membership;
mod pipeline;
mod report;

pub use locations::{DiskLocations, LocationStore, MemoryLocations};
pub use membership::Membership;
pub use pipeline::{ExtractOptions, Extractor, Pass, Selection};
pub use report::{EmittedCounts, ExtractReport, PassReport, PolygonReport};
