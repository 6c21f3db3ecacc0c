//! Error types for boundary loading and extraction.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Ring with fewer than 4 corners or with first and last corners that differ.
    #[error("Malformed ring: {0}")]
    MalformedRing(String),

    /// Inner ring whose bounding box leaves the outer ring's bounding box.
    #[error("Inner ring {ring} of polygon '{polygon}' is not inside its outer ring")]
    HoleOutsideOuter { polygon: String, ring: usize },

    /// Boundary document is valid JSON but not a usable boundary.
    #[error("Invalid boundary: {0}")]
    Boundary(String),

    /// Boundary document is not valid GeoJSON.
    #[error("Boundary parse error: {0}")]
    BoundaryParse(#[from] geojson::Error),

    /// The entity stream could not be opened or decoded.
    #[error("Stream read error: {0}")]
    StreamRead(#[source] BoxError),

    /// The output stream rejected an entity.
    #[error("Stream write error: {0}")]
    StreamWrite(#[source] BoxError),

    /// Node location store failure.
    #[error("Location store error: {0}")]
    LocationStore(#[from] sled::Error),

    /// Stored node location with an unexpected encoding.
    #[error("Corrupt location record for node {0}")]
    CorruptLocation(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<osmpbfreader::Error> for Error {
    fn from(err: osmpbfreader::Error) -> Self {
        Error::StreamRead(Box::new(err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::StreamWrite(Box::new(err))
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
