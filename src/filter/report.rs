//! Extraction statistics.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::BoundingBox;

/// Nodes attributed to one boundary polygon during the node pass
#[derive(Debug, Clone, Serialize)]
pub struct PolygonReport {
    pub name: String,
    pub nodes_inside: u64,
}

/// Entities written by the output pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmittedCounts {
    pub nodes: u64,
    pub ways: u64,
    pub relations: u64,
}

/// Entities read and time spent by one pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass: String,
    pub entities: u64,
    pub elapsed_ms: u64,
}

/// Counters collected over an extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    pub polygons: Vec<PolygonReport>,
    pub nodes_seen: u64,
    pub nodes_inside: u64,
    pub outside_required_nodes: u64,
    pub resolved_required_nodes: u64,
    /// Node ids referenced by kept ways but absent from the stream
    pub dangling_node_refs: u64,
    pub ways_seen: u64,
    pub ways_inside: u64,
    pub relations_seen: u64,
    pub relations_inside: u64,
    /// Extent of the nodes found inside a polygon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<BoundingBox>,
    pub emitted: EmittedCounts,
    pub passes: Vec<PassReport>,
}

impl ExtractReport {
    pub(crate) fn for_polygons<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            polygons: names
                .into_iter()
                .map(|name| PolygonReport {
                    name: name.to_string(),
                    nodes_inside: 0,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Write a summary to the log
    pub fn log(&self) {
        info!(
            "Kept {} of {} nodes inside ({} more required by ways)",
            self.nodes_inside, self.nodes_seen, self.resolved_required_nodes
        );
        info!("Kept {} of {} ways", self.ways_inside, self.ways_seen);
        info!(
            "Kept {} of {} relations",
            self.relations_inside, self.relations_seen
        );
        for polygon in &self.polygons {
            debug!("  {}: {} nodes", polygon.name, polygon.nodes_inside);
        }
        if self.dangling_node_refs > 0 {
            warn!(
                "{} node references from kept ways are missing from the input",
                self.dangling_node_refs
            );
        }
        info!(
            "Wrote {} nodes, {} ways, {} relations",
            self.emitted.nodes, self.emitted.ways, self.emitted.relations
        );
    }
}
