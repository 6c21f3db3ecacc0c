//! Membership sets accumulated across extraction passes.

use hashbrown::HashSet;

use super::LocationStore;
use crate::error::Result;
use crate::models::{Location, NodeId, RelationId, WayId};

/// Which entities an extraction keeps.
///
/// Every set only grows; marking an id twice is a no-op. Not synchronized: one
/// pass writes at a time.
#[derive(Debug)]
pub struct Membership<L> {
    inside_nodes: L,
    outside_required_nodes: HashSet<NodeId>,
    resolved_required_nodes: HashSet<NodeId>,
    inside_ways: HashSet<WayId>,
    inside_relations: HashSet<RelationId>,
}

impl<L: LocationStore> Membership<L> {
    /// Empty membership recording inside node locations in `store`
    pub fn new(store: L) -> Self {
        Self {
            inside_nodes: store,
            outside_required_nodes: HashSet::new(),
            resolved_required_nodes: HashSet::new(),
            inside_ways: HashSet::new(),
            inside_relations: HashSet::new(),
        }
    }

    /// Returns `true` if the node was not already inside.
    pub fn mark_inside_node(&mut self, id: NodeId, loc: Location) -> Result<bool> {
        self.inside_nodes.insert(id, loc)
    }

    pub fn is_inside_node(&self, id: NodeId) -> Result<bool> {
        Ok(self.inside_nodes.get(id)?.is_some())
    }

    pub fn mark_outside_required_node(&mut self, id: NodeId) -> bool {
        self.outside_required_nodes.insert(id)
    }

    pub fn is_outside_required_node(&self, id: NodeId) -> bool {
        self.outside_required_nodes.contains(&id)
    }

    /// Record that a required node was actually present in the stream.
    pub fn mark_required_resolved(&mut self, id: NodeId) -> bool {
        self.resolved_required_nodes.insert(id)
    }

    pub fn mark_inside_way(&mut self, id: WayId) -> bool {
        self.inside_ways.insert(id)
    }

    pub fn is_inside_way(&self, id: WayId) -> bool {
        self.inside_ways.contains(&id)
    }

    pub fn mark_inside_relation(&mut self, id: RelationId) -> bool {
        self.inside_relations.insert(id)
    }

    pub fn is_inside_relation(&self, id: RelationId) -> bool {
        self.inside_relations.contains(&id)
    }

    /// Inside or required by a kept way
    pub fn keeps_node(&self, id: NodeId) -> Result<bool> {
        Ok(self.is_outside_required_node(id) || self.is_inside_node(id)?)
    }

    pub fn inside_node_count(&self) -> usize {
        self.inside_nodes.len()
    }

    pub fn outside_required_count(&self) -> usize {
        self.outside_required_nodes.len()
    }

    pub fn resolved_required_count(&self) -> usize {
        self.resolved_required_nodes.len()
    }

    pub fn inside_way_count(&self) -> usize {
        self.inside_ways.len()
    }

    pub fn inside_relation_count(&self) -> usize {
        self.inside_relations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MemoryLocations;

    #[test]
    fn test_marks_are_idempotent() {
        let mut m = Membership::new(MemoryLocations::new());
        let loc = Location::new(1.0, 2.0);

        assert!(m.mark_inside_node(NodeId(1), loc).unwrap());
        assert!(!m.mark_inside_node(NodeId(1), loc).unwrap());
        assert!(m.mark_outside_required_node(NodeId(2)));
        assert!(!m.mark_outside_required_node(NodeId(2)));
        assert!(m.mark_inside_way(WayId(1)));
        assert!(!m.mark_inside_way(WayId(1)));
        assert!(m.mark_inside_relation(RelationId(1)));
        assert!(!m.mark_inside_relation(RelationId(1)));

        assert_eq!(m.inside_node_count(), 1);
        assert_eq!(m.outside_required_count(), 1);
        assert_eq!(m.inside_way_count(), 1);
        assert_eq!(m.inside_relation_count(), 1);
    }

    #[test]
    fn test_identifier_spaces_are_disjoint() {
        let mut m = Membership::new(MemoryLocations::new());
        m.mark_inside_way(WayId(5));

        assert!(m.is_inside_way(WayId(5)));
        assert!(!m.is_inside_node(NodeId(5)).unwrap());
        assert!(!m.is_inside_relation(RelationId(5)));
    }

    #[test]
    fn test_keeps_node() {
        let mut m = Membership::new(MemoryLocations::new());
        m.mark_inside_node(NodeId(1), Location::new(0.0, 0.0)).unwrap();
        m.mark_outside_required_node(NodeId(2));

        assert!(m.keeps_node(NodeId(1)).unwrap());
        assert!(m.keeps_node(NodeId(2)).unwrap());
        assert!(!m.keeps_node(NodeId(3)).unwrap());
        assert!(!m.is_inside_node(NodeId(2)).unwrap());
    }
}
