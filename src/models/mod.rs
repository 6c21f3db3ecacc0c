//! Core data models for extraction.

pub mod entity;
pub mod location;

pub use entity::{
    Entity, EntityKind, Kinds, Member, MemberId, Node, NodeId, Relation, RelationId, Tags, Way,
    WayId,
};
pub use location::{format_coordinate, BoundingBox, Location, COORDINATE_PRECISION};
