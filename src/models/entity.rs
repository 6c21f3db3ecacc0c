//! Entities flowing through the extraction stream.

use serde::Serialize;

use super::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WayId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelationId(pub i64);

/// Key/value tags, in source order
pub type Tags = Vec<(String, String)>;

/// Kind of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::Way => write!(f, "way"),
            EntityKind::Relation => write!(f, "relation"),
        }
    }
}

/// Set of entity kinds a stream is asked to yield.
///
/// Sources may use it to skip work, but are free to yield every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kinds {
    pub nodes: bool,
    pub ways: bool,
    pub relations: bool,
}

impl Kinds {
    pub const ALL: Kinds = Kinds {
        nodes: true,
        ways: true,
        relations: true,
    };
    pub const NODES: Kinds = Kinds {
        nodes: true,
        ways: false,
        relations: false,
    };
    pub const WAYS: Kinds = Kinds {
        nodes: false,
        ways: true,
        relations: false,
    };
    pub const RELATIONS: Kinds = Kinds {
        nodes: false,
        ways: false,
        relations: true,
    };

    pub fn contains(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Node => self.nodes,
            EntityKind::Way => self.ways,
            EntityKind::Relation => self.relations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub location: Location,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: WayId,
    pub nodes: Vec<NodeId>,
    pub tags: Tags,
}

/// Reference from a relation to one of its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberId {
    Node(NodeId),
    Way(WayId),
    Relation(RelationId),
}

impl MemberId {
    pub fn kind(&self) -> EntityKind {
        match self {
            MemberId::Node(_) => EntityKind::Node,
            MemberId::Way(_) => EntityKind::Way,
            MemberId::Relation(_) => EntityKind::Relation,
        }
    }

    pub fn raw_id(&self) -> i64 {
        match self {
            MemberId::Node(id) => id.0,
            MemberId::Way(id) => id.0,
            MemberId::Relation(id) => id.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: RelationId,
    pub members: Vec<Member>,
    pub tags: Tags,
}

/// One element of the entity stream
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Node(_) => EntityKind::Node,
            Entity::Way(_) => EntityKind::Way,
            Entity::Relation(_) => EntityKind::Relation,
        }
    }
}
