//! OSM PBF entity source.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use osmpbfreader::{OsmId, OsmObj, OsmPbfReader};
use tracing::debug;

use super::{EntitySource, EntityStream};
use crate::error::Result;
use crate::models::{
    Entity, EntityKind, Kinds, Location, Member, MemberId, Node, NodeId, Relation, RelationId,
    Tags, Way, WayId,
};

/// Entity source over an OSM PBF stream, rewound for every traversal.
pub struct PbfSource<R> {
    reader: OsmPbfReader<R>,
}

impl PbfSource<BufReader<File>> {
    /// Open a PBF file
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening PBF file {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> PbfSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: OsmPbfReader::new(reader),
        }
    }
}

impl<R: Read + Seek> EntitySource for PbfSource<R> {
    fn open(&mut self, kinds: Kinds) -> Result<EntityStream<'_>> {
        self.reader.rewind()?;

        Ok(Box::new(self.reader.iter().filter_map(move |obj| match obj {
            Ok(obj) if !kinds.contains(kind_of(&obj)) => None,
            Ok(obj) => Some(Ok(convert(obj))),
            Err(e) => Some(Err(e.into())),
        })))
    }
}

fn kind_of(obj: &OsmObj) -> EntityKind {
    match obj {
        OsmObj::Node(_) => EntityKind::Node,
        OsmObj::Way(_) => EntityKind::Way,
        OsmObj::Relation(_) => EntityKind::Relation,
    }
}

fn convert(obj: OsmObj) -> Entity {
    match obj {
        OsmObj::Node(node) => Entity::Node(Node {
            id: NodeId(node.id.0),
            location: Location::from_decimicro(node.decimicro_lon, node.decimicro_lat),
            tags: convert_tags(&node.tags),
        }),
        OsmObj::Way(way) => Entity::Way(Way {
            id: WayId(way.id.0),
            nodes: way.nodes.iter().map(|n| NodeId(n.0)).collect(),
            tags: convert_tags(&way.tags),
        }),
        OsmObj::Relation(rel) => Entity::Relation(Relation {
            id: RelationId(rel.id.0),
            members: rel
                .refs
                .iter()
                .map(|r| Member {
                    id: match r.member {
                        OsmId::Node(id) => MemberId::Node(NodeId(id.0)),
                        OsmId::Way(id) => MemberId::Way(WayId(id.0)),
                        OsmId::Relation(id) => MemberId::Relation(RelationId(id.0)),
                    },
                    role: r.role.to_string(),
                })
                .collect(),
            tags: convert_tags(&rel.tags),
        }),
    }
}

fn convert_tags(tags: &osmpbfreader::Tags) -> Tags {
    tags.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
