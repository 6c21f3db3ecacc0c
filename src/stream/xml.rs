//! OSM XML entity sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::EntitySink;
use crate::error::{Error, Result};
use crate::models::{format_coordinate, BoundingBox, Entity, Tags};

/// Document-level attributes of the output file
#[derive(Debug, Clone)]
pub struct OutputHeader {
    pub generator: String,
    pub bounds: Option<BoundingBox>,
}

impl Default for OutputHeader {
    fn default() -> Self {
        Self {
            generator: concat!("geofence/", env!("CARGO_PKG_VERSION")).to_string(),
            bounds: None,
        }
    }
}

/// Writes entities as an OSM 0.6 XML document.
pub struct XmlSink<W: Write> {
    writer: Writer<W>,
}

impl XmlSink<BufWriter<File>> {
    /// Create (or truncate) an output file
    pub fn create<P: AsRef<Path>>(path: P, header: &OutputHeader) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> XmlSink<W> {
    /// Start the document; entities follow through `emit`.
    pub fn new(inner: W, header: &OutputHeader) -> Result<Self> {
        let mut writer = Writer::new_with_indent(inner, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut osm = BytesStart::new("osm");
        osm.push_attribute(("version", "0.6"));
        osm.push_attribute(("generator", header.generator.as_str()));
        writer.write_event(Event::Start(osm))?;

        if let Some(bounds) = header.bounds {
            let mut elem = BytesStart::new("bounds");
            elem.push_attribute(("minlat", format_coordinate(bounds.min.y()).as_str()));
            elem.push_attribute(("minlon", format_coordinate(bounds.min.x()).as_str()));
            elem.push_attribute(("maxlat", format_coordinate(bounds.max.y()).as_str()));
            elem.push_attribute(("maxlon", format_coordinate(bounds.max.x()).as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        Ok(Self { writer })
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_element(&mut self, elem: BytesStart<'_>, children: Vec<BytesStart<'_>>) -> Result<()> {
        if children.is_empty() {
            self.writer.write_event(Event::Empty(elem))?;
            return Ok(());
        }

        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        self.writer.write_event(Event::Start(elem))?;
        for child in children {
            self.writer.write_event(Event::Empty(child))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

fn tag_elements(tags: &Tags) -> impl Iterator<Item = BytesStart<'static>> + '_ {
    tags.iter().map(|(key, value)| {
        let mut tag = BytesStart::new("tag");
        tag.push_attribute(("k", key.as_str()));
        tag.push_attribute(("v", value.as_str()));
        tag
    })
}

impl<W: Write> EntitySink for XmlSink<W> {
    fn emit(&mut self, entity: &Entity) -> Result<()> {
        match entity {
            Entity::Node(node) => {
                let mut elem = BytesStart::new("node");
                elem.push_attribute(("id", node.id.0.to_string().as_str()));
                elem.push_attribute(("lat", format_coordinate(node.location.y()).as_str()));
                elem.push_attribute(("lon", format_coordinate(node.location.x()).as_str()));
                let children = tag_elements(&node.tags).collect();
                self.write_element(elem, children)
            }
            Entity::Way(way) => {
                let mut elem = BytesStart::new("way");
                elem.push_attribute(("id", way.id.0.to_string().as_str()));
                let mut children: Vec<BytesStart<'_>> = way
                    .nodes
                    .iter()
                    .map(|node_id| {
                        let mut nd = BytesStart::new("nd");
                        nd.push_attribute(("ref", node_id.0.to_string().as_str()));
                        nd
                    })
                    .collect();
                children.extend(tag_elements(&way.tags));
                self.write_element(elem, children)
            }
            Entity::Relation(rel) => {
                let mut elem = BytesStart::new("relation");
                elem.push_attribute(("id", rel.id.0.to_string().as_str()));
                let mut children: Vec<BytesStart<'_>> = rel
                    .members
                    .iter()
                    .map(|member| {
                        let mut m = BytesStart::new("member");
                        m.push_attribute(("type", member.id.kind().to_string().as_str()));
                        m.push_attribute(("ref", member.id.raw_id().to_string().as_str()));
                        m.push_attribute(("role", member.role.as_str()));
                        m
                    })
                    .collect();
                children.extend(tag_elements(&rel.tags));
                self.write_element(elem, children)
            }
        }
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new("osm")))?;
        self.writer
            .get_mut()
            .flush()
            .map_err(|e| Error::StreamWrite(Box::new(e)))
    }
}
