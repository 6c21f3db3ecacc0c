//! In-memory entity source and sink.

use super::{EntitySink, EntitySource, EntityStream};
use crate::error::Result;
use crate::models::{Entity, Kinds};

/// Source backed by a vector of entities.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entities: Vec<Entity>,
    opens: usize,
}

impl MemorySource {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities, opens: 0 }
    }

    /// Number of traversals started so far
    pub fn opens(&self) -> usize {
        self.opens
    }
}

impl EntitySource for MemorySource {
    fn open(&mut self, kinds: Kinds) -> Result<EntityStream<'_>> {
        self.opens += 1;
        Ok(Box::new(
            self.entities
                .iter()
                .filter(move |entity| kinds.contains(entity.kind()))
                .cloned()
                .map(Ok),
        ))
    }
}

/// Sink collecting emitted entities.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub entities: Vec<Entity>,
    pub finalized: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntitySink for MemorySink {
    fn emit(&mut self, entity: &Entity) -> Result<()> {
        self.entities.push(entity.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}
