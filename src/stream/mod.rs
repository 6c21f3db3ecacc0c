//! Entity stream readers and writers.
//!
//! The extraction pipeline only sees the [`EntitySource`] and [`EntitySink`]
//! traits; the concrete formats live in the submodules.

mod memory;
mod pbf;
mod xml;

pub use memory::{MemorySink, MemorySource};
pub use pbf::PbfSource;
pub use xml::{OutputHeader, XmlSink};

use crate::error::Result;
use crate::models::{Entity, Kinds};

/// Forward-only stream of entities from one traversal.
pub type EntityStream<'a> = Box<dyn Iterator<Item = Result<Entity>> + 'a>;

/// A re-openable source of entities, yielded in source order.
pub trait EntitySource {
    /// Start a new traversal from the first entity.
    ///
    /// `kinds` is a hint; implementations may yield every kind.
    fn open(&mut self, kinds: Kinds) -> Result<EntityStream<'_>>;
}

/// Receiver of the entities kept by an extraction.
pub trait EntitySink {
    fn emit(&mut self, entity: &Entity) -> Result<()>;

    /// Called once after the last `emit`.
    fn finalize(&mut self) -> Result<()>;
}

impl<S: EntitySink + ?Sized> EntitySink for Box<S> {
    fn emit(&mut self, entity: &Entity) -> Result<()> {
        (**self).emit(entity)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
