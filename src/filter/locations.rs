//! Node location stores.
//!
//! The store doubles as the set of nodes found inside a boundary: a node is
//! inside iff a location was recorded for it.

use std::path::Path;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use sled::Db;
use tempfile::{Builder, TempDir};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Location, NodeId};

/// Mapping from node id to location with presence-returning lookups.
pub trait LocationStore {
    /// Record a location; returns `false` if the node was already present.
    fn insert(&mut self, id: NodeId, loc: Location) -> Result<bool>;

    fn get(&self, id: NodeId) -> Result<Option<Location>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: LocationStore + ?Sized> LocationStore for Box<S> {
    fn insert(&mut self, id: NodeId, loc: Location) -> Result<bool> {
        (**self).insert(id, loc)
    }

    fn get(&self, id: NodeId) -> Result<Option<Location>> {
        (**self).get(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// Hash map store, the default.
#[derive(Debug, Default)]
pub struct MemoryLocations {
    map: HashMap<NodeId, Location>,
}

impl MemoryLocations {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStore for MemoryLocations {
    fn insert(&mut self, id: NodeId, loc: Location) -> Result<bool> {
        match self.map.entry(id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(loc);
                Ok(true)
            }
        }
    }

    fn get(&self, id: NodeId) -> Result<Option<Location>> {
        Ok(self.map.get(&id).copied())
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Store spilled to a temporary sled database, removed on drop.
pub struct DiskLocations {
    db: Db,
    len: usize,
    _dir: TempDir,
}

impl DiskLocations {
    /// Create a store in a fresh temporary directory under `parent` (or the system default)
    pub fn new(parent: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("geofence-nodes-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        info!("Spilling node locations to {}", dir.path().display());

        let db = sled::open(dir.path())?;
        Ok(Self {
            db,
            len: 0,
            _dir: dir,
        })
    }
}

impl LocationStore for DiskLocations {
    fn insert(&mut self, id: NodeId, loc: Location) -> Result<bool> {
        let key = id.0.to_be_bytes();
        if self.db.contains_key(key)? {
            return Ok(false);
        }

        let mut value = [0u8; 8];
        value[0..4].copy_from_slice(&loc.x().to_be_bytes());
        value[4..8].copy_from_slice(&loc.y().to_be_bytes());
        self.db.insert(key, &value)?;
        self.len += 1;
        Ok(true)
    }

    fn get(&self, id: NodeId) -> Result<Option<Location>> {
        let Some(bytes) = self.db.get(id.0.to_be_bytes())? else {
            return Ok(None);
        };

        match bytes.as_ref() {
            [x0, x1, x2, x3, y0, y1, y2, y3] => Ok(Some(Location::from_decimicro(
                i32::from_be_bytes([*x0, *x1, *x2, *x3]),
                i32::from_be_bytes([*y0, *y1, *y2, *y3]),
            ))),
            _ => Err(Error::CorruptLocation(id.0)),
        }
    }

    fn len(&self) -> usize {
        self.len
    }
}
