//! Entity descriptors and the references that link them.
//!
//! Entities live in per-model arenas (`Vec<Entity>`). Parent links and lookup
//! results are [`EntityRef`] indexes, never owning pointers, so a hierarchy
//! with cycles in it (malformed data, or generics referring back to their
//! owner) is just a graph of integers.

use std::fmt;

use serde::{Deserialize, Serialize};
use typegraph_core::types::{EntityId, EntityKind, Origin};

/// Index of an entity in one of the arenas a project model can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef {
    /// Entry in the shared library model's arena.
    Library(u32),
    /// Entry in the project model's own arena.
    Project(u32),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Library(idx) => write!(f, "lib#{idx}"),
            EntityRef::Project(idx) => write!(f, "proj#{idx}"),
        }
    }
}

/// One declared, synthesized, or placeholder symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    fqn: String,
    kind: EntityKind,
    entity_id: EntityId,
    origin: Origin,
    /// Direct superclass and superinterfaces, has-base-type already collapsed.
    parents: Vec<EntityRef>,
}

impl Entity {
    pub fn new(fqn: impl Into<String>, kind: EntityKind, entity_id: EntityId, origin: Origin) -> Self {
        Entity {
            fqn: fqn.into(),
            kind,
            entity_id,
            origin,
            parents: Vec::new(),
        }
    }

    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn parents(&self) -> &[EntityRef] {
        &self.parents
    }

    /// Record a direct parent. Repeated edges to the same parent are kept once.
    pub fn add_parent(&mut self, parent: EntityRef) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }
}

/// Append-only storage for entities of one model.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    entities: Vec<Entity>,
}

impl Arena {
    pub(crate) fn alloc(&mut self, entity: Entity) -> u32 {
        let idx = self.entities.len() as u32;
        self.entities.push(entity);
        idx
    }

    pub(crate) fn get(&self, idx: u32) -> Option<&Entity> {
        self.entities.get(idx as usize)
    }

    pub(crate) fn get_mut(&mut self, idx: u32) -> Option<&mut Entity> {
        self.entities.get_mut(idx as usize)
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }
}
