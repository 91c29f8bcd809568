//! Entity/relation store: the persisted side of the resolver.
//!
//! Extraction front-ends write declared entities and their syntactic relations
//! into a store; the type models read them back in streamed passes and write
//! synthesized compound types and unknown placeholders into it.
//!
//! The [`EntityStore`] trait is the only seam the type models depend on.
//! [`InMemoryStore`] is the bundled implementation, with JSON snapshots for
//! moving a corpus between runs.
//!
//! # Write isolation
//!
//! Every method takes `&self`. Implementations are responsible for making
//! inserts safe when several project models share one store; an insert that
//! returns an identifier must not interleave with another insert.

mod memory;

pub use memory::{InMemoryStore, StoreSnapshot, STORE_SCHEMA_VERSION};

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{EntityId, EntityKind, Origin, ProjectId, RelationKind};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A writer panicked while holding the table lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// Snapshot was written by an incompatible schema.
    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    SchemaMismatch { found: u32, expected: u32 },

    /// Two snapshot rows share an entity identifier.
    #[error("duplicate entity id {0} in snapshot")]
    DuplicateId(EntityId),

    /// No identifier is left to hand out.
    #[error("entity id space exhausted")]
    IdsExhausted,

    /// IO error while reading or writing a snapshot.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error while reading or writing a snapshot.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Rows
// ============================================================================

/// A persisted entity row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity_id: EntityId,
    pub project_id: ProjectId,
    pub fqn: String,
    pub kind: EntityKind,
    /// Signature suffix of the declaration: `(int)` for a method, or
    /// `<T+java.lang.Object>` for a generic type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    /// Erased parameter signature, when extraction recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_params: Option<String>,
    /// Dimension count for synthesized array rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
}

/// A persisted relation row: `lhs <kind> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub kind: RelationKind,
    /// Origin of the right-hand entity.
    pub origin: Origin,
    pub lhs: EntityId,
    pub rhs: EntityId,
    pub project_id: ProjectId,
}

impl RelationRecord {
    /// Create a relation whose right-hand side is internal to the project.
    pub fn new(kind: RelationKind, lhs: EntityId, rhs: EntityId, project_id: ProjectId) -> Self {
        RelationRecord {
            kind,
            origin: Origin::Internal,
            lhs,
            rhs,
            project_id,
        }
    }

    /// Set the origin of the right-hand side.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
}

/// An entity row about to be inserted; the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub project_id: ProjectId,
    pub kind: EntityKind,
    pub fqn: String,
    pub params: Option<String>,
    pub raw_params: Option<String>,
    pub dimensions: Option<u32>,
}

impl NewEntity {
    /// Create a plain entity row.
    pub fn new(project_id: ProjectId, kind: EntityKind, fqn: impl Into<String>) -> Self {
        NewEntity {
            project_id,
            kind,
            fqn: fqn.into(),
            params: None,
            raw_params: None,
            dimensions: None,
        }
    }

    /// Attach a signature suffix.
    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Attach an erased parameter signature.
    pub fn with_raw_params(mut self, raw_params: impl Into<String>) -> Self {
        self.raw_params = Some(raw_params.into());
        self
    }

    /// Attach an array dimension count.
    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Selects entity rows of one project restricted to a set of kinds.
#[derive(Debug, Clone, Copy)]
pub struct EntityFilter<'a> {
    pub project_id: ProjectId,
    pub kinds: &'a [EntityKind],
}

impl<'a> EntityFilter<'a> {
    pub fn new(project_id: ProjectId, kinds: &'a [EntityKind]) -> Self {
        EntityFilter { project_id, kinds }
    }

    pub fn matches(&self, record: &EntityRecord) -> bool {
        record.project_id == self.project_id && self.kinds.contains(&record.kind)
    }
}

/// Selects relation rows of one project restricted to a set of kinds.
#[derive(Debug, Clone, Copy)]
pub struct RelationFilter<'a> {
    pub project_id: ProjectId,
    pub kinds: &'a [RelationKind],
}

impl<'a> RelationFilter<'a> {
    pub fn new(project_id: ProjectId, kinds: &'a [RelationKind]) -> Self {
        RelationFilter { project_id, kinds }
    }

    pub fn matches(&self, record: &RelationRecord) -> bool {
        record.project_id == self.project_id && self.kinds.contains(&record.kind)
    }
}

// ============================================================================
// Store Trait
// ============================================================================

/// Access to the persisted entity/relation tables.
///
/// Reads are streamed through a visitor so that implementations never need to
/// materialize a whole project. Visitors must not call back into the store.
pub trait EntityStore: Send + Sync {
    /// Visit every entity row matching `filter`.
    fn for_each_entity(
        &self,
        filter: &EntityFilter<'_>,
        visit: &mut dyn FnMut(&EntityRecord),
    ) -> StoreResult<()>;

    /// Visit every relation row matching `filter`.
    fn for_each_relation(
        &self,
        filter: &RelationFilter<'_>,
        visit: &mut dyn FnMut(&RelationRecord),
    ) -> StoreResult<()>;

    /// Insert an entity row and return its newly assigned identifier.
    fn insert_entity(&self, entity: NewEntity) -> StoreResult<EntityId>;

    /// Insert a relation row.
    fn insert_relation(&self, relation: RelationRecord) -> StoreResult<()>;
}
