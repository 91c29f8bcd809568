//! In-memory store with JSON snapshots.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{
    EntityFilter, EntityRecord, EntityStore, NewEntity, RelationFilter, RelationRecord,
    StoreError, StoreResult,
};
use crate::types::{EntityId, ProjectId};

/// Schema version for [`StoreSnapshot`] serialization.
///
/// Increment this when adding/removing row fields or changing their encoding.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Serialized form of an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub relations: Vec<RelationRecord>,
}

#[derive(Debug, Default)]
struct Tables {
    entities: Vec<EntityRecord>,
    relations: Vec<RelationRecord>,
    /// project_id → row indexes into `entities` (insertion order).
    entities_by_project: HashMap<ProjectId, Vec<usize>>,
    /// project_id → row indexes into `relations` (insertion order).
    relations_by_project: HashMap<ProjectId, Vec<usize>>,
    ids: HashSet<EntityId>,
    next_entity_id: u32,
}

impl Tables {
    fn push_entity(&mut self, record: EntityRecord) -> StoreResult<()> {
        let next = record
            .entity_id
            .0
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        if !self.ids.insert(record.entity_id) {
            return Err(StoreError::DuplicateId(record.entity_id));
        }
        self.next_entity_id = self.next_entity_id.max(next);
        self.entities_by_project
            .entry(record.project_id)
            .or_default()
            .push(self.entities.len());
        self.entities.push(record);
        Ok(())
    }

    fn push_relation(&mut self, record: RelationRecord) {
        self.relations_by_project
            .entry(record.project_id)
            .or_default()
            .push(self.relations.len());
        self.relations.push(record);
    }
}

/// A store that keeps every row in memory behind a single lock.
///
/// Identifiers are assigned sequentially starting at 1 (0 is never handed
/// out) and stay unique across all projects in the store.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore {
            tables: Mutex::new(Tables {
                next_entity_id: 1,
                ..Tables::default()
            }),
        }
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    // ========================================================================
    // Extraction-side writes
    // ========================================================================

    /// Record a declared entity, returning its identifier.
    ///
    /// This is what an extraction front-end calls; it is the same insert the
    /// resolver uses for synthesized rows.
    pub fn declare(&self, entity: NewEntity) -> StoreResult<EntityId> {
        self.insert_entity(entity)
    }

    /// Record a relation between two existing rows.
    pub fn relate(&self, relation: RelationRecord) -> StoreResult<()> {
        self.insert_relation(relation)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of entity rows.
    pub fn entity_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.entities.len())
    }

    /// Number of relation rows.
    pub fn relation_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.relations.len())
    }

    /// All entity rows with exactly this FQN, in insertion order.
    pub fn entities_named(&self, fqn: &str) -> StoreResult<Vec<EntityRecord>> {
        let tables = self.lock()?;
        Ok(tables
            .entities
            .iter()
            .filter(|e| e.fqn == fqn)
            .cloned()
            .collect())
    }

    /// The entity row with this identifier, if any.
    pub fn entity(&self, id: EntityId) -> StoreResult<Option<EntityRecord>> {
        let tables = self.lock()?;
        Ok(tables.entities.iter().find(|e| e.entity_id == id).cloned())
    }

    /// All relation rows whose left-hand side is `lhs`, in insertion order.
    pub fn relations_from(&self, lhs: EntityId) -> StoreResult<Vec<RelationRecord>> {
        let tables = self.lock()?;
        Ok(tables
            .relations
            .iter()
            .filter(|r| r.lhs == lhs)
            .cloned()
            .collect())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        if snapshot.schema_version != STORE_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                found: snapshot.schema_version,
                expected: STORE_SCHEMA_VERSION,
            });
        }
        let store = InMemoryStore::new();
        {
            let mut tables = store.lock()?;
            for entity in snapshot.entities {
                tables.push_entity(entity)?;
            }
            for relation in snapshot.relations {
                tables.push_relation(relation);
            }
        }
        Ok(store)
    }

    /// Copy every row into a snapshot.
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let tables = self.lock()?;
        Ok(StoreSnapshot {
            schema_version: STORE_SCHEMA_VERSION,
            entities: tables.entities.clone(),
            relations: tables.relations.clone(),
        })
    }

    /// Load a store from a JSON snapshot file.
    pub fn load_json(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded snapshot {} ({} entities, {} relations)",
            path.display(),
            snapshot.entities.len(),
            snapshot.relations.len()
        );
        InMemoryStore::from_snapshot(snapshot)
    }

    /// Write the store to a JSON snapshot file.
    pub fn save_json(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl EntityStore for InMemoryStore {
    fn for_each_entity(
        &self,
        filter: &EntityFilter<'_>,
        visit: &mut dyn FnMut(&EntityRecord),
    ) -> StoreResult<()> {
        let tables = self.lock()?;
        if let Some(rows) = tables.entities_by_project.get(&filter.project_id) {
            for &row in rows {
                let record = &tables.entities[row];
                if filter.matches(record) {
                    visit(record);
                }
            }
        }
        Ok(())
    }

    fn for_each_relation(
        &self,
        filter: &RelationFilter<'_>,
        visit: &mut dyn FnMut(&RelationRecord),
    ) -> StoreResult<()> {
        let tables = self.lock()?;
        if let Some(rows) = tables.relations_by_project.get(&filter.project_id) {
            for &row in rows {
                let record = &tables.relations[row];
                if filter.matches(record) {
                    visit(record);
                }
            }
        }
        Ok(())
    }

    fn insert_entity(&self, entity: NewEntity) -> StoreResult<EntityId> {
        let mut tables = self.lock()?;
        let entity_id = EntityId::new(tables.next_entity_id);
        tables.push_entity(EntityRecord {
            entity_id,
            project_id: entity.project_id,
            fqn: entity.fqn,
            kind: entity.kind,
            params: entity.params,
            raw_params: entity.raw_params,
            dimensions: entity.dimensions,
        })?;
        Ok(entity_id)
    }

    fn insert_relation(&self, relation: RelationRecord) -> StoreResult<()> {
        self.lock()?.push_relation(relation);
        Ok(())
    }
}
