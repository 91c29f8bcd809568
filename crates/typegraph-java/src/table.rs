//! FQN-keyed entity table shared by the library and project models.
//!
//! Both models load declarations the same way and wire inheritance the same
//! way; they differ only in which arena their references point into and
//! where a parent that is not local gets looked up.

use std::collections::HashMap;

use typegraph_core::diagnostics::{Anomaly, Diagnostics};
use typegraph_core::progress::TaskProgress;
use typegraph_core::store::{EntityFilter, EntityRecord, EntityStore, RelationFilter};
use typegraph_core::types::{EntityId, EntityKind, Origin, ProjectId, RelationKind};

use crate::entity::{Arena, Entity, EntityRef};
use crate::error::ResolveResult;

const INHERITANCE: &[RelationKind] = &[RelationKind::Extends, RelationKind::Implements];

#[derive(Debug, Clone)]
pub(crate) struct EntityTable {
    arena: Arena,
    by_fqn: HashMap<String, u32>,
    /// entity_id → arena index for class-like entities, only while wiring.
    reverse_map: Option<HashMap<EntityId, u32>>,
    to_ref: fn(u32) -> EntityRef,
}

impl EntityTable {
    pub(crate) fn new(to_ref: fn(u32) -> EntityRef) -> Self {
        EntityTable {
            arena: Arena::default(),
            by_fqn: HashMap::new(),
            reverse_map: None,
            to_ref,
        }
    }

    /// Start recording class-like ids for a later wiring pass.
    pub(crate) fn track_ids(&mut self) {
        if self.reverse_map.is_none() {
            self.reverse_map = Some(HashMap::new());
        }
    }

    pub(crate) fn has_reverse_map(&self) -> bool {
        self.reverse_map.is_some()
    }

    pub(crate) fn release_reverse_map(&mut self) {
        self.reverse_map = None;
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub(crate) fn get(&self, fqn: &str) -> Option<EntityRef> {
        self.by_fqn.get(fqn).map(|&idx| (self.to_ref)(idx))
    }

    /// Like [`get`](Self::get) but skips synthesized compound types.
    pub(crate) fn get_declared(&self, fqn: &str) -> Option<EntityRef> {
        let idx = *self.by_fqn.get(fqn)?;
        let entity = self.arena.get(idx)?;
        if entity.kind().is_synthesized() {
            None
        } else {
            Some((self.to_ref)(idx))
        }
    }

    pub(crate) fn by_id(&self, entity_id: EntityId) -> Option<EntityRef> {
        self.reverse_map
            .as_ref()?
            .get(&entity_id)
            .map(|&idx| (self.to_ref)(idx))
    }

    pub(crate) fn entity(&self, idx: u32) -> Option<&Entity> {
        self.arena.get(idx)
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Allocate an entity and register it under `fqn`.
    pub(crate) fn insert(
        &mut self,
        fqn: &str,
        entity: Entity,
        diagnostics: &mut Diagnostics,
    ) -> EntityRef {
        let idx = self.arena.alloc(entity);
        self.register(fqn, idx, diagnostics);
        (self.to_ref)(idx)
    }

    /// Allocate an entity without registering any name for it.
    pub(crate) fn alloc_unnamed(&mut self, entity: Entity) -> EntityRef {
        (self.to_ref)(self.arena.alloc(entity))
    }

    /// Unbind `fqn`. The arena slot stays allocated but is no longer found.
    pub(crate) fn forget(&mut self, fqn: &str) {
        self.by_fqn.remove(fqn);
    }

    /// Bind `fqn` to an arena slot. The first binding of a name wins.
    fn register(&mut self, fqn: &str, idx: u32, diagnostics: &mut Diagnostics) {
        if self.by_fqn.contains_key(fqn) {
            diagnostics.push(Anomaly::DuplicateFqn {
                fqn: fqn.to_string(),
            });
        } else {
            self.by_fqn.insert(fqn.to_string(), idx);
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Stream the declared entities of one project into the table.
    ///
    /// A declaration with a parameter signature (method overloads, generic
    /// types) is registered under `fqn + params` and `fqn + raw_params`
    /// only; the bare FQN is left free for its siblings.
    pub(crate) fn load_declared(
        &mut self,
        store: &dyn EntityStore,
        project_id: ProjectId,
        origin: Origin,
        progress: &mut TaskProgress,
        diagnostics: &mut Diagnostics,
    ) -> ResolveResult<()> {
        progress.start_counted(format!("Loading entities of {project_id}"), "entities loaded");
        let filter = EntityFilter::new(project_id, EntityKind::DECLARED);
        store.for_each_entity(&filter, &mut |record| {
            self.load_record(record, origin, diagnostics);
            progress.progress();
        })?;
        progress.finish();
        Ok(())
    }

    fn load_record(&mut self, record: &EntityRecord, origin: Origin, diagnostics: &mut Diagnostics) {
        let entity = Entity::new(record.fqn.as_str(), record.kind, record.entity_id, origin);
        let idx = self.arena.alloc(entity);
        match &record.params {
            None => self.register(&record.fqn, idx, diagnostics),
            Some(params) => {
                if let Some(raw) = &record.raw_params {
                    self.register(&format!("{}{}", record.fqn, raw), idx, diagnostics);
                }
                self.register(&format!("{}{}", record.fqn, params), idx, diagnostics);
            }
        }
        if record.kind.is_class_like() {
            if let Some(reverse) = self.reverse_map.as_mut() {
                reverse.insert(record.entity_id, idx);
            }
        }
    }

    /// Wire extends/implements edges of one project into parent links.
    ///
    /// has-base-type rows are loaded first and used to redirect a right-hand
    /// side that names a parameterized supertype onto its raw base type.
    /// Children must be local; parents are local or found through
    /// `fallback`. Edges with an unresolvable end are recorded and skipped.
    pub(crate) fn load_structure(
        &mut self,
        store: &dyn EntityStore,
        project_id: ProjectId,
        progress: &mut TaskProgress,
        diagnostics: &mut Diagnostics,
        fallback: &dyn Fn(EntityId) -> Option<EntityRef>,
    ) -> ResolveResult<()> {
        progress.start(format!("Loading structure of {project_id}"));

        progress.start_counted("Loading has_base_type relations", "relations loaded");
        let mut base_types: HashMap<EntityId, EntityId> = HashMap::new();
        store.for_each_relation(
            &RelationFilter::new(project_id, &[RelationKind::HasBaseType]),
            &mut |relation| {
                base_types.insert(relation.lhs, relation.rhs);
                progress.progress();
            },
        )?;
        progress.finish();

        progress.start_counted("Loading extends/implements relations", "relations loaded");
        let to_ref = self.to_ref;
        let empty = HashMap::new();
        let reverse = self.reverse_map.as_ref().unwrap_or(&empty);
        let arena = &mut self.arena;
        store.for_each_relation(&RelationFilter::new(project_id, INHERITANCE), &mut |relation| {
            let rhs = base_types.get(&relation.rhs).copied().unwrap_or(relation.rhs);
            let Some(&child) = reverse.get(&relation.lhs) else {
                diagnostics.push(Anomaly::MissingChild {
                    entity_id: relation.lhs,
                });
                return;
            };
            let parent = match reverse.get(&rhs) {
                Some(&idx) => Some(to_ref(idx)),
                None => fallback(rhs),
            };
            let Some(parent) = parent else {
                diagnostics.push(Anomaly::MissingParent { entity_id: rhs });
                return;
            };
            if let Some(entity) = arena.get_mut(child) {
                entity.add_parent(parent);
            }
            progress.progress();
        })?;
        progress.finish();

        progress.finish();
        Ok(())
    }
}
