//! The per-project type model.
//!
//! A project model overlays one project's declarations on the shared
//! [`LibraryTypeModel`] and answers two kinds of query:
//!
//! - [`get_entity`](ProjectTypeModel::get_entity): plain name resolution.
//!   Compound names (arrays, wildcards, type variables, parameterized types)
//!   are synthesized into new store rows on first use.
//! - [`get_virtual_entity`](ProjectTypeModel::get_virtual_entity): member
//!   references resolved through the inheritance graph.
//!
//! Anything that cannot be resolved gets an `Unknown` placeholder from the
//! run-wide [`UnknownEntityCache`], so every query yields something a
//! relation can point at.

use std::collections::HashMap;
use std::sync::Arc;

use typegraph_core::diagnostics::{Anomaly, Diagnostics};
use typegraph_core::progress::TaskProgress;
use typegraph_core::store::{EntityStore, NewEntity, RelationRecord};
use typegraph_core::types::{EntityId, EntityKind, Origin, ProjectId, RelationKind};

use crate::dispatch::{self, Binding, Hierarchy};
use crate::entity::{Entity, EntityRef};
use crate::error::ResolveResult;
use crate::fqn::{self, MemberRef, TypeName, WildcardBound};
use crate::library::LibraryTypeModel;
use crate::table::EntityTable;
use crate::unknowns::UnknownEntityCache;

/// One project's view of the type universe.
pub struct ProjectTypeModel<'s> {
    store: &'s dyn EntityStore,
    project_id: ProjectId,
    library: Arc<LibraryTypeModel>,
    unknowns: Arc<UnknownEntityCache>,
    /// Declarations, synthesized compounds and placeholders.
    table: EntityTable,
    /// Placeholder handed out per FQN, kept apart from declared names.
    placeholders: HashMap<String, EntityRef>,
    /// Memoized virtual dispatch results.
    bindings: HashMap<String, Binding>,
    diagnostics: Diagnostics,
}

impl<'s> ProjectTypeModel<'s> {
    /// Load the project's declarations only.
    pub fn build_plain(
        progress: &mut TaskProgress,
        store: &'s dyn EntityStore,
        project_id: ProjectId,
        library: Arc<LibraryTypeModel>,
        unknowns: Arc<UnknownEntityCache>,
    ) -> ResolveResult<Self> {
        let depth = progress.depth();
        progress.start(format!("Building type model for {project_id}"));
        let mut model = Self::empty(store, project_id, library, unknowns);
        model
            .table
            .load_declared(
                store,
                project_id,
                Origin::Internal,
                progress,
                &mut model.diagnostics,
            )
            .inspect_err(|_| progress.abort_to(depth))?;
        progress.finish();
        Ok(model)
    }

    /// Load the project's declarations and wire its inheritance structure.
    ///
    /// Both reverse maps are released afterwards. The library's is only
    /// released when this model holds the last reference to it, so a library
    /// shared with models still to be built keeps its id index.
    pub fn build_virtual(
        progress: &mut TaskProgress,
        store: &'s dyn EntityStore,
        project_id: ProjectId,
        library: Arc<LibraryTypeModel>,
        unknowns: Arc<UnknownEntityCache>,
    ) -> ResolveResult<Self> {
        let depth = progress.depth();
        progress.start(format!("Building virtual type model for {project_id}"));
        let mut model = Self::empty(store, project_id, library, unknowns);
        model.table.track_ids();
        model
            .load_virtual(progress)
            .inspect_err(|_| progress.abort_to(depth))?;

        model.table.release_reverse_map();
        if let Some(library) = Arc::get_mut(&mut model.library) {
            library.clear_reverse_map();
        }
        progress.finish();
        Ok(model)
    }

    fn load_virtual(&mut self, progress: &mut TaskProgress) -> ResolveResult<()> {
        self.table.load_declared(
            self.store,
            self.project_id,
            Origin::Internal,
            progress,
            &mut self.diagnostics,
        )?;
        let library = &self.library;
        self.table.load_structure(
            self.store,
            self.project_id,
            progress,
            &mut self.diagnostics,
            &|entity_id| library.entity_by_id(entity_id),
        )
    }

    fn empty(
        store: &'s dyn EntityStore,
        project_id: ProjectId,
        library: Arc<LibraryTypeModel>,
        unknowns: Arc<UnknownEntityCache>,
    ) -> Self {
        ProjectTypeModel {
            store,
            project_id,
            library,
            unknowns,
            table: EntityTable::new(EntityRef::Project),
            placeholders: HashMap::new(),
            bindings: HashMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn library(&self) -> &Arc<LibraryTypeModel> {
        &self.library
    }

    /// Entity behind a reference into either arena.
    pub fn entity(&self, r: EntityRef) -> Option<&Entity> {
        match r {
            EntityRef::Project(idx) => self.table.entity(idx),
            EntityRef::Library(_) => self.library.entity(r),
        }
    }

    /// Memoized virtual result for an exact composite key.
    pub fn memoized(&self, fqn: &str) -> Option<&Binding> {
        self.bindings.get(fqn)
    }

    /// Anomalies recorded while loading and resolving.
    pub fn anomalies(&self) -> &[Anomaly] {
        self.diagnostics.anomalies()
    }

    /// Number of entities in the project's own arena.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register an entity created after the model was built, e.g. a type the
    /// caller has just inserted for this project. An FQN that is already
    /// taken keeps its first entity.
    ///
    /// `kind` is what dispatch uses to split candidates into class and
    /// interface methods, so it must match the inserted row.
    pub fn add(&mut self, fqn: &str, entity_id: EntityId, kind: EntityKind) -> EntityRef {
        let entity = Entity::new(fqn, kind, entity_id, Origin::Internal);
        self.table.insert(fqn, entity, &mut self.diagnostics)
    }

    // ========================================================================
    // Plain resolution
    // ========================================================================

    /// Resolve a name without virtual dispatch.
    ///
    /// Order: project names, then compound synthesis (never for methods), then
    /// the library, then an unknown placeholder. Every successful synthesis
    /// is memoized, so the same compound name inserts one row.
    pub fn get_entity(&mut self, fqn: &str) -> ResolveResult<EntityRef> {
        if let Some(found) = self.table.get(fqn) {
            return Ok(found);
        }
        if !fqn::is_method(fqn) {
            let name = TypeName::parse(fqn);
            if let Some(kind) = compound_kind(&name) {
                return self.synthesize(fqn, kind, name);
            }
        }
        if let Some(found) = self.library.get_entity(fqn) {
            return Ok(found);
        }
        self.unknown(fqn)
    }

    /// Insert a compound type's row, register it, then link its parts.
    ///
    /// Registration happens before the constituents are resolved so that a
    /// constituent naming the compound itself finds the new entity. If
    /// linking fails the name is unregistered again, so a half-linked
    /// compound is never returned from the memo.
    fn synthesize(&mut self, fqn: &str, kind: EntityKind, name: TypeName<'_>) -> ResolveResult<EntityRef> {
        let mut row = NewEntity::new(self.project_id, kind, fqn);
        if let TypeName::Array { dimensions, .. } = name {
            row = row.with_dimensions(dimensions);
        }
        let entity_id = self.store.insert_entity(row)?;
        tracing::debug!("Synthesized {} {} as {}", kind, fqn, entity_id);
        let entity = Entity::new(fqn, kind, entity_id, Origin::NotApplicable);
        let synthesized = self.table.insert(fqn, entity, &mut self.diagnostics);

        if let Err(err) = self.link_parts(entity_id, name) {
            self.table.forget(fqn);
            return Err(err);
        }
        Ok(synthesized)
    }

    fn link_parts(&mut self, entity_id: EntityId, name: TypeName<'_>) -> ResolveResult<()> {
        match name {
            TypeName::Array { element, .. } => {
                self.link(entity_id, RelationKind::HasElementsOf, element)?;
            }
            TypeName::Wildcard(WildcardBound::Unbounded) => {}
            TypeName::Wildcard(WildcardBound::Upper(bound)) => {
                self.link(entity_id, RelationKind::HasUpperBound, bound)?;
            }
            TypeName::Wildcard(WildcardBound::Lower(bound)) => {
                self.link(entity_id, RelationKind::HasLowerBound, bound)?;
            }
            TypeName::TypeVariable { bounds, .. } => {
                for bound in bounds {
                    self.link(entity_id, RelationKind::HasUpperBound, bound)?;
                }
            }
            TypeName::Parameterized { base, arguments } => {
                self.link(entity_id, RelationKind::HasBaseType, &base)?;
                for argument in arguments {
                    self.link(entity_id, RelationKind::HasTypeArgument, argument)?;
                }
            }
            TypeName::Simple => {}
        }
        Ok(())
    }

    /// Resolve `target` and record `lhs -kind-> target`, tagged with the
    /// target's origin.
    fn link(&mut self, lhs: EntityId, kind: RelationKind, target: &str) -> ResolveResult<()> {
        let target = self.get_entity(target)?;
        let Some(entity) = self.entity(target) else {
            return Ok(());
        };
        let relation = RelationRecord::new(kind, lhs, entity.entity_id(), self.project_id)
            .with_origin(entity.origin());
        self.store.insert_relation(relation)?;
        Ok(())
    }

    /// Placeholder for `fqn`, one arena slot per name.
    fn unknown(&mut self, fqn: &str) -> ResolveResult<EntityRef> {
        if let Some(&placeholder) = self.placeholders.get(fqn) {
            return Ok(placeholder);
        }
        let entity = self.unknowns.get_unknown(self.store, fqn)?;
        let placeholder = self.table.alloc_unnamed(entity);
        self.placeholders.insert(fqn.to_string(), placeholder);
        Ok(placeholder)
    }

    fn unresolved(&mut self, fqn: &str) -> ResolveResult<Binding> {
        self.unknown(fqn).map(Binding::Unresolved)
    }

    // ========================================================================
    // Virtual resolution
    // ========================================================================

    /// Resolve a `Receiver.member` reference to the declaration(s) it can
    /// dispatch to.
    ///
    /// Names the project or library declares directly resolve to themselves,
    /// and compound type names go through [`get_entity`](Self::get_entity).
    /// Everything else is resolved once and memoized under `fqn`.
    pub fn get_virtual_entity(&mut self, fqn: &str) -> ResolveResult<Binding> {
        if let Some(binding) = self.bindings.get(fqn) {
            return Ok(binding.clone());
        }
        if let Some(found) = self.table.get(fqn).or_else(|| self.library.get_entity(fqn)) {
            return Ok(Binding::Resolved(found));
        }
        if fqn::is_compound_type(fqn) {
            return self.get_entity(fqn).map(Binding::Resolved);
        }
        let binding = self.dispatch(fqn)?;
        self.bindings.insert(fqn.to_string(), binding.clone());
        Ok(binding)
    }

    fn dispatch(&mut self, fqn: &str) -> ResolveResult<Binding> {
        let Some(member_ref) = MemberRef::parse(fqn) else {
            return self.unresolved(fqn);
        };
        if member_ref.is_constructor_or_initializer() {
            return self.unresolved(fqn);
        }

        if fqn::is_array(member_ref.receiver) {
            let redirected = format!("{}.{}", self.library.root_type(), member_ref.member);
            return match self.basic_entity(&redirected) {
                Some(found) => Ok(Binding::Resolved(found)),
                None => self.unresolved(fqn),
            };
        }

        let Some(receiver) = self.table.get(member_ref.receiver) else {
            let (binding, anomaly) = self.library.resolve_virtual(fqn);
            if let Some(anomaly) = anomaly {
                self.diagnostics.push(anomaly);
            }
            return match binding {
                Some(binding) => Ok(binding),
                None => self.unresolved(fqn),
            };
        };

        let dispatch = if member_ref.is_method() {
            dispatch::resolve_method(&*self, receiver, fqn, member_ref.member)
        } else {
            dispatch::resolve_field(&*self, receiver, fqn, member_ref.member)
        };
        if let Some(anomaly) = dispatch.anomaly {
            self.diagnostics.push(anomaly);
        }
        match dispatch.candidates.into_binding() {
            Some(binding) => Ok(binding),
            None => self.unresolved(fqn),
        }
    }

    /// Declared in the project, else in the library. No synthesis.
    fn basic_entity(&self, fqn: &str) -> Option<EntityRef> {
        self.table
            .get_declared(fqn)
            .or_else(|| self.library.get_entity(fqn))
    }
}

impl Hierarchy for ProjectTypeModel<'_> {
    fn entity(&self, r: EntityRef) -> Option<&Entity> {
        ProjectTypeModel::entity(self, r)
    }

    fn declared(&self, fqn: &str) -> Option<EntityRef> {
        self.basic_entity(fqn)
    }
}

impl std::fmt::Debug for ProjectTypeModel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectTypeModel")
            .field("project_id", &self.project_id)
            .field("entities", &self.table.len())
            .field("placeholders", &self.placeholders.len())
            .field("bindings", &self.bindings.len())
            .field("anomalies", &self.diagnostics.len())
            .finish()
    }
}

fn compound_kind(name: &TypeName<'_>) -> Option<EntityKind> {
    match name {
        TypeName::Array { .. } => Some(EntityKind::Array),
        TypeName::Wildcard(_) => Some(EntityKind::Wildcard),
        TypeName::TypeVariable { .. } => Some(EntityKind::TypeVariable),
        TypeName::Parameterized { .. } => Some(EntityKind::ParameterizedType),
        TypeName::Simple => None,
    }
}
