//! The library type model: declarations of third-party and core-library
//! projects, loaded once per run and shared read-only by every project model.
//!
//! Building and reading are separate types. [`LibraryTypeModelBuilder`] owns
//! the mutable tables while rows stream in; [`LibraryTypeModel`] is the
//! frozen result, meant to be wrapped in an `Arc` and handed to project
//! models.
//!
//! A run usually builds two of these: a baseline for the core library
//! (`java.lang.*` and friends), then the shared model for the remaining
//! libraries seeded from that baseline.

use typegraph_core::config::{ModelMode, DEFAULT_ROOT_TYPE};
use typegraph_core::diagnostics::{Anomaly, Diagnostics};
use typegraph_core::progress::TaskProgress;
use typegraph_core::store::EntityStore;
use typegraph_core::types::{EntityId, Origin, ProjectId};

use crate::dispatch::{self, Binding, Hierarchy};
use crate::entity::{Entity, EntityRef};
use crate::error::ResolveResult;
use crate::fqn::MemberRef;
use crate::table::EntityTable;

/// Mutable phase of a [`LibraryTypeModel`].
#[derive(Debug)]
pub struct LibraryTypeModelBuilder {
    mode: ModelMode,
    root_type: String,
    table: EntityTable,
    diagnostics: Diagnostics,
}

impl LibraryTypeModelBuilder {
    pub fn new(mode: ModelMode) -> Self {
        let mut table = EntityTable::new(EntityRef::Library);
        if mode == ModelMode::Virtual {
            table.track_ids();
        }
        LibraryTypeModelBuilder {
            mode,
            root_type: DEFAULT_ROOT_TYPE.to_string(),
            table,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Start from the contents of an already built baseline.
    ///
    /// The baseline's entities, parent links and names are copied, so later
    /// libraries can extend core types. Its root type is inherited.
    pub fn with_core(mut self, core: &LibraryTypeModel) -> Self {
        self.table = core.table.clone();
        if self.mode == ModelMode::Virtual {
            self.table.track_ids();
        }
        self.root_type = core.root_type.clone();
        self
    }

    /// Override the type array receivers dispatch to.
    pub fn with_root_type(mut self, root_type: impl Into<String>) -> Self {
        self.root_type = root_type.into();
        self
    }

    /// Load the given libraries.
    ///
    /// All declarations are loaded before any structure, so an edge from one
    /// library to a type in another finds its parent regardless of order.
    pub fn load(
        &mut self,
        progress: &mut TaskProgress,
        store: &dyn EntityStore,
        libraries: &[ProjectId],
    ) -> ResolveResult<()> {
        let depth = progress.depth();
        progress.start(format!("Loading {} libraries", libraries.len()));
        self.load_all(progress, store, libraries)
            .inspect_err(|_| progress.abort_to(depth))?;
        progress.finish();
        Ok(())
    }

    fn load_all(
        &mut self,
        progress: &mut TaskProgress,
        store: &dyn EntityStore,
        libraries: &[ProjectId],
    ) -> ResolveResult<()> {
        for &library in libraries {
            self.table.load_declared(
                store,
                library,
                Origin::Library,
                progress,
                &mut self.diagnostics,
            )?;
        }
        if self.mode == ModelMode::Virtual {
            for &library in libraries {
                self.table
                    .load_structure(store, library, progress, &mut self.diagnostics, &|_| None)?;
            }
        }
        Ok(())
    }

    pub fn freeze(self) -> LibraryTypeModel {
        tracing::info!(
            "Library model frozen with {} entities ({} anomalies)",
            self.table.len(),
            self.diagnostics.len()
        );
        LibraryTypeModel {
            mode: self.mode,
            root_type: self.root_type,
            table: self.table,
            diagnostics: self.diagnostics,
        }
    }
}

/// Frozen library declarations with optional inheritance structure.
#[derive(Debug)]
pub struct LibraryTypeModel {
    mode: ModelMode,
    root_type: String,
    table: EntityTable,
    diagnostics: Diagnostics,
}

impl LibraryTypeModel {
    /// Declarations only; no parent links.
    pub fn build_plain(
        progress: &mut TaskProgress,
        store: &dyn EntityStore,
        libraries: &[ProjectId],
        core: Option<&LibraryTypeModel>,
    ) -> ResolveResult<Self> {
        Self::build(ModelMode::Plain, progress, store, libraries, core)
    }

    /// Declarations plus extends/implements structure.
    pub fn build_virtual(
        progress: &mut TaskProgress,
        store: &dyn EntityStore,
        libraries: &[ProjectId],
        core: Option<&LibraryTypeModel>,
    ) -> ResolveResult<Self> {
        Self::build(ModelMode::Virtual, progress, store, libraries, core)
    }

    fn build(
        mode: ModelMode,
        progress: &mut TaskProgress,
        store: &dyn EntityStore,
        libraries: &[ProjectId],
        core: Option<&LibraryTypeModel>,
    ) -> ResolveResult<Self> {
        let mut builder = LibraryTypeModelBuilder::new(mode);
        if let Some(core) = core {
            builder = builder.with_core(core);
        }
        builder.load(progress, store, libraries)?;
        Ok(builder.freeze())
    }

    /// Exact-FQN lookup. No synthesis, no dispatch.
    pub fn get_entity(&self, fqn: &str) -> Option<EntityRef> {
        self.table.get(fqn)
    }

    /// Entity behind a library reference. Project references yield `None`.
    pub fn entity(&self, r: EntityRef) -> Option<&Entity> {
        match r {
            EntityRef::Library(idx) => self.table.entity(idx),
            EntityRef::Project(_) => None,
        }
    }

    /// Class-like entity by persisted id, while the reverse map is kept.
    pub fn entity_by_id(&self, entity_id: EntityId) -> Option<EntityRef> {
        self.table.by_id(entity_id)
    }

    /// Virtual dispatch scoped to library types.
    ///
    /// Returns `None` where a project model would fall back to an unknown
    /// placeholder; the library never writes to the store.
    pub fn get_virtual_entity(&self, fqn: &str) -> Option<Binding> {
        let (binding, anomaly) = self.resolve_virtual(fqn);
        if let Some(anomaly) = anomaly {
            tracing::error!("{}", anomaly);
        }
        binding
    }

    /// Like [`get_virtual_entity`](Self::get_virtual_entity) but hands any
    /// anomaly back to the caller instead of only logging it.
    pub(crate) fn resolve_virtual(&self, fqn: &str) -> (Option<Binding>, Option<Anomaly>) {
        if let Some(found) = self.table.get(fqn) {
            return (Some(Binding::Resolved(found)), None);
        }
        let Some(member_ref) = MemberRef::parse(fqn) else {
            return (None, None);
        };
        if member_ref.is_constructor_or_initializer() {
            return (None, None);
        }
        if crate::fqn::is_array(member_ref.receiver) {
            let redirected = format!("{}.{}", self.root_type, member_ref.member);
            return (self.table.get(&redirected).map(Binding::Resolved), None);
        }
        let Some(receiver) = self.table.get(member_ref.receiver) else {
            return (None, None);
        };
        let dispatch = if member_ref.is_method() {
            dispatch::resolve_method(self, receiver, fqn, member_ref.member)
        } else {
            dispatch::resolve_field(self, receiver, fqn, member_ref.member)
        };
        (dispatch.candidates.into_binding(), dispatch.anomaly)
    }

    /// Drop the id index used to wire project structure.
    pub fn clear_reverse_map(&mut self) {
        if self.table.has_reverse_map() {
            tracing::debug!("Releasing library reverse map");
            self.table.release_reverse_map();
        }
    }

    pub fn has_reverse_map(&self) -> bool {
        self.table.has_reverse_map()
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn mode(&self) -> ModelMode {
        self.mode
    }

    /// Data-integrity problems found while loading.
    pub fn anomalies(&self) -> &[Anomaly] {
        self.diagnostics.anomalies()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

impl Hierarchy for LibraryTypeModel {
    fn entity(&self, r: EntityRef) -> Option<&Entity> {
        LibraryTypeModel::entity(self, r)
    }

    fn declared(&self, fqn: &str) -> Option<EntityRef> {
        self.table.get_declared(fqn)
    }
}
