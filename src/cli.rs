//! Driver logic behind the `tgraph` binary.
//!
//! A run mirrors how the resolver is used in a batch over a mined corpus:
//! build the core-library baseline, build the shared library model on top
//! of it, then build each project model in turn and resolve the requested
//! names against it.

use std::path::Path;
use std::sync::Arc;

use typegraph_core::config::{ModelMode, ResolverConfig};
use typegraph_core::progress::TaskProgress;
use typegraph_core::store::{EntityStore, InMemoryStore};
use typegraph_core::types::{EntityKind, ProjectId};
use typegraph_java::{
    Binding, LibraryTypeModel, LibraryTypeModelBuilder, ProjectTypeModel, ResolveResult,
    UnknownEntityCache,
};

use crate::error::TypegraphError;
use crate::output::{LibraryReport, ProjectReport, ResolutionInfo, ResolveResponse};

/// Load a store snapshot.
pub fn load_store(path: &Path) -> Result<InMemoryStore, TypegraphError> {
    InMemoryStore::load_json(path).map_err(|e| TypegraphError::store_at(e, path.display().to_string()))
}

/// Write a store snapshot, including every row synthesized during the run.
pub fn save_store(store: &InMemoryStore, path: &Path) -> Result<(), TypegraphError> {
    store
        .save_json(path)
        .map_err(|e| TypegraphError::store_at(e, path.display().to_string()))
}

/// Resolve `fqns` in every configured project.
pub fn run_resolve(
    config: &ResolverConfig,
    store: &dyn EntityStore,
    fqns: &[String],
) -> Result<ResolveResponse, TypegraphError> {
    let projects = &config.projects.value;
    if projects.is_empty() {
        return Err(TypegraphError::invalid_args(
            "no projects to resolve (use --project or the `projects` config key)",
        ));
    }
    let mode = config.mode.value;
    let mut progress = TaskProgress::new();

    let core = match &config.core_library {
        Some(core) => Some(build_library(
            config,
            &mut progress,
            store,
            &[core.value],
            None,
        )?),
        None => None,
    };
    let library = build_library(
        config,
        &mut progress,
        store,
        &config.libraries.value,
        core.as_ref(),
    )?;
    drop(core);

    let library_report = LibraryReport {
        entities: library.len(),
        anomalies: library.anomalies().to_vec(),
    };
    let unknowns = Arc::new(UnknownEntityCache::new(config.unknowns_project.value));

    let mut library = Some(Arc::new(library));
    let mut reports = Vec::with_capacity(projects.len());
    for (idx, &project_id) in projects.iter().enumerate() {
        // The last project takes the final reference, letting it drop the
        // library's id index once its structure is wired.
        let shared = if idx + 1 == projects.len() {
            library.take()
        } else {
            library.clone()
        };
        let shared =
            shared.ok_or_else(|| TypegraphError::internal("library model released early"))?;
        reports.push(resolve_project(
            mode,
            &mut progress,
            store,
            project_id,
            shared,
            Arc::clone(&unknowns),
            fqns,
        )?);
    }

    Ok(ResolveResponse::new(
        mode,
        library_report,
        reports,
        unknowns.len()?,
    ))
}

fn build_library(
    config: &ResolverConfig,
    progress: &mut TaskProgress,
    store: &dyn EntityStore,
    libraries: &[ProjectId],
    core: Option<&LibraryTypeModel>,
) -> ResolveResult<LibraryTypeModel> {
    let mut builder = LibraryTypeModelBuilder::new(config.mode.value);
    if let Some(core) = core {
        builder = builder.with_core(core);
    }
    builder = builder.with_root_type(config.root_type.value.clone());
    builder.load(progress, store, libraries)?;
    Ok(builder.freeze())
}

fn resolve_project(
    mode: ModelMode,
    progress: &mut TaskProgress,
    store: &dyn EntityStore,
    project_id: ProjectId,
    library: Arc<LibraryTypeModel>,
    unknowns: Arc<UnknownEntityCache>,
    fqns: &[String],
) -> ResolveResult<ProjectReport> {
    let mut model = match mode {
        ModelMode::Plain => {
            ProjectTypeModel::build_plain(progress, store, project_id, library, unknowns)?
        }
        ModelMode::Virtual => {
            ProjectTypeModel::build_virtual(progress, store, project_id, library, unknowns)?
        }
    };

    let mut bindings = Vec::with_capacity(fqns.len());
    for fqn in fqns {
        let binding = match mode {
            ModelMode::Plain => plain_binding(&mut model, fqn)?,
            ModelMode::Virtual => model.get_virtual_entity(fqn)?,
        };
        bindings.push(binding);
    }

    let resolutions = fqns
        .iter()
        .zip(&bindings)
        .map(|(fqn, binding)| ResolutionInfo::new(fqn.as_str(), binding, |r| model.entity(r)))
        .collect();
    Ok(ProjectReport {
        project_id,
        entities: model.len(),
        resolutions,
        anomalies: model.anomalies().to_vec(),
    })
}

/// Plain lookup expressed as a binding, so both modes report alike.
fn plain_binding(model: &mut ProjectTypeModel<'_>, fqn: &str) -> ResolveResult<Binding> {
    let found = model.get_entity(fqn)?;
    let unknown = model
        .entity(found)
        .is_some_and(|entity| entity.kind() == EntityKind::Unknown);
    Ok(if unknown {
        Binding::Unresolved(found)
    } else {
        Binding::Resolved(found)
    })
}
