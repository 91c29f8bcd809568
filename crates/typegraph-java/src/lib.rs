//! Java type models for typegraph.
//!
//! Resolves the fully qualified names emitted by Java extraction to entity
//! identities, in two layers:
//!
//! - [`LibraryTypeModel`]: declarations (and optionally inheritance) of the
//!   core and third-party libraries, built once and shared read-only.
//! - [`ProjectTypeModel`]: one project's declarations overlaid on the
//!   library model. Synthesizes compound types, resolves member references
//!   through virtual dispatch, and falls back to placeholders from the
//!   run-wide [`UnknownEntityCache`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use typegraph_core::progress::TaskProgress;
//! use typegraph_core::store::{InMemoryStore, NewEntity};
//! use typegraph_core::types::{EntityKind, ProjectId};
//! use typegraph_java::{LibraryTypeModel, ProjectTypeModel, UnknownEntityCache};
//!
//! let store = InMemoryStore::new();
//! store
//!     .declare(NewEntity::new(ProjectId(1), EntityKind::Class, "java.lang.String"))
//!     .unwrap();
//!
//! let mut progress = TaskProgress::new();
//! let library = LibraryTypeModel::build_virtual(&mut progress, &store, &[ProjectId(1)], None).unwrap();
//! let mut model = ProjectTypeModel::build_virtual(
//!     &mut progress,
//!     &store,
//!     ProjectId(2),
//!     Arc::new(library),
//!     Arc::new(UnknownEntityCache::new(ProjectId(0))),
//! )
//! .unwrap();
//!
//! let array = model.get_entity("java.lang.String[]").unwrap();
//! assert_eq!(model.entity(array).unwrap().kind(), EntityKind::Array);
//! ```

pub mod dispatch;
pub mod entity;
pub mod error;
pub mod fqn;
pub mod library;
pub mod project;
pub mod unknowns;

mod table;

pub use dispatch::Binding;
pub use entity::{Entity, EntityRef};
pub use error::{ResolveError, ResolveResult};
pub use library::{LibraryTypeModel, LibraryTypeModelBuilder};
pub use project::ProjectTypeModel;
pub use unknowns::UnknownEntityCache;
