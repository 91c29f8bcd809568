//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

use typegraph::config::{
    CliOverrides, ConfigError, ConfigFile, ConfigSource, ConfigValue, ModelMode, ResolverConfig,
    DEFAULT_ROOT_TYPE, DEFAULT_UNKNOWNS_PROJECT,
};
use typegraph::diagnostics::{Anomaly, Diagnostics};
use typegraph::progress::TaskProgress;
use typegraph::store::{
    EntityFilter, EntityRecord, EntityStore, InMemoryStore, NewEntity, RelationFilter,
    RelationRecord, StoreError, StoreSnapshot, STORE_SCHEMA_VERSION,
};
use typegraph::types::{EntityId, EntityKind, Origin, ProjectId, RelationKind};

// ============================================================================
// Java Type Models
// ============================================================================

use typegraph::dispatch::Binding;
use typegraph::entity::{Entity, EntityRef};
use typegraph::fqn::{is_array, is_compound_type, is_method, MemberRef, TypeName, WildcardBound};
use typegraph::library::{LibraryTypeModel, LibraryTypeModelBuilder};
use typegraph::project::ProjectTypeModel;
use typegraph::unknowns::UnknownEntityCache;

// ============================================================================
// Driver
// ============================================================================

use typegraph::cli::{load_store, run_resolve, save_store};
use typegraph::error::{OutputErrorCode, TypegraphError};
use typegraph::output::{
    emit_response, ErrorInfo, ErrorResponse, LibraryReport, ProjectReport, ResolutionInfo,
    ResolveResponse, TargetInfo, SCHEMA_VERSION,
};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // The imports above form the public API contract.
    let _ = std::any::type_name::<InMemoryStore>();
    let _ = std::any::type_name::<LibraryTypeModel>();
    let _ = std::any::type_name::<ProjectTypeModel<'static>>();
    let _ = std::any::type_name::<Binding>();
    let _ = std::any::type_name::<TypegraphError>();
    let _ = std::any::type_name::<ResolverConfig>();
}

#[test]
fn schema_versions_are_stable() {
    assert_eq!(SCHEMA_VERSION, "1");
    assert_eq!(STORE_SCHEMA_VERSION, 1);
}
