//! typegraph: Java type resolution over a mined entity/relation corpus.
//!
//! Maps the fully qualified names produced by source extraction to entity
//! identities, synthesizing compound types and resolving member references
//! through virtual dispatch.

// Core infrastructure - re-exported from typegraph-core
pub use typegraph_core::config;
pub use typegraph_core::diagnostics;
pub use typegraph_core::progress;
pub use typegraph_core::store;
pub use typegraph_core::types;

// Java type models - re-exported from typegraph-java
pub use typegraph_java::dispatch;
pub use typegraph_java::entity;
pub use typegraph_java::fqn;
pub use typegraph_java::library;
pub use typegraph_java::project;
pub use typegraph_java::unknowns;

// Driver
pub mod cli;
pub mod error;
pub mod output;
