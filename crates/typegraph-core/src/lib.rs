//! Core infrastructure for typegraph.
//!
//! This crate provides the language-agnostic layer the type models sit on:
//! - Identifiers and the entity/relation/origin vocabulary
//! - The entity/relation store trait and an in-memory implementation
//! - Structured anomaly diagnostics
//! - Nested task progress reporting
//! - Resolver configuration with precedence tracking

pub mod config;
pub mod diagnostics;
pub mod progress;
pub mod store;
pub mod types;
