//! Error type for the Java type models.
//!
//! Resolution itself never fails: anomalies are recorded and unresolvable
//! names get placeholders. The only failures that propagate are the store's.

use thiserror::Error;
use typegraph_core::store::StoreError;

/// Errors that can occur while building or querying a type model.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The store failed to read or insert rows.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The unknown-entity cache lock was poisoned by a panicking writer.
    #[error("unknown entity cache lock poisoned")]
    CachePoisoned,
}

/// Result type for type-model operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
