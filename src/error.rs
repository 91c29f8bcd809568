//! Error types and error code constants for typegraph.
//!
//! This module provides a unified error type (`TypegraphError`) that bridges
//! the errors of each layer (configuration, store, type models) into a common
//! format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, bad config values)
//! - `3`: Store errors (unreadable or incompatible snapshot, failed writes)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;
use typegraph_core::config::ConfigError;
use typegraph_core::store::StoreError;
use typegraph_java::ResolveError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad flag, bad config value).
    InvalidArguments = 2,
    /// The store could not be read or written.
    StoreError = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the driver.
#[derive(Debug, Error)]
pub enum TypegraphError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Store failure while loading, resolving or saving.
    #[error("store error: {message}")]
    StoreError {
        message: String,
        path: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl TypegraphError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TypegraphError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a store error tied to a file.
    pub fn store_at(err: StoreError, path: impl Into<String>) -> Self {
        TypegraphError::StoreError {
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TypegraphError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TypegraphError> for OutputErrorCode {
    fn from(err: &TypegraphError) -> Self {
        match err {
            TypegraphError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TypegraphError::StoreError { .. } => OutputErrorCode::StoreError,
            TypegraphError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<ConfigError> for TypegraphError {
    fn from(err: ConfigError) -> Self {
        TypegraphError::invalid_args(err.to_string())
    }
}

impl From<StoreError> for TypegraphError {
    fn from(err: StoreError) -> Self {
        TypegraphError::StoreError {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<ResolveError> for TypegraphError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Store(err) => TypegraphError::from(err),
            ResolveError::CachePoisoned => {
                TypegraphError::internal(ResolveError::CachePoisoned.to_string())
            }
        }
    }
}
