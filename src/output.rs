//! JSON output types for the driver.
//!
//! Every response carries `status` and `schema_version` so callers can
//! detect incompatible output before reading the rest.

use std::io::{self, Write};

use serde::Serialize;
use typegraph_core::config::ModelMode;
use typegraph_core::diagnostics::Anomaly;
use typegraph_core::types::{EntityId, EntityKind, Origin, ProjectId};
use typegraph_java::{Binding, Entity, EntityRef};

use crate::error::{OutputErrorCode, TypegraphError};

/// Version of the output schema. Bump on incompatible changes.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Building Blocks
// ============================================================================

/// One entity a name resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetInfo {
    pub fqn: String,
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub origin: Origin,
}

impl TargetInfo {
    pub fn from_entity(entity: &Entity) -> Self {
        TargetInfo {
            fqn: entity.fqn().to_string(),
            kind: entity.kind(),
            entity_id: entity.entity_id(),
            origin: entity.origin(),
        }
    }
}

/// Outcome of resolving one requested name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionInfo {
    /// The name as requested.
    pub fqn: String,
    /// `resolved`, `unresolved` or `ambiguous`.
    pub status: String,
    pub targets: Vec<TargetInfo>,
}

impl ResolutionInfo {
    /// Describe a binding, looking each candidate up with `lookup`.
    pub fn new<'a>(
        fqn: impl Into<String>,
        binding: &Binding,
        lookup: impl Fn(EntityRef) -> Option<&'a Entity>,
    ) -> Self {
        let status = match binding {
            Binding::Resolved(_) => "resolved",
            Binding::Unresolved(_) => "unresolved",
            Binding::Ambiguous(_) => "ambiguous",
        };
        ResolutionInfo {
            fqn: fqn.into(),
            status: status.to_string(),
            targets: binding
                .candidates()
                .iter()
                .filter_map(|&r| lookup(r))
                .map(TargetInfo::from_entity)
                .collect(),
        }
    }
}

/// Summary of the shared library model.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryReport {
    pub entities: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

/// Results for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project_id: ProjectId,
    /// Entities in the project's own arena after resolution.
    pub entities: usize,
    pub resolutions: Vec<ResolutionInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<Anomaly>,
}

// ============================================================================
// Responses
// ============================================================================

/// Response of a resolve run.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub mode: ModelMode,
    pub library: LibraryReport,
    pub projects: Vec<ProjectReport>,
    /// Distinct placeholders handed out during the run.
    pub unknowns: usize,
}

impl ResolveResponse {
    pub fn new(
        mode: ModelMode,
        library: LibraryReport,
        projects: Vec<ProjectReport>,
        unknowns: usize,
    ) -> Self {
        ResolveResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode,
            library,
            projects,
            unknowns,
        }
    }
}

/// Error information for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the process exit code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &TypegraphError) -> Self {
        let details = match err {
            TypegraphError::StoreError {
                path: Some(path), ..
            } => Some(serde_json::json!({ "path": path })),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Response emitted when a run fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &TypegraphError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
