//! Structured records of data-integrity anomalies.
//!
//! The resolver never fails on a malformed corpus. It recovers locally (keep
//! the first entry, skip the edge, report ambiguity) and records what it saw
//! here. Every record is also emitted through `tracing` at error level at the
//! moment it is pushed.

use serde::Serialize;

use crate::types::EntityId;

/// One anomaly observed while building or querying a type model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "anomaly", rename_all = "snake_case")]
pub enum Anomaly {
    /// A second entity tried to register under an FQN already taken.
    DuplicateFqn { fqn: String },
    /// An inheritance edge named a child that was never loaded.
    MissingChild { entity_id: EntityId },
    /// An inheritance edge named a parent found in neither the project nor
    /// the libraries.
    MissingParent { entity_id: EntityId },
    /// More than one class ancestor declares the member.
    MultipleClassCandidates { fqn: String, candidates: Vec<String> },
    /// More than one ancestor declares the field.
    AmbiguousField { fqn: String, candidates: Vec<String> },
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::DuplicateFqn { fqn } => write!(f, "Duplicate FQN: {fqn}"),
            Anomaly::MissingChild { entity_id } => {
                write!(f, "Missing child from map: {entity_id}")
            }
            Anomaly::MissingParent { entity_id } => {
                write!(f, "Missing parent from map: {entity_id}")
            }
            Anomaly::MultipleClassCandidates { fqn, candidates } => write!(
                f,
                "Multiple class methods for: {fqn} ({})",
                candidates.join(", ")
            ),
            Anomaly::AmbiguousField { fqn, candidates } => write!(
                f,
                "Virtual field resolution should never be ambiguous: {fqn} ({})",
                candidates.join(", ")
            ),
        }
    }
}

/// Append-only collection of anomalies.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    anomalies: Vec<Anomaly>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Record an anomaly and log it.
    pub fn push(&mut self, anomaly: Anomaly) {
        tracing::error!("{}", anomaly);
        self.anomalies.push(anomaly);
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Take every record, leaving the collection empty.
    pub fn drain(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }
}
