//! Shared vocabulary: identifiers, entity kinds, relation kinds, origins.
//!
//! These types appear in store rows, in the in-memory type models, and in
//! driver output, so they all serialize with stable `snake_case` names.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ID Types
// ============================================================================

/// Persisted identifier of an entity row.
///
/// Assigned by the store and unique across the whole corpus, not just within
/// one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    pub fn new(id: u32) -> Self {
        EntityId(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ent_{}", self.0)
    }
}

/// Identifier of a project or library in the corpus.
///
/// Libraries (jars) and the platform core library are projects too; the
/// distinction is made by whoever builds the type models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ProjectId(pub u32);

impl ProjectId {
    /// Create a new project ID.
    pub fn new(id: u32) -> Self {
        ProjectId(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proj_{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Kind of entity.
///
/// The first block is what extraction declares; the second block is what the
/// resolver synthesizes from compound names; `Unknown` marks placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Constructor,
    Method,
    AnnotationElement,
    EnumConstant,
    Field,
    Package,
    Initializer,

    Array,
    Wildcard,
    TypeVariable,
    ParameterizedType,

    Unknown,
}

impl EntityKind {
    /// Every kind extraction can declare.
    pub const DECLARED: &'static [EntityKind] = &[
        EntityKind::Class,
        EntityKind::Interface,
        EntityKind::Enum,
        EntityKind::Annotation,
        EntityKind::Constructor,
        EntityKind::Method,
        EntityKind::AnnotationElement,
        EntityKind::EnumConstant,
        EntityKind::Field,
        EntityKind::Package,
        EntityKind::Initializer,
    ];

    /// True for kinds that can take part in extends/implements edges.
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            EntityKind::Class | EntityKind::Interface | EntityKind::Enum | EntityKind::Annotation
        )
    }

    /// True for kinds the resolver creates from compound names.
    pub fn is_synthesized(&self) -> bool {
        matches!(
            self,
            EntityKind::Array
                | EntityKind::Wildcard
                | EntityKind::TypeVariable
                | EntityKind::ParameterizedType
        )
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
            EntityKind::Annotation => "annotation",
            EntityKind::Constructor => "constructor",
            EntityKind::Method => "method",
            EntityKind::AnnotationElement => "annotation_element",
            EntityKind::EnumConstant => "enum_constant",
            EntityKind::Field => "field",
            EntityKind::Package => "package",
            EntityKind::Initializer => "initializer",
            EntityKind::Array => "array",
            EntityKind::Wildcard => "wildcard",
            EntityKind::TypeVariable => "type_variable",
            EntityKind::ParameterizedType => "parameterized_type",
            EntityKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of relation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Extends,
    Implements,
    /// Parameterized type → its raw base type.
    HasBaseType,
    /// Array type → its element type.
    HasElementsOf,
    HasLowerBound,
    HasUpperBound,
    /// Parameterized type → one of its type arguments.
    HasTypeArgument,
}

impl RelationKind {
    /// Stable hyphenated name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::HasBaseType => "has-base-type",
            RelationKind::HasElementsOf => "has-elements-of",
            RelationKind::HasLowerBound => "has-lower-bound",
            RelationKind::HasUpperBound => "has-upper-bound",
            RelationKind::HasTypeArgument => "has-type-argument",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an entity's declaration lives.
///
/// Relation rows also carry the origin of their right-hand side so that
/// consumers can tell project-internal edges from edges into libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Declared in the project being resolved.
    Internal,
    /// Declared in a shared library baseline.
    Library,
    /// Synthesized compound type; no owning project.
    NotApplicable,
    /// Placeholder for a name that could not be resolved.
    Unknown,
}

impl Origin {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Internal => "internal",
            Origin::Library => "library",
            Origin::NotApplicable => "not_applicable",
            Origin::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
