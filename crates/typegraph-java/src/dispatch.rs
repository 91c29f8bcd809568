//! Virtual dispatch over wired parent links.
//!
//! Given a receiver type that is known locally, find which ancestor
//! declarations a `receiver.member` reference can bind to at runtime.
//!
//! # Algorithm
//!
//! Breadth-first walk upward from the receiver's parents:
//!
//! - A parent that declares the member directly becomes a candidate and is
//!   not searched further (its own ancestors are shadowed).
//! - A parent that does not declare it is queued so its parents get probed.
//! - Each parent is probed at most once, which also keeps malformed cyclic
//!   hierarchies finite.
//!
//! Methods distinguish class candidates from interface candidates: a class
//! candidate wins over any number of interface candidates. Fields make no
//! such distinction.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use typegraph_core::diagnostics::Anomaly;
use typegraph_core::types::EntityKind;

use crate::entity::{Entity, EntityRef};

/// Outcome of a virtual-dispatch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "binding", content = "targets", rename_all = "snake_case")]
pub enum Binding {
    /// Exactly one declaration.
    Resolved(EntityRef),
    /// No declaration; the reference is an `Unknown` placeholder.
    Unresolved(EntityRef),
    /// Several equally plausible declarations, e.g. unrelated interfaces
    /// declaring the same signature. Consumers must treat every candidate
    /// as a possible target.
    Ambiguous(Vec<EntityRef>),
}

impl Binding {
    /// Every entity this binding can denote.
    pub fn candidates(&self) -> &[EntityRef] {
        match self {
            Binding::Resolved(r) | Binding::Unresolved(r) => std::slice::from_ref(r),
            Binding::Ambiguous(candidates) => candidates,
        }
    }

    /// The single target, unless the binding is ambiguous.
    pub fn single(&self) -> Option<EntityRef> {
        match self {
            Binding::Resolved(r) | Binding::Unresolved(r) => Some(*r),
            Binding::Ambiguous(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Binding::Resolved(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Binding::Ambiguous(_))
    }
}

/// Read access to a hierarchy the walk can run over.
pub(crate) trait Hierarchy {
    /// Entity behind a reference; `None` for references this view cannot see.
    fn entity(&self, r: EntityRef) -> Option<&Entity>;

    /// Direct declaration with this exact FQN; synthesized types excluded.
    fn declared(&self, fqn: &str) -> Option<EntityRef>;
}

/// Candidates found by a walk, before placeholders are involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Candidates {
    None,
    Single(EntityRef),
    Many(Vec<EntityRef>),
}

impl Candidates {
    fn from_vec(mut found: Vec<EntityRef>) -> Self {
        match found.len() {
            0 => Candidates::None,
            1 => Candidates::Single(found.remove(0)),
            _ => Candidates::Many(found),
        }
    }

    pub(crate) fn into_binding(self) -> Option<Binding> {
        match self {
            Candidates::None => None,
            Candidates::Single(r) => Some(Binding::Resolved(r)),
            Candidates::Many(all) => Some(Binding::Ambiguous(all)),
        }
    }
}

/// Result of a walk plus the anomaly it ran into, if any.
#[derive(Debug)]
pub(crate) struct Dispatch {
    pub(crate) candidates: Candidates,
    pub(crate) anomaly: Option<Anomaly>,
}

/// Visit every ancestor that declares `member`, stopping the upward search
/// at each one.
fn walk(
    hierarchy: &impl Hierarchy,
    receiver: EntityRef,
    member: &str,
    mut on_found: impl FnMut(&Entity, EntityRef),
) {
    let mut queue = VecDeque::from([receiver]);
    let mut seen = HashSet::from([receiver]);
    while let Some(current) = queue.pop_front() {
        let Some(entity) = hierarchy.entity(current) else {
            continue;
        };
        for &parent_ref in entity.parents() {
            if !seen.insert(parent_ref) {
                continue;
            }
            let Some(parent) = hierarchy.entity(parent_ref) else {
                continue;
            };
            match hierarchy.declared(&format!("{}.{}", parent.fqn(), member)) {
                Some(found) => on_found(parent, found),
                None => queue.push_back(parent_ref),
            }
        }
    }
}

fn push_unique(list: &mut Vec<EntityRef>, r: EntityRef) {
    if !list.contains(&r) {
        list.push(r);
    }
}

fn fqns_of(hierarchy: &impl Hierarchy, refs: &[EntityRef]) -> Vec<String> {
    refs.iter()
        .filter_map(|&r| hierarchy.entity(r))
        .map(|e| e.fqn().to_string())
        .collect()
}

/// Resolve a method reference through the receiver's ancestors.
///
/// # Arguments
///
/// * `hierarchy` - The view to walk (project overlay or library baseline)
/// * `receiver` - The receiver type, already known to the view
/// * `fqn` - The full reference, used for anomaly records
/// * `member` - Method name with signature, e.g. `m(int)`
///
/// # Returns
///
/// The class candidate if there is one; otherwise the interface
/// candidates. Two or more distinct class candidates cannot happen under
/// single class inheritance; if the data says otherwise, all of them are
/// returned as ambiguous and an anomaly is attached.
pub(crate) fn resolve_method(
    hierarchy: &impl Hierarchy,
    receiver: EntityRef,
    fqn: &str,
    member: &str,
) -> Dispatch {
    let mut class_methods = Vec::new();
    let mut interface_methods = Vec::new();
    walk(hierarchy, receiver, member, |parent, found| {
        if parent.kind() == EntityKind::Interface {
            push_unique(&mut interface_methods, found);
        } else {
            push_unique(&mut class_methods, found);
        }
    });

    if class_methods.len() > 1 {
        let anomaly = Anomaly::MultipleClassCandidates {
            fqn: fqn.to_string(),
            candidates: fqns_of(hierarchy, &class_methods),
        };
        return Dispatch {
            candidates: Candidates::Many(class_methods),
            anomaly: Some(anomaly),
        };
    }
    let candidates = match class_methods.pop() {
        Some(class_method) => Candidates::Single(class_method),
        None => Candidates::from_vec(interface_methods),
    };
    Dispatch {
        candidates,
        anomaly: None,
    }
}

/// Resolve a field reference through the receiver's ancestors.
///
/// Any number of declaring ancestors is collected. More than one is recorded
/// as an anomaly but still returned as ambiguous.
pub(crate) fn resolve_field(
    hierarchy: &impl Hierarchy,
    receiver: EntityRef,
    fqn: &str,
    member: &str,
) -> Dispatch {
    let mut fields = Vec::new();
    walk(hierarchy, receiver, member, |_, found| {
        push_unique(&mut fields, found)
    });

    let anomaly = if fields.len() > 1 {
        Some(Anomaly::AmbiguousField {
            fqn: fqn.to_string(),
            candidates: fqns_of(hierarchy, &fields),
        })
    } else {
        None
    };
    Dispatch {
        candidates: Candidates::from_vec(fields),
        anomaly,
    }
}
