//! Placeholder entities for names outside the extracted corpus.
//!
//! Relations must still be recordable when their target is missing (classpath
//! gaps, generated code, partial extraction). The cache hands out one stable
//! `Unknown` row per distinct FQN for the lifetime of a run, shared by every
//! project model of that run.

use std::collections::HashMap;
use std::sync::Mutex;

use typegraph_core::store::{EntityStore, NewEntity};
use typegraph_core::types::{EntityId, EntityKind, Origin, ProjectId};

use crate::entity::Entity;
use crate::error::{ResolveError, ResolveResult};

/// Per-run memo of placeholder rows, keyed by FQN.
#[derive(Debug)]
pub struct UnknownEntityCache {
    /// Project the placeholder rows are filed under.
    owner: ProjectId,
    entries: Mutex<HashMap<String, EntityId>>,
}

impl UnknownEntityCache {
    pub fn new(owner: ProjectId) -> Self {
        UnknownEntityCache {
            owner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the placeholder for `fqn`, inserting its row on first use.
    ///
    /// The lock is held across the insert, so concurrent callers asking for
    /// the same name never produce two rows.
    pub fn get_unknown(&self, store: &dyn EntityStore, fqn: &str) -> ResolveResult<Entity> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ResolveError::CachePoisoned)?;
        let entity_id = match entries.get(fqn) {
            Some(&id) => id,
            None => {
                let id = store.insert_entity(NewEntity::new(self.owner, EntityKind::Unknown, fqn))?;
                tracing::debug!("Created unknown placeholder {} for {}", id, fqn);
                entries.insert(fqn.to_string(), id);
                id
            }
        };
        Ok(Entity::new(fqn, EntityKind::Unknown, entity_id, Origin::Unknown))
    }

    /// Number of distinct placeholders handed out so far.
    pub fn len(&self) -> ResolveResult<usize> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| ResolveError::CachePoisoned)?
            .len())
    }

    pub fn is_empty(&self) -> ResolveResult<bool> {
        Ok(self.len()? == 0)
    }
}
