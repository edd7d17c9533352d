//! The mutable knowledge-base store.

use std::collections::HashMap;

use crate::kb::{EntityId, KbEntry};
use crate::types::EntityKind;

/// Insertion-ordered collection of canonical entities.
///
/// Matching iterates entries in insertion order, which makes
/// first-match tie-breaking deterministic and testable. Entries are
/// created and mutated through consolidation; they are never deleted.
///
/// The store is plain owned state: callers pass it by reference into the
/// consolidation controller, and parallel use requires external
/// serialization because matching depends on seeing all prior merges.
#[derive(Debug, Default)]
pub struct KbStore {
    entries: HashMap<EntityId, KbEntry>,
    order: Vec<EntityId>,
}

impl KbStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the store holds no entities.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: EntityId) -> Option<&KbEntry> {
        self.entries.get(&id)
    }

    /// Look up an entry mutably by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut KbEntry> {
        self.entries.get_mut(&id)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KbEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Entry ids in insertion order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Mint a new canonical entity and return its id.
    pub fn create_entry(
        &mut self,
        canonical_name: impl Into<String>,
        kind: Option<EntityKind>,
        embedding: Vec<f32>,
    ) -> EntityId {
        let entry = KbEntry::new(canonical_name, kind, embedding);
        let id = entry.id;
        self.insert_entry(entry);
        id
    }

    /// Insert a pre-built entry, preserving its id (snapshot resume).
    pub fn insert_entry(&mut self, entry: KbEntry) {
        let id = entry.id;
        if self.entries.insert(id, entry).is_none() {
            self.order.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut kb = KbStore::new();
        assert!(kb.is_empty());

        let id = kb.create_entry("jacob frey", Some(EntityKind::Person), vec![0.1]);
        assert_eq!(kb.len(), 1);
        let entry = kb.get(id).unwrap();
        assert_eq!(entry.canonical_name, "jacob frey");
        assert_eq!(entry.kind, Some(EntityKind::Person));
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let mut kb = KbStore::new();
        let a = kb.create_entry("alpha", None, vec![]);
        let b = kb.create_entry("beta", None, vec![]);
        let c = kb.create_entry("gamma", None, vec![]);

        let names: Vec<_> = kb.iter().map(|e| e.canonical_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(kb.ids(), &[a, b, c]);
    }

    #[test]
    fn test_reinsert_does_not_duplicate_order() {
        let mut kb = KbStore::new();
        let id = kb.create_entry("alpha", None, vec![]);
        let entry = kb.get(id).unwrap().clone();
        kb.insert_entry(entry);
        assert_eq!(kb.len(), 1);
    }
}
