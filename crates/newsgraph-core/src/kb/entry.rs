//! Canonical entity entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EntityKind;

/// Opaque identifier of a KB entry.
///
/// Generated on entry creation; never reused or recycled. Serializes as
/// the UUID string used in snapshot keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh identifier.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form (snapshot keys).
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deduplicated canonical entity.
///
/// Owned exclusively by the [`KbStore`](super::KbStore); mutated only
/// through consolidation merges. Invariant: `canonical_name` is always
/// present in `aliases`.
#[derive(Debug, Clone)]
pub struct KbEntry {
    /// Unique identifier.
    pub id: EntityId,
    /// Normalized canonical name.
    pub canonical_name: String,
    /// Known normalized surface forms, insertion-ordered and unique.
    pub aliases: Vec<String>,
    /// One context embedding per consolidated mention.
    pub embeddings: Vec<Vec<f32>>,
    /// Running mean of `embeddings`, maintained incrementally so that
    /// embedding-based matching stays O(1) per entry as mentions
    /// accumulate.
    pub centroid: Vec<f32>,
    /// Entity kind, set from the first mention that reported one.
    pub kind: Option<EntityKind>,
    /// Number of vectors folded into the centroid.
    centroid_count: usize,
}

impl KbEntry {
    /// Create an entry from its first mention.
    pub fn new(canonical_name: impl Into<String>, kind: Option<EntityKind>, embedding: Vec<f32>) -> Self {
        let canonical_name = canonical_name.into();
        let mut entry = Self {
            id: EntityId::new(),
            canonical_name: canonical_name.clone(),
            aliases: vec![canonical_name],
            embeddings: Vec::new(),
            centroid: Vec::new(),
            kind,
            centroid_count: 0,
        };
        entry.push_embedding(embedding);
        entry
    }

    /// Rebuild an entry from snapshot parts, preserving its id and alias
    /// order. The canonical name is appended to the aliases only if the
    /// snapshot omitted it.
    pub fn from_parts(
        id: EntityId,
        canonical_name: impl Into<String>,
        aliases: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Self {
        let canonical_name = canonical_name.into();
        let mut entry = Self {
            id,
            canonical_name: canonical_name.clone(),
            aliases,
            embeddings: Vec::new(),
            centroid: Vec::new(),
            kind: None,
            centroid_count: 0,
        };
        if !entry.aliases.contains(&canonical_name) {
            entry.aliases.push(canonical_name);
        }
        for embedding in embeddings {
            entry.push_embedding(embedding);
        }
        entry
    }

    /// Record an alias if it is not already known.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
    }

    /// Append a mention embedding and fold it into the running centroid.
    ///
    /// Vectors whose dimension disagrees with the centroid are stored but
    /// excluded from it; upstream embedding models are fixed-dimension,
    /// so a mismatch means a malformed input rather than a model change.
    pub fn push_embedding(&mut self, embedding: Vec<f32>) {
        if !embedding.is_empty() {
            if self.centroid.is_empty() {
                self.centroid = embedding.clone();
                self.centroid_count = 1;
            } else if self.centroid.len() == embedding.len() {
                self.centroid_count += 1;
                let n = self.centroid_count as f32;
                for (c, x) in self.centroid.iter_mut().zip(embedding.iter()) {
                    *c += (*x - *c) / n;
                }
            } else {
                tracing::warn!(
                    entity = %self.id,
                    expected = self.centroid.len(),
                    got = embedding.len(),
                    "embedding dimension mismatch; excluded from centroid"
                );
            }
        }
        self.embeddings.push(embedding);
    }
}
