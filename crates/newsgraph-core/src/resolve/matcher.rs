//! Entity matching against the knowledge base.
//!
//! Matching runs in two phases. An exact/substring pass over canonical
//! names and aliases short-circuits with a perfect score; if nothing
//! fires, a fuzzy pass scores every entry through the configured
//! [`MatchStrategy`] and reports the maximum, however low — the caller
//! applies the merge threshold.

use serde::{Deserialize, Serialize};

use crate::kb::{EntityId, KbEntry, KbStore};
use crate::resolve::similarity::{cosine_similarity, name_similarity};

/// Outcome of a matching pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    /// Best-scoring entry, if the KB holds any candidates.
    pub id: Option<EntityId>,
    /// Score in `[0, 1]`; 1.0 for exact/substring hits.
    pub score: f64,
}

impl MatchOutcome {
    /// Outcome when no entry could be scored.
    pub fn none() -> Self {
        Self { id: None, score: 0.0 }
    }

    /// Exact or substring hit.
    pub fn exact(id: EntityId) -> Self {
        Self { id: Some(id), score: 1.0 }
    }
}

/// Fuzzy scoring policy for the fallback pass.
///
/// The primary KB-merge decision is name-driven; the embedding variant
/// exists as an alternate policy behind the same interface.
pub trait MatchStrategy: Send + Sync {
    /// Score a probe against one KB entry, in `[0, 1]`.
    fn score(&self, probe: &str, embedding: &[f32], entry: &KbEntry) -> f64;
}

/// String-similarity scoring against the entry's canonical name.
#[derive(Debug, Default)]
pub struct NameSimilarity;

impl MatchStrategy for NameSimilarity {
    fn score(&self, probe: &str, _embedding: &[f32], entry: &KbEntry) -> f64 {
        name_similarity(probe, &entry.canonical_name)
    }
}

/// Cosine scoring of the mention embedding against the entry centroid.
#[derive(Debug, Default)]
pub struct EmbeddingSimilarity;

impl MatchStrategy for EmbeddingSimilarity {
    fn score(&self, _probe: &str, embedding: &[f32], entry: &KbEntry) -> f64 {
        cosine_similarity(embedding, &entry.centroid) as f64
    }
}

/// Which fuzzy strategy the matcher uses. Config-selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// String-edit similarity on canonical names (default).
    #[default]
    Name,
    /// Cosine similarity on embedding centroids.
    Embedding,
}

impl StrategyKind {
    /// Instantiate the strategy.
    pub fn build(self) -> Box<dyn MatchStrategy> {
        match self {
            Self::Name => Box::new(NameSimilarity),
            Self::Embedding => Box::new(EmbeddingSimilarity),
        }
    }
}

/// Scores mentions against every existing KB entry.
pub struct EntityMatcher {
    strategy: Box<dyn MatchStrategy>,
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::new(Box::new(NameSimilarity))
    }
}

impl EntityMatcher {
    /// Create a matcher with an explicit fuzzy strategy.
    pub fn new(strategy: Box<dyn MatchStrategy>) -> Self {
        Self { strategy }
    }

    /// Find the best-matching KB entry for a normalized probe string.
    ///
    /// Entries are visited in KB insertion order, so ties and multiple
    /// substring hits resolve to the earliest-created entry.
    ///
    /// An empty probe never matches: substring logic would otherwise
    /// attach it to the first entry, and empty mentions are required to
    /// mint their own entry instead.
    pub fn find_best_match(&self, probe: &str, embedding: &[f32], kb: &KbStore) -> MatchOutcome {
        if probe.is_empty() {
            return MatchOutcome::none();
        }

        let probe_lower = probe.to_lowercase();
        let mut best = MatchOutcome::none();

        for entry in kb.iter() {
            if Self::surface_match(&probe_lower, entry) {
                return MatchOutcome::exact(entry.id);
            }

            let score = self.strategy.score(&probe_lower, embedding, entry);
            if score > best.score {
                best = MatchOutcome {
                    id: Some(entry.id),
                    score,
                };
            }
        }
        best
    }

    /// Case-insensitive equality or substring relation (either
    /// direction) against the canonical name or any alias. Empty names
    /// on the entry side are skipped so they cannot swallow every probe.
    fn surface_match(probe_lower: &str, entry: &KbEntry) -> bool {
        std::iter::once(entry.canonical_name.as_str())
            .chain(entry.aliases.iter().map(String::as_str))
            .filter(|name| !name.is_empty())
            .any(|name| {
                let name = name.to_lowercase();
                name == *probe_lower || name.contains(probe_lower) || probe_lower.contains(&name)
            })
    }
}
