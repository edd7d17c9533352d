//! Relationship unification.
//!
//! The LLM proposes relationships as free-text subject/object names.
//! Unification resolves each side back to a KB identifier by scoring it
//! against the mentions already consolidated for the *current text
//! block* — never the whole KB, since the LLM only saw that block's
//! entities in its prompt.
//!
//! Unlike consolidation, which errs toward minting new entities when
//! uncertain, unification is best-effort: a relationship is meaningless
//! with a dangling endpoint, so by default the top-scoring candidate
//! wins regardless of how low the score is. An optional confidence
//! floor can be configured to leave doubtful endpoints unresolved.

use crate::config::UnifyConfig;
use crate::kb::EntityId;
use crate::resolve::similarity::name_similarity;
use crate::types::{ConsolidatedMention, RelationshipCandidate, RelationshipRecord, SourceContext};

/// Resolves LLM-proposed relationship endpoints to KB identities.
#[derive(Debug, Default)]
pub struct RelationshipUnifier {
    config: UnifyConfig,
}

impl RelationshipUnifier {
    /// Create a unifier.
    pub fn new(config: UnifyConfig) -> Self {
        Self { config }
    }

    /// Resolve one endpoint mention against the block's candidates.
    ///
    /// Returns `None` when the mention text is empty, the candidate set
    /// is empty, or the best score falls below the configured floor.
    /// The returned id always belongs to one of the supplied candidates.
    pub fn unify(
        &self,
        mention_text: &str,
        candidates: &[ConsolidatedMention],
    ) -> Option<EntityId> {
        if mention_text.trim().is_empty() {
            return None;
        }

        let mut best: Option<(EntityId, f64)> = None;
        for candidate in candidates {
            let score = name_similarity(mention_text, &candidate.mention.raw_text);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((candidate.kb_id, score));
            }
        }

        let (kb_id, score) = best?;
        if let Some(floor) = self.config.min_confidence {
            if score < floor {
                tracing::debug!(
                    mention = %mention_text,
                    score,
                    floor,
                    "endpoint left unresolved below confidence floor"
                );
                return None;
            }
        }
        Some(kb_id)
    }

    /// Resolve both endpoints of a candidate triple into a record.
    pub fn resolve(
        &self,
        candidate: RelationshipCandidate,
        block_mentions: &[ConsolidatedMention],
        source: SourceContext,
    ) -> RelationshipRecord {
        let subject_kb_id = self.unify(&candidate.subject_text, block_mentions);
        let object_kb_id = self.unify(&candidate.object_text, block_mentions);

        RelationshipRecord {
            subject_text: candidate.subject_text,
            subject_kb_id,
            relationship: candidate.relationship,
            object_text: candidate.object_text,
            object_kb_id,
            evidence: candidate.evidence,
            source,
        }
    }
}
