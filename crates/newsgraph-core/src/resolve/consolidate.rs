//! Consolidation controller.
//!
//! Processes a batch of mentions in input order against the shared KB
//! store: each mention either merges into the best-matching existing
//! entry or mints a new canonical entity. Mutation is immediate — a
//! merge or creation is visible to the very next mention in the batch,
//! which makes consolidation an online, order-sensitive algorithm
//! rather than a batch-symmetric clustering. Earlier mentions shape the
//! KB that later mentions match against.

use crate::config::ConsolidationConfig;
use crate::kb::KbStore;
use crate::resolve::matcher::EntityMatcher;
use crate::resolve::normalize::canonicalize;
use crate::types::{ConsolidatedMention, MentionRecord};

/// Merges mention streams into the knowledge base.
pub struct Consolidator {
    config: ConsolidationConfig,
    matcher: EntityMatcher,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new(ConsolidationConfig::default())
    }
}

impl Consolidator {
    /// Create a consolidator; the matcher strategy comes from config.
    pub fn new(config: ConsolidationConfig) -> Self {
        let matcher = EntityMatcher::new(config.strategy.build());
        Self { config, matcher }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Consolidate mentions against the KB, in input order.
    ///
    /// Every mention produces an output record; a mention that matches
    /// nothing above the threshold creates a new entry rather than being
    /// rejected. Mentions whose canonical form is empty still create an
    /// entry with an empty canonical name — filtering such mentions is
    /// the NER layer's job, and silently dropping them here would hide
    /// upstream breakage.
    pub fn consolidate(
        &self,
        mentions: Vec<MentionRecord>,
        kb: &mut KbStore,
    ) -> Vec<ConsolidatedMention> {
        let mut consolidated = Vec::with_capacity(mentions.len());

        for mention in mentions {
            let probe = canonicalize(&mention.raw_text);
            if probe.is_empty() {
                tracing::warn!(
                    raw = %mention.raw_text,
                    article = %mention.source.article_id,
                    "mention normalized to empty canonical name"
                );
            }

            let outcome = self.matcher.find_best_match(&probe, &mention.embedding, kb);

            let (kb_id, canonical_name) = match outcome.id {
                Some(id) if outcome.score >= self.config.similarity_threshold => {
                    // Merge into the matched entry.
                    let entry = kb
                        .get_mut(id)
                        .unwrap_or_else(|| unreachable!("matcher returned unknown id"));
                    entry.add_alias(mention.normalized_text.clone());
                    entry.add_alias(probe.clone());
                    entry.push_embedding(mention.embedding.clone());
                    if entry.kind.is_none() {
                        entry.kind = mention.kind;
                    }
                    tracing::debug!(
                        mention = %mention.raw_text,
                        entity = %id,
                        canonical = %entry.canonical_name,
                        score = outcome.score,
                        "merged mention into existing entity"
                    );
                    (id, entry.canonical_name.clone())
                }
                _ => {
                    // No confident match: mint a new canonical entity.
                    let id = kb.create_entry(probe.clone(), mention.kind, mention.embedding.clone());
                    if let Some(entry) = kb.get_mut(id) {
                        entry.add_alias(mention.normalized_text.clone());
                    }
                    tracing::debug!(
                        mention = %mention.raw_text,
                        entity = %id,
                        canonical = %probe,
                        best_score = outcome.score,
                        "created new entity"
                    );
                    (id, probe)
                }
            };

            consolidated.push(ConsolidatedMention {
                mention,
                kb_id,
                canonical_name,
            });
        }

        consolidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, SourceContext};

    fn mention(raw: &str) -> MentionRecord {
        MentionRecord::new(
            raw,
            Some(EntityKind::Person),
            format!("{} appeared in a sentence.", raw),
            vec![],
            SourceContext::new("article-1", "block text"),
        )
    }

    fn consolidate(raws: &[&str], kb: &mut KbStore) -> Vec<ConsolidatedMention> {
        let consolidator = Consolidator::default();
        consolidator.consolidate(raws.iter().map(|r| mention(r)).collect(), kb)
    }

    #[test]
    fn test_frey_mentions_collapse_to_one_entity() {
        let mut kb = KbStore::new();
        let out = consolidate(&["Jacob Frey", "Mayor Frey", "Jacob Lawrence Frey"], &mut kb);

        assert_eq!(kb.len(), 1);
        let entry = kb.iter().next().unwrap();
        assert_eq!(entry.canonical_name, "jacob frey");
        assert!(entry.aliases.contains(&"mayor frey".to_string()));
        assert!(entry.aliases.contains(&"jacob lawrence frey".to_string()));

        // All three output records point at the same entity.
        assert!(out.iter().all(|c| c.kb_id == entry.id));
        assert!(out.iter().all(|c| c.canonical_name == "jacob frey"));
    }

    #[test]
    fn test_democratic_party_variants_merge() {
        let mut kb = KbStore::new();
        consolidate(
            &["Democratic Party", "Democrats", "Democratic National Committee"],
            &mut kb,
        );

        // "democrats" crosses the fuzzy threshold against "democratic
        // party", and "Democratic National Committee" canonicalizes to
        // "democratic committee" which also crosses it.
        assert_eq!(kb.len(), 1);
        let entry = kb.iter().next().unwrap();
        assert_eq!(entry.canonical_name, "democratic party");
        assert!(entry.aliases.contains(&"democrats".to_string()));
        assert!(entry
            .aliases
            .contains(&"democratic national committee".to_string()));
    }

    #[test]
    fn test_exact_re_mention_never_grows_kb() {
        let mut kb = KbStore::new();
        consolidate(&["Jacob Frey"], &mut kb);
        assert_eq!(kb.len(), 1);
        consolidate(&["Jacob Frey", "jacob frey"], &mut kb);
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_disjoint_mention_grows_kb_by_one() {
        let mut kb = KbStore::new();
        consolidate(&["Jacob Frey"], &mut kb);
        consolidate(&["Tim Walz"], &mut kb);
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_alias_accumulation_on_merge() {
        let mut kb = KbStore::new();
        let out = consolidate(&["Jacob Frey", "Mayor Frey"], &mut kb);
        let entry = kb.get(out[1].kb_id).unwrap();
        // The folded surface form of the merged mention is recorded.
        assert!(entry.aliases.contains(&out[1].mention.normalized_text));
    }

    #[test]
    fn test_order_sensitivity() {
        // "frey" and "freya olson" substring-match each other, so
        // whichever arrives first donates the canonical name.
        let mut kb_ab = KbStore::new();
        consolidate(&["Frey", "Freya Olson"], &mut kb_ab);
        let mut kb_ba = KbStore::new();
        consolidate(&["Freya Olson", "Frey"], &mut kb_ba);

        assert_eq!(kb_ab.len(), 1);
        assert_eq!(kb_ba.len(), 1);
        assert_eq!(kb_ab.iter().next().unwrap().canonical_name, "frey");
        assert_eq!(kb_ba.iter().next().unwrap().canonical_name, "freya olson");
    }

    #[test]
    fn test_empty_mention_creates_entry() {
        let mut kb = KbStore::new();
        consolidate(&["Jacob Frey"], &mut kb);
        let out = consolidate(&[""], &mut kb);

        // Known gap: empty text is not rejected, it becomes its own
        // (empty-named) entity instead of attaching to an existing one.
        assert_eq!(kb.len(), 2);
        assert_eq!(out[0].canonical_name, "");
        assert_eq!(kb.get(out[0].kb_id).unwrap().canonical_name, "");
    }

    #[test]
    fn test_embeddings_accumulate_on_merge() {
        let consolidator = Consolidator::default();
        let mut kb = KbStore::new();
        let mentions = vec![
            MentionRecord::new(
                "Jacob Frey",
                None,
                "ev1",
                vec![1.0, 0.0],
                SourceContext::default(),
            ),
            MentionRecord::new(
                "Mayor Frey",
                None,
                "ev2",
                vec![0.0, 1.0],
                SourceContext::default(),
            ),
        ];
        consolidator.consolidate(mentions, &mut kb);

        let entry = kb.iter().next().unwrap();
        assert_eq!(entry.embeddings.len(), 2);
        assert_eq!(entry.centroid, vec![0.5, 0.5]);
    }

    #[test]
    fn test_kind_set_from_first_reporting_mention() {
        let consolidator = Consolidator::default();
        let mut kb = KbStore::new();
        let mentions = vec![
            MentionRecord::new("Jacob Frey", None, "ev", vec![], SourceContext::default()),
            MentionRecord::new(
                "Mayor Frey",
                Some(EntityKind::Person),
                "ev",
                vec![],
                SourceContext::default(),
            ),
        ];
        consolidator.consolidate(mentions, &mut kb);
        assert_eq!(kb.iter().next().unwrap().kind, Some(EntityKind::Person));
    }

    #[test]
    fn test_custom_threshold() {
        // With a threshold above the jaro-winkler score of the pair,
        // "Democrats" becomes its own entity.
        let consolidator = Consolidator::new(ConsolidationConfig::with_threshold(0.95));
        let mut kb = KbStore::new();
        consolidator.consolidate(
            vec![mention("Democratic Party"), mention("Democrats")],
            &mut kb,
        );
        assert_eq!(kb.len(), 2);
    }
}
