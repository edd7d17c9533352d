//! Block-by-block article processing.
//!
//! Ties the stages together for one article: embed mention spans that
//! arrived without vectors, consolidate mentions into the shared KB,
//! ask the LLM for relationships between the block's entities, then
//! resolve relationship endpoints back to KB identities.

use std::sync::Arc;
use std::time::Duration;

use newsgraph_core::config::KgConfig;
use newsgraph_core::error::KgResult;
use newsgraph_core::kb::KbStore;
use newsgraph_core::resolve::{Consolidator, RelationshipUnifier};
use newsgraph_core::traits::{Embedder, Llm};
use newsgraph_core::types::{
    ConsolidatedMention, EntityKind, MentionRecord, RelationshipRecord, SourceContext,
};

use crate::extractor::RelationshipExtractor;

/// An entity span handed in by the upstream NER stage.
///
/// The embedding is optional: spans from archives that were embedded
/// offline carry one, fresh spans get embedded by the pipeline.
#[derive(Debug, Clone)]
pub struct MentionSpan {
    /// Surface text of the mention.
    pub text: String,
    /// NER-reported kind, if any.
    pub kind: Option<EntityKind>,
    /// The sentence the mention appeared in.
    pub evidence: String,
    /// Precomputed sentence embedding.
    pub embedding: Option<Vec<f32>>,
}

impl MentionSpan {
    /// Create a span without a precomputed embedding.
    pub fn new(text: impl Into<String>, kind: Option<EntityKind>, evidence: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            evidence: evidence.into(),
            embedding: None,
        }
    }

    /// Attach a precomputed embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// One text block of an article, with its NER spans.
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// Identifier of the source article.
    pub article_id: String,
    /// Article headline.
    pub headline: String,
    /// Publication date, when the archive supplies one.
    pub date: Option<String>,
    /// The block's full text.
    pub text: String,
    /// Entity spans found in the block.
    pub spans: Vec<MentionSpan>,
}

/// Result of processing one block.
#[derive(Debug)]
pub struct BlockOutcome {
    /// The block's mentions with their resolved KB identities.
    pub mentions: Vec<ConsolidatedMention>,
    /// Relationships extracted and resolved for the block.
    pub relationships: Vec<RelationshipRecord>,
}

/// Runs the consolidate/extract/unify stages per text block.
pub struct BlockPipeline {
    consolidator: Consolidator,
    extractor: RelationshipExtractor,
    unifier: RelationshipUnifier,
    embedder: Arc<dyn Embedder>,
    pacing: Option<Duration>,
}

impl BlockPipeline {
    /// Build a pipeline from configuration and provider handles.
    pub fn new(config: &KgConfig, llm: Arc<dyn Llm>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            consolidator: Consolidator::new(config.consolidation.clone()),
            extractor: RelationshipExtractor::new(llm),
            unifier: RelationshipUnifier::new(config.unify.clone()),
            embedder,
            pacing: None,
        }
    }

    /// Pause between blocks, for rate-limited providers.
    pub fn with_pacing(mut self, delay: Duration) -> Self {
        self.pacing = Some(delay);
        self
    }

    /// Process one block against the shared KB.
    pub async fn process_block(
        &self,
        block: &TextBlock,
        kb: &mut KbStore,
    ) -> KgResult<BlockOutcome> {
        let source = self.block_source(block);

        let mut mentions = Vec::with_capacity(block.spans.len());
        for span in &block.spans {
            let embedding = match &span.embedding {
                Some(vector) => vector.clone(),
                None => self.embedder.embed(&span.evidence).await?,
            };
            mentions.push(MentionRecord::new(
                span.text.clone(),
                span.kind,
                span.evidence.clone(),
                embedding,
                source.clone(),
            ));
        }

        let consolidated = self.consolidator.consolidate(mentions, kb);

        let candidates = self
            .extractor
            .extract(
                &block.text,
                &consolidated,
                &block.headline,
                block.date.as_deref(),
            )
            .await?;

        let relationships = candidates
            .into_iter()
            .map(|candidate| self.unifier.resolve(candidate, &consolidated, source.clone()))
            .collect();

        Ok(BlockOutcome {
            mentions: consolidated,
            relationships,
        })
    }

    /// Process an article's blocks in order against the shared KB.
    pub async fn process_article(
        &self,
        blocks: &[TextBlock],
        kb: &mut KbStore,
    ) -> KgResult<Vec<BlockOutcome>> {
        let mut outcomes = Vec::with_capacity(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            outcomes.push(self.process_block(block, kb).await?);
            if let Some(delay) = self.pacing {
                if i + 1 < blocks.len() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Ok(outcomes)
    }

    fn block_source(&self, block: &TextBlock) -> SourceContext {
        let mut source = SourceContext::new(block.article_id.clone(), block.text.clone())
            .with_headline(block.headline.clone());
        if let Some(date) = &block.date {
            source = source.with_date(date.clone());
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use newsgraph_core::traits::{GenerationOptions, LlmResponse};
    use newsgraph_core::types::Message;

    struct MockLlm {
        reply: String,
    }

    #[async_trait]
    impl Llm for MockLlm {
        async fn generate(
            &self,
            _: &[Message],
            _: Option<GenerationOptions>,
        ) -> KgResult<LlmResponse> {
            Ok(LlmResponse {
                content: Some(self.reply.clone()),
                usage: None,
            })
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    struct MockEmbedder;

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> KgResult<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "mock-embedder"
        }
    }

    fn pipeline(reply: &str) -> BlockPipeline {
        BlockPipeline::new(
            &KgConfig::default(),
            Arc::new(MockLlm {
                reply: reply.to_string(),
            }),
            Arc::new(MockEmbedder),
        )
    }

    fn frey_block() -> TextBlock {
        TextBlock {
            article_id: "article-1".to_string(),
            headline: "Council overrides veto".to_string(),
            date: Some("2024-01-10".to_string()),
            text: "Mayor Jacob Frey vetoed the measure. The City Council overrode it.".to_string(),
            spans: vec![
                MentionSpan::new(
                    "Mayor Jacob Frey",
                    Some(EntityKind::Person),
                    "Mayor Jacob Frey vetoed the measure.",
                ),
                MentionSpan::new(
                    "City Council",
                    Some(EntityKind::Organization),
                    "The City Council overrode it.",
                )
                .with_embedding(vec![1.0, 0.0]),
            ],
        }
    }

    #[tokio::test]
    async fn test_block_produces_resolved_relationships() {
        let reply = r#"[{"subject_text": "Mayor Jacob Frey", "relationship": "VETOED", "object_text": "City Council", "evidence": "Mayor Jacob Frey vetoed the measure."}]"#;
        let pipe = pipeline(reply);
        let mut kb = KbStore::new();

        let outcome = pipe.process_block(&frey_block(), &mut kb).await.unwrap();

        assert_eq!(outcome.mentions.len(), 2);
        assert_eq!(outcome.mentions[0].canonical_name, "jacob frey");
        assert_eq!(kb.len(), 2);

        assert_eq!(outcome.relationships.len(), 1);
        let rel = &outcome.relationships[0];
        assert_eq!(rel.subject_kb_id, Some(outcome.mentions[0].kb_id));
        assert_eq!(rel.object_kb_id, Some(outcome.mentions[1].kb_id));
        assert_eq!(rel.source.article_id, "article-1");
        assert_eq!(rel.source.date.as_deref(), Some("2024-01-10"));
    }

    #[tokio::test]
    async fn test_missing_embeddings_are_filled_in() {
        let pipe = pipeline("[]");
        let mut kb = KbStore::new();

        let outcome = pipe.process_block(&frey_block(), &mut kb).await.unwrap();

        // First span had no vector, the mock embedder supplied one.
        assert_eq!(outcome.mentions[0].mention.embedding.len(), 2);
        // Second span kept its precomputed vector.
        assert_eq!(outcome.mentions[1].mention.embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_article_blocks_share_the_kb() {
        let pipe = pipeline("[]");
        let mut kb = KbStore::new();

        let mut second = frey_block();
        second.text = "Frey spoke again.".to_string();
        second.spans = vec![MentionSpan::new(
            "Frey",
            Some(EntityKind::Person),
            "Frey spoke again.",
        )];

        let outcomes = pipe
            .process_article(&[frey_block(), second], &mut kb)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        // "Frey" in the second block merged into the first block's entity.
        assert_eq!(outcomes[1].mentions[0].kb_id, outcomes[0].mentions[0].kb_id);
        assert_eq!(kb.len(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_no_relationships() {
        let pipe = pipeline("the model rambled instead of returning json");
        let mut kb = KbStore::new();

        let outcome = pipe.process_block(&frey_block(), &mut kb).await.unwrap();
        assert!(outcome.relationships.is_empty());
        assert_eq!(outcome.mentions.len(), 2);
    }
}
