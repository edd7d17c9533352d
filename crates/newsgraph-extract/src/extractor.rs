//! LLM-based relationship extraction.
//!
//! The extractor prompts an LLM with a block of article text and the
//! entities already consolidated for that block, and parses the JSON
//! array of relationship triples it returns. Parsing is lenient:
//! malformed items are dropped with a warning, never surfaced as an
//! error to the caller. Only LLM transport failures propagate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

use newsgraph_core::error::KgResult;
use newsgraph_core::traits::{GenerationOptions, Llm, ResponseFormat};
use newsgraph_core::types::{ConsolidatedMention, Message, RelationshipCandidate};

/// Default relationship labels offered to the LLM.
pub const DEFAULT_RELATIONSHIP_LABELS: &[&str] = &["VETOED", "PROPOSED", "SUPPORTED", "OPPOSED"];

/// Entity view serialized into the prompt. Embeddings are deliberately
/// left out, the model only needs names and kinds.
#[derive(Debug, Serialize)]
struct PromptEntity<'a> {
    canonical_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_type: Option<&'a str>,
}

/// Raw JSON structures for LLM response parsing.
/// These allow flexible parsing before converting to typed candidates.
mod raw {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct RawRelationship {
        #[serde(alias = "subject", alias = "source")]
        pub subject_text: Option<String>,
        #[serde(alias = "relationship_type", alias = "predicate", alias = "type")]
        pub relationship: Option<String>,
        #[serde(alias = "object", alias = "target")]
        pub object_text: Option<String>,
        #[serde(alias = "subjectType")]
        pub subject_type: Option<String>,
        #[serde(alias = "objectType")]
        pub object_type: Option<String>,
        #[serde(alias = "context", alias = "sentence")]
        pub evidence: Option<String>,
    }
}

/// LLM-based relationship extractor.
pub struct RelationshipExtractor {
    llm: Arc<dyn Llm>,
    labels: Vec<String>,
}

impl RelationshipExtractor {
    /// Create an extractor with the default relationship labels.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self::with_labels(
            llm,
            DEFAULT_RELATIONSHIP_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// Create an extractor with a custom label allow-list.
    pub fn with_labels(llm: Arc<dyn Llm>, labels: Vec<String>) -> Self {
        Self { llm, labels }
    }

    /// Extract relationship candidates for one text block.
    ///
    /// Returns an empty list for empty input, an empty entity list, or
    /// an unparseable response. LLM transport errors propagate.
    pub async fn extract(
        &self,
        block_text: &str,
        entities: &[ConsolidatedMention],
        headline: &str,
        date: Option<&str>,
    ) -> KgResult<Vec<RelationshipCandidate>> {
        let block_text = block_text.trim();
        if block_text.is_empty() || entities.is_empty() {
            return Ok(Vec::new());
        }

        let messages = vec![
            Message::system(self.system_prompt()),
            Message::user(Self::user_prompt(block_text, entities, headline, date)),
        ];

        let options = GenerationOptions {
            temperature: Some(0.0),
            response_format: Some(ResponseFormat::Json),
            ..Default::default()
        };

        let response = self.llm.generate(&messages, Some(options)).await?;
        Ok(self.parse_response(response.content_or_empty()))
    }

    fn system_prompt(&self) -> String {
        format!(
            r#"You are an expert in local political relationship extraction. Identify meaningful relationships only between the named entities provided with each text block.

Rules:
1. Both subject and object must be named entities from the provided list. Ignore non-entity terms (dates, numbers) unless tied to an action.
2. Use the exact entity names as listed. Do not alter or shorten them.
3. Do not repeat a relationship for the same subject-object pair.
4. Do not extract relationships regarding author contributions.

Possible relationships: {}

Return ONLY a JSON array in this exact format, no other text:
[
  {{
    "subject_text": "<subject entity>",
    "relationship": "<relationship>",
    "object_text": "<object entity>",
    "subject_type": "<subject entity type>",
    "object_type": "<object entity type>",
    "evidence": "<sentence containing the relationship>"
  }}
]"#,
            self.labels.join(", ")
        )
    }

    fn user_prompt(
        block_text: &str,
        entities: &[ConsolidatedMention],
        headline: &str,
        date: Option<&str>,
    ) -> String {
        let prompt_entities: Vec<PromptEntity<'_>> = entities
            .iter()
            .map(|e| PromptEntity {
                canonical_name: &e.canonical_name,
                entity_type: e.mention.kind.map(|k| k.as_str()),
            })
            .collect();
        let entities_json =
            serde_json::to_string(&prompt_entities).unwrap_or_else(|_| "[]".to_string());

        format!(
            "Headline: \"{}\"\nDate: \"{}\"\nText Block: \"{}\"\n\nNamed Entities (from the text): {}",
            headline,
            date.unwrap_or("unknown"),
            block_text,
            entities_json
        )
    }

    /// Parse the LLM response into relationship candidates.
    ///
    /// Unparseable responses and items missing either endpoint are
    /// dropped with a warning.
    pub fn parse_response(&self, content: &str) -> Vec<RelationshipCandidate> {
        let content = content.trim();
        if content.is_empty() {
            return Vec::new();
        }

        let json_str = Self::extract_json(content);

        let raw_items: Vec<raw::RawRelationship> = match serde_json::from_str(json_str) {
            Ok(items) => items,
            Err(e) => match Self::lenient_parse(json_str) {
                Some(items) => items,
                None => {
                    tracing::warn!("failed to parse relationship response: {}", e);
                    return Vec::new();
                }
            },
        };

        let mut candidates = Vec::new();
        for raw in raw_items {
            match Self::convert_candidate(raw) {
                Some(candidate) => candidates.push(candidate),
                None => tracing::warn!("dropping relationship item with empty endpoint"),
            }
        }
        candidates
    }

    /// Extract JSON from response (handles markdown code blocks).
    fn extract_json(content: &str) -> &str {
        static JSON_BLOCK: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").unwrap());

        if let Some(caps) = JSON_BLOCK.captures(content) {
            if let Some(m) = caps.get(1) {
                return m.as_str().trim();
            }
        }
        content
    }

    /// Lenient parsing for malformed JSON.
    fn lenient_parse(json_str: &str) -> Option<Vec<raw::RawRelationship>> {
        let fixed = json_str
            .replace('\'', "\"")
            .replace(",]", "]")
            .replace(",}", "}");
        serde_json::from_str(&fixed).ok()
    }

    fn convert_candidate(raw: raw::RawRelationship) -> Option<RelationshipCandidate> {
        let subject = raw.subject_text?.trim().to_string();
        let object = raw.object_text?.trim().to_string();
        if subject.is_empty() || object.is_empty() {
            return None;
        }

        let relationship = raw
            .relationship
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())?;

        let mut candidate = RelationshipCandidate::new(
            subject,
            relationship,
            object,
            raw.evidence.unwrap_or_default().trim().to_string(),
        );
        candidate.subject_kind = raw
            .subject_type
            .as_deref()
            .and_then(newsgraph_core::types::EntityKind::from_str_flexible);
        candidate.object_kind = raw
            .object_type
            .as_deref()
            .and_then(newsgraph_core::types::EntityKind::from_str_flexible);
        Some(candidate)
    }
}
