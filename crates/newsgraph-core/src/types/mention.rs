//! Entity mention types.
//!
//! A mention is a single observed occurrence of an entity name in a text
//! block, produced upstream by an NER model. Mentions are immutable once
//! created; consolidation attaches KB identity without modifying them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::kb::EntityId;
use crate::resolve::normalize::fold;

/// Entity categories recognized by the upstream NER model.
///
/// The variants mirror the spaCy label set the news pipeline is trained
/// on; `from_str_flexible` absorbs the casing and naming variations seen
/// in model and LLM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A person (e.g., "Jacob Frey").
    Person,
    /// An organization (e.g., "Minneapolis City Council").
    Organization,
    /// A geopolitical entity (e.g., "Minneapolis", "Minnesota").
    Gpe,
    /// A non-GPE location (e.g., "Mississippi River").
    Location,
    /// A product.
    Product,
    /// An event (e.g., "city council meeting").
    Event,
    /// A law, bill, or ordinance.
    Law,
    /// A nationality, religious, or political group.
    Norp,
    /// A facility (e.g., "U.S. Bank Stadium").
    Facility,
}

impl EntityKind {
    /// Parse an entity kind from a string with flexible matching.
    ///
    /// Handles spaCy-style upper-case labels ("PERSON", "ORG", "FAC") as
    /// well as spelled-out forms from LLM output.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();

        match normalized.as_str() {
            "person" | "per" | "people" | "individual" => Some(Self::Person),
            "org" | "organization" | "organisation" | "company" | "institution" | "agency" => {
                Some(Self::Organization)
            }
            "gpe" | "geopolitical" | "city" | "state" | "country" => Some(Self::Gpe),
            "loc" | "location" | "place" | "area" | "region" => Some(Self::Location),
            "product" | "prod" => Some(Self::Product),
            "event" | "evt" | "meeting" | "election" => Some(Self::Event),
            "law" | "bill" | "ordinance" | "statute" => Some(Self::Law),
            "norp" | "nationality" | "political_group" | "religious_group" => Some(Self::Norp),
            "fac" | "facility" | "building" | "venue" => Some(Self::Facility),
            _ => None,
        }
    }

    /// Get all entity kind variants.
    pub fn all() -> &'static [EntityKind] {
        &[
            Self::Person,
            Self::Organization,
            Self::Gpe,
            Self::Location,
            Self::Product,
            Self::Event,
            Self::Law,
            Self::Norp,
            Self::Facility,
        ]
    }

    /// Convert to string for prompts and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Gpe => "gpe",
            Self::Location => "location",
            Self::Product => "product",
            Self::Event => "event",
            Self::Law => "law",
            Self::Norp => "norp",
            Self::Facility => "facility",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_flexible(s).ok_or_else(|| format!("Unknown entity kind: {}", s))
    }
}

/// Provenance of a mention: which article and block it came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceContext {
    /// Identifier of the source article.
    pub article_id: String,
    /// Article headline.
    #[serde(default)]
    pub headline: String,
    /// Publication date as supplied by the archive (ISO 8601 string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// The full text block the mention was found in. Kept for the
    /// relationship-extraction prompt.
    #[serde(default)]
    pub block_text: String,
}

impl SourceContext {
    /// Create a context for an article block.
    pub fn new(article_id: impl Into<String>, block_text: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            headline: String::new(),
            date: None,
            block_text: block_text.into(),
        }
    }

    /// Attach a headline.
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    /// Attach a publication date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// A single observed entity mention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionRecord {
    /// The surface string exactly as it appeared in the text.
    pub raw_text: String,
    /// Case- and whitespace-folded form of `raw_text`.
    pub normalized_text: String,
    /// Entity kind reported by the NER model, if recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    /// The sentence containing the mention, kept for provenance.
    pub evidence: String,
    /// Sentence-level context embedding from the external model.
    pub embedding: Vec<f32>,
    /// Where the mention came from.
    #[serde(default)]
    pub source: SourceContext,
}

impl MentionRecord {
    /// Create a mention. The normalized form is derived from `raw_text`.
    pub fn new(
        raw_text: impl Into<String>,
        kind: Option<EntityKind>,
        evidence: impl Into<String>,
        embedding: Vec<f32>,
        source: SourceContext,
    ) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = fold(&raw_text);
        Self {
            raw_text,
            normalized_text,
            kind,
            evidence: evidence.into(),
            embedding,
            source,
        }
    }
}

/// A mention with its resolved KB identity, the output of consolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedMention {
    /// The original mention.
    pub mention: MentionRecord,
    /// Identifier of the KB entry the mention resolved to.
    pub kb_id: EntityId,
    /// The entry's canonical name at the time of consolidation.
    pub canonical_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str_flexible() {
        assert_eq!(EntityKind::from_str_flexible("PERSON"), Some(EntityKind::Person));
        assert_eq!(EntityKind::from_str_flexible("ORG"), Some(EntityKind::Organization));
        assert_eq!(EntityKind::from_str_flexible("GPE"), Some(EntityKind::Gpe));
        assert_eq!(EntityKind::from_str_flexible("FAC"), Some(EntityKind::Facility));
        assert_eq!(EntityKind::from_str_flexible("  law "), Some(EntityKind::Law));
        assert_eq!(EntityKind::from_str_flexible("widget"), None);
        assert_eq!(EntityKind::from_str_flexible(""), None);
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Person.to_string(), "person");
        assert_eq!(EntityKind::Norp.to_string(), "norp");
    }

    #[test]
    fn test_entity_kind_serde() {
        let json = serde_json::to_string(&EntityKind::Organization).unwrap();
        assert_eq!(json, "\"organization\"");
        let parsed: EntityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EntityKind::Organization);
    }

    #[test]
    fn test_mention_normalizes_on_creation() {
        let mention = MentionRecord::new(
            "  Jacob   Frey ",
            Some(EntityKind::Person),
            "Mayor Jacob Frey spoke.",
            vec![0.1, 0.2],
            SourceContext::new("a1", "block"),
        );
        assert_eq!(mention.raw_text, "  Jacob   Frey ");
        assert_eq!(mention.normalized_text, "jacob frey");
    }

    #[test]
    fn test_source_context_builder() {
        let ctx = SourceContext::new("a1", "some block")
            .with_headline("Council votes")
            .with_date("2024-03-01");
        assert_eq!(ctx.headline, "Council votes");
        assert_eq!(ctx.date.as_deref(), Some("2024-03-01"));
    }
}
