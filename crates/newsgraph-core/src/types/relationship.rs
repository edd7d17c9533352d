//! Relationship triple types.
//!
//! A `RelationshipCandidate` is what the LLM proposes for a text block;
//! it is untrusted input and carries free-text endpoint names. The
//! unifier resolves those endpoints against the block's consolidated
//! mentions and produces an immutable `RelationshipRecord`.

use serde::{Deserialize, Serialize};

use crate::kb::EntityId;
use crate::types::{EntityKind, SourceContext};

/// An LLM-proposed relationship between two entity mentions.
///
/// The `relationship` label is treated as an opaque string at this
/// layer; any allow-list is applied upstream in the extraction prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    /// Free-text subject entity name as the LLM wrote it.
    pub subject_text: String,
    /// Relationship label.
    pub relationship: String,
    /// Free-text object entity name as the LLM wrote it.
    pub object_text: String,
    /// The sentence the LLM cites for the relationship.
    pub evidence: String,
    /// Subject entity kind, if the LLM reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<EntityKind>,
    /// Object entity kind, if the LLM reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_kind: Option<EntityKind>,
}

impl RelationshipCandidate {
    /// Create a candidate triple.
    pub fn new(
        subject_text: impl Into<String>,
        relationship: impl Into<String>,
        object_text: impl Into<String>,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            subject_text: subject_text.into(),
            relationship: relationship.into(),
            object_text: object_text.into(),
            evidence: evidence.into(),
            subject_kind: None,
            object_kind: None,
        }
    }
}

/// A relationship triple with resolved KB endpoints.
///
/// `subject_kb_id`/`object_kb_id` stay `None` when unification found no
/// candidate to attach the endpoint to. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Free-text subject entity name.
    pub subject_text: String,
    /// Resolved subject KB entry, if any.
    pub subject_kb_id: Option<EntityId>,
    /// Relationship label (opaque at this layer).
    pub relationship: String,
    /// Free-text object entity name.
    pub object_text: String,
    /// Resolved object KB entry, if any.
    pub object_kb_id: Option<EntityId>,
    /// The sentence cited as evidence.
    pub evidence: String,
    /// Provenance of the block the relationship was extracted from.
    #[serde(default)]
    pub source: SourceContext,
}

impl RelationshipRecord {
    /// Whether both endpoints resolved to KB entries.
    pub fn is_fully_resolved(&self) -> bool {
        self.subject_kb_id.is_some() && self.object_kb_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_serde_optional_kinds() {
        let json = r#"{
            "subject_text": "Jacob Frey",
            "relationship": "VETOED",
            "object_text": "rent control ordinance",
            "evidence": "Frey vetoed the ordinance on Tuesday."
        }"#;
        let cand: RelationshipCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(cand.subject_text, "Jacob Frey");
        assert_eq!(cand.relationship, "VETOED");
        assert!(cand.subject_kind.is_none());
    }

    #[test]
    fn test_record_resolution_state() {
        let record = RelationshipRecord {
            subject_text: "a".into(),
            subject_kb_id: Some(EntityId::new()),
            relationship: "SUPPORTED".into(),
            object_text: "b".into(),
            object_kb_id: None,
            evidence: "a supported b".into(),
            source: SourceContext::default(),
        };
        assert!(!record.is_fully_resolved());
    }
}
