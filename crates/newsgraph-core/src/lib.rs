//! newsgraph-core - Core library for newsgraph.
//!
//! This crate provides the entity-consolidation engine for the news
//! knowledge-graph pipeline: a knowledge base of canonical entities,
//! the matcher that unifies new mentions against it, the consolidation
//! controller that grows the KB one mention at a time, and the
//! relationship unifier that resolves LLM-proposed triples back to KB
//! identities.
//!
//! # Example
//!
//! ```
//! use newsgraph_core::kb::KbStore;
//! use newsgraph_core::resolve::Consolidator;
//! use newsgraph_core::types::{EntityKind, MentionRecord, SourceContext};
//!
//! let mut kb = KbStore::new();
//! let consolidator = Consolidator::default();
//!
//! let mentions = vec![
//!     MentionRecord::new(
//!         "Mayor Jacob Frey",
//!         Some(EntityKind::Person),
//!         "Mayor Jacob Frey vetoed the ordinance.",
//!         vec![],
//!         SourceContext::new("article-1", "…"),
//!     ),
//!     MentionRecord::new(
//!         "Frey",
//!         Some(EntityKind::Person),
//!         "Frey cited public-safety concerns.",
//!         vec![],
//!         SourceContext::new("article-1", "…"),
//!     ),
//! ];
//!
//! let consolidated = consolidator.consolidate(mentions, &mut kb);
//! assert_eq!(kb.len(), 1);
//! assert_eq!(consolidated[0].canonical_name, "jacob frey");
//! ```

pub mod config;
pub mod error;
pub mod kb;
pub mod resolve;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{ConsolidationConfig, KgConfig, UnifyConfig};
pub use error::{ErrorCode, KgError, KgResult};
pub use kb::{EntityId, KbEntry, KbSnapshot, KbStore};
pub use resolve::{Consolidator, EntityMatcher, MatchOutcome, RelationshipUnifier, StrategyKind};
pub use traits::{Embedder, EmbedderConfig, GenerationOptions, Llm, LlmConfig, LlmResponse};
pub use types::{
    ConsolidatedMention, EntityKind, MentionRecord, Message, MessageRole, RelationshipCandidate,
    RelationshipRecord, SourceContext,
};
