//! Core data types for newsgraph.

mod mention;
mod message;
mod relationship;

pub use mention::{ConsolidatedMention, EntityKind, MentionRecord, SourceContext};
pub use message::{Message, MessageRole};
pub use relationship::{RelationshipCandidate, RelationshipRecord};
