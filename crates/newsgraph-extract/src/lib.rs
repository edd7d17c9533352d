//! LLM relationship extraction and the per-block article pipeline.
//!
//! This crate is the boundary between the consolidation engine in
//! `newsgraph-core` and external providers. [`RelationshipExtractor`]
//! prompts an LLM for relationship triples between a block's
//! consolidated entities; [`BlockPipeline`] runs the full
//! embed / consolidate / extract / unify sequence for article blocks
//! against a shared knowledge base.

pub mod extractor;
pub mod pipeline;

pub use extractor::{RelationshipExtractor, DEFAULT_RELATIONSHIP_LABELS};
pub use pipeline::{BlockOutcome, BlockPipeline, MentionSpan, TextBlock};
