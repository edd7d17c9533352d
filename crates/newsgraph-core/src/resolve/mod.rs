//! Entity resolution: normalization, matching, consolidation, and
//! relationship unification.

mod consolidate;
mod matcher;
pub mod normalize;
pub mod similarity;
mod unify;

pub use consolidate::Consolidator;
pub use matcher::{
    EmbeddingSimilarity, EntityMatcher, MatchOutcome, MatchStrategy, NameSimilarity, StrategyKind,
};
pub use unify::RelationshipUnifier;
