//! Core traits for external collaborators.

mod embedder;
mod llm;

pub use embedder::*;
pub use llm::*;
