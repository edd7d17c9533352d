//! Configuration system for newsgraph.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolve::StrategyKind;
use crate::traits::{EmbedderConfig, LlmConfig};

/// Settings for the consolidation controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Minimum fuzzy score for merging a mention into an existing entry.
    /// Below it a new canonical entity is minted.
    pub similarity_threshold: f64,
    /// Which fuzzy scoring strategy the matcher uses.
    pub strategy: StrategyKind,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            strategy: StrategyKind::Name,
        }
    }
}

impl ConsolidationConfig {
    /// Create a config with a custom threshold.
    pub fn with_threshold(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
            ..Default::default()
        }
    }
}

/// Settings for relationship unification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnifyConfig {
    /// Optional confidence floor. When set, endpoints scoring below it
    /// stay unresolved instead of taking the best available guess.
    /// `None` keeps the best-effort behavior the pipeline was built
    /// around: a relationship is useless with dangling endpoints, so the
    /// top-scoring in-block candidate wins.
    pub min_confidence: Option<f64>,
}

/// Main newsgraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KgConfig {
    /// Consolidation settings.
    pub consolidation: ConsolidationConfig,
    /// Relationship unification settings.
    pub unify: UnifyConfig,
    /// LLM collaborator configuration.
    pub llm: LlmConfig,
    /// Embedder collaborator configuration.
    pub embedder: EmbedderConfig,
    /// Where to load/save the KB snapshot, if persistence is wanted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl KgConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::KgResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| crate::error::KgError::Configuration(e.to_string())),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| crate::error::KgError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| crate::error::KgError::Configuration(e.to_string())),
            _ => Err(crate::error::KgError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("NEWSGRAPH_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.llm.api_key = Some(api_key.clone());
            config.embedder.api_key = Some(api_key);
        }
        if let Ok(threshold) = std::env::var("NEWSGRAPH_SIMILARITY_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                config.consolidation.similarity_threshold = threshold;
            }
        }
        if let Ok(path) = std::env::var("NEWSGRAPH_SNAPSHOT_PATH") {
            config.snapshot_path = Some(PathBuf::from(path));
        }

        config
    }
}
