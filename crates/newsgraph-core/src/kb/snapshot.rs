//! KB snapshot load/save hooks.
//!
//! The snapshot is the external JSON shape the rest of the pipeline
//! persists between runs:
//!
//! ```json
//! {
//!   "<uuid>": {
//!     "canonical_name": "jacob frey",
//!     "aliases": ["jacob frey", "mayor frey"],
//!     "embeddings": [[0.1, 0.2], [0.3, 0.4]]
//!   }
//! }
//! ```
//!
//! Deserializing a snapshot and serializing it back preserves this
//! structure; centroids are derived state and are recomputed on load.
//! Entries resume in lexicographic id order, which keeps first-match
//! tie-breaking deterministic across runs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, KgError, KgResult};
use crate::kb::{EntityId, KbEntry, KbStore};

/// One entry in the external snapshot shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Normalized canonical name.
    pub canonical_name: String,
    /// Known normalized surface forms.
    pub aliases: Vec<String>,
    /// One embedding per consolidated mention.
    pub embeddings: Vec<Vec<f32>>,
}

/// The full snapshot: id string to entry.
pub type KbSnapshot = BTreeMap<String, SnapshotEntry>;

impl KbStore {
    /// Serialize the store into the external snapshot shape.
    pub fn to_snapshot(&self) -> KbSnapshot {
        self.iter()
            .map(|entry| {
                (
                    entry.id.to_string(),
                    SnapshotEntry {
                        canonical_name: entry.canonical_name.clone(),
                        aliases: entry.aliases.clone(),
                        embeddings: entry.embeddings.clone(),
                    },
                )
            })
            .collect()
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Fails only on malformed ids; entry contents are taken as-is.
    pub fn from_snapshot(snapshot: KbSnapshot) -> KgResult<Self> {
        let mut kb = KbStore::new();
        for (key, entry) in snapshot {
            let id = EntityId::parse(&key).map_err(|e| KgError::Snapshot {
                message: format!("invalid entry id '{}': {}", key, e),
                code: ErrorCode::SnapInvalidShape,
                source: Some(Box::new(e)),
            })?;
            kb.insert_entry(KbEntry::from_parts(
                id,
                entry.canonical_name,
                entry.aliases,
                entry.embeddings,
            ));
        }
        Ok(kb)
    }

    /// Load a store from a snapshot file.
    pub fn load_json(path: impl AsRef<Path>) -> KgResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let snapshot: KbSnapshot = serde_json::from_str(&content).map_err(|e| KgError::Snapshot {
            message: format!("failed to parse snapshot {}: {}", path.as_ref().display(), e),
            code: ErrorCode::SnapLoadFailed,
            source: Some(Box::new(e)),
        })?;
        Self::from_snapshot(snapshot)
    }

    /// Save the store to a snapshot file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> KgResult<()> {
        let json = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path.as_ref(), json).map_err(|e| KgError::Snapshot {
            message: format!("failed to write snapshot {}: {}", path.as_ref().display(), e),
            code: ErrorCode::SnapSaveFailed,
            source: Some(Box::new(e)),
        })
    }
}
