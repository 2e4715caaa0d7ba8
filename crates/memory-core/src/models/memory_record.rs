use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bounded::{Confidence, Importance};
use super::memory_type::{MemoryLayer, MemoryType, SourceType};

/// Where a memory came from — the `provenance` field of `MemoryRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Embedding metadata attached to a record. The vector itself lives in
/// `memory_embeddings`, keyed by `(memory_id, provider, model)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMeta {
    pub provider: String,
    pub model: String,
    pub dimension: usize,
    pub version: u32,
}

/// The canonical in-memory form of a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub layer: MemoryLayer,
    pub importance: Importance,
    pub confidence: Confidence,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub provenance: Provenance,
    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
    pub embedding: Option<EmbeddingMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
}

/// Maximum content length in bytes, enforced by the Content write policy
/// and reused by the codec/frontmatter validator.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

impl MemoryRecord {
    /// Order-insensitive comparison of `tags`, used by the ingestor to
    /// decide whether a re-parsed file actually changed.
    pub fn tags_equivalent(a: &[String], b: &[String]) -> bool {
        set_equivalent(a, b)
    }

    /// Order-insensitive comparison of `entities`.
    pub fn entities_equivalent(a: &[String], b: &[String]) -> bool {
        set_equivalent(a, b)
    }
}

fn set_equivalent(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted = a.to_vec();
    let mut b_sorted = b.to_vec();
    a_sorted.sort();
    b_sorted.sort();
    a_sorted == b_sorted
}
