use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bounded::{Confidence, Importance};
use super::memory_type::{MemoryLayer, MemoryType, SourceType};

/// `source` sub-object as it appears on disk — distinct from `Provenance`
/// because the file format additionally carries `messageId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// The on-disk form of a memory. Carries its own `version` so the file
/// format can evolve independently of any richer in-process representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFileRecord {
    pub id: String,
    pub version: u32,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub layer: MemoryLayer,
    pub importance: Importance,
    pub confidence: Confidence,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub source: FileSource,
    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    /// Body text, stored separately from the frontmatter block.
    #[serde(skip)]
    pub content: String,
}

/// Current on-disk schema version. Bumping this is a breaking change to
/// the frontmatter grammar (see the codec's golden-fixture round-trip test).
pub const FILE_FORMAT_VERSION: u32 = 1;
