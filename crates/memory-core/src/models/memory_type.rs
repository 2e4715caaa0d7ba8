use serde::{Deserialize, Serialize};

use crate::errors::MemoryError;

/// The kind of fact a memory captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Fact,
    Preference,
    Decision,
    Episode,
    Skill,
    Entity,
    DocumentChunk,
}

impl MemoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryType::Fact => "fact",
            MemoryType::Preference => "preference",
            MemoryType::Decision => "decision",
            MemoryType::Episode => "episode",
            MemoryType::Skill => "skill",
            MemoryType::Entity => "entity",
            MemoryType::DocumentChunk => "document_chunk",
        }
    }

    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        Ok(match s {
            "fact" => MemoryType::Fact,
            "preference" => MemoryType::Preference,
            "decision" => MemoryType::Decision,
            "episode" => MemoryType::Episode,
            "skill" => MemoryType::Skill,
            "entity" => MemoryType::Entity,
            "document_chunk" => MemoryType::DocumentChunk,
            other => return Err(MemoryError::Validation(format!("unknown type {other:?}"))),
        })
    }
}

/// Memory tier at the type level. `Working` exists for in-process staging
/// only; it is never persisted to the store (see `MemoryLayer::is_persisted`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryLayer {
    Working,
    Stm,
    Ltm,
}

impl MemoryLayer {
    pub fn is_persisted(self) -> bool {
        !matches!(self, MemoryLayer::Working)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryLayer::Working => "working",
            MemoryLayer::Stm => "stm",
            MemoryLayer::Ltm => "ltm",
        }
    }

    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        Ok(match s {
            "working" => MemoryLayer::Working,
            "stm" => MemoryLayer::Stm,
            "ltm" => MemoryLayer::Ltm,
            other => return Err(MemoryError::Validation(format!("unknown layer {other:?}"))),
        })
    }
}

/// Where a memory originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Explicit,
    Implicit,
    Compaction,
    Consolidation,
    Document,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Explicit => "explicit",
            SourceType::Implicit => "implicit",
            SourceType::Compaction => "compaction",
            SourceType::Consolidation => "consolidation",
            SourceType::Document => "document",
        }
    }

    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        Ok(match s {
            "explicit" => SourceType::Explicit,
            "implicit" => SourceType::Implicit,
            "compaction" => SourceType::Compaction,
            "consolidation" => SourceType::Consolidation,
            "document" => SourceType::Document,
            other => return Err(MemoryError::Validation(format!("unknown source type {other:?}"))),
        })
    }
}
