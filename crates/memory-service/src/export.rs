use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memory_core::errors::{MemoryError, MemoryResult};
use memory_core::models::{Confidence, Importance, MemoryLayer, MemoryRecord, MemoryType, Provenance, SourceType};

const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProvenance {
    /// Kept as the bare wire string, not the `SourceType` enum, so an
    /// unrecognized value can default to `explicit` in `exported_to_record`
    /// instead of failing JSON deserialization before that defaulting logic
    /// ever runs.
    pub source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedRecord {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub memory_type: String,
    pub layer: String,
    pub importance: f64,
    pub confidence: f64,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub provenance: ExportedProvenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub memories: Vec<ExportedRecord>,
}

impl From<&MemoryRecord> for ExportedRecord {
    fn from(record: &MemoryRecord) -> Self {
        Self {
            id: record.id.clone(),
            content: record.content.clone(),
            memory_type: record.memory_type.as_str().to_string(),
            layer: record.layer.as_str().to_string(),
            importance: record.importance.get(),
            confidence: record.confidence.get(),
            tags: record.tags.clone(),
            entities: record.entities.clone(),
            provenance: ExportedProvenance {
                source_type: record.provenance.source_type.as_str().to_string(),
                conversation_id: record.provenance.conversation_id.clone(),
            },
            supersedes: record.supersedes.clone(),
            superseded_by: record.superseded_by.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            accessed_at: record.accessed_at,
        }
    }
}

/// Builds the `{version, exportedAt, memories}` export document.
pub fn export_records(records: &[MemoryRecord], exported_at: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        version: EXPORT_FORMAT_VERSION.to_string(),
        exported_at,
        memories: records.iter().map(ExportedRecord::from).collect(),
    }
}

impl ExportDocument {
    pub fn to_json(&self) -> MemoryResult<String> {
        serde_json::to_string_pretty(self).map_err(MemoryError::Serialization)
    }

    pub fn from_json(input: &str) -> MemoryResult<Self> {
        serde_json::from_str(input).map_err(MemoryError::Serialization)
    }
}

/// An unknown `layer`/`sourceType` on import defaults to `stm`/`explicit`
/// rather than failing the import.
pub fn exported_to_record(exported: &ExportedRecord) -> MemoryRecord {
    let memory_type = MemoryType::parse(&exported.memory_type).unwrap_or(MemoryType::Fact);
    let layer = MemoryLayer::parse(&exported.layer).unwrap_or(MemoryLayer::Stm);
    let source_type = SourceType::parse(&exported.provenance.source_type).unwrap_or(SourceType::Explicit);

    MemoryRecord {
        id: exported.id.clone(),
        content: exported.content.clone(),
        memory_type,
        layer,
        importance: Importance::new(exported.importance),
        confidence: Confidence::new(exported.confidence),
        tags: exported.tags.clone(),
        entities: exported.entities.clone(),
        provenance: Provenance {
            source_type,
            conversation_id: exported.provenance.conversation_id.clone(),
        },
        supersedes: exported.supersedes.clone(),
        superseded_by: exported.superseded_by.clone(),
        embedding: None,
        created_at: exported.created_at,
        updated_at: exported.updated_at,
        accessed_at: exported.accessed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::models::{Confidence as Conf, Importance as Imp};

    fn sample() -> MemoryRecord {
        let now = Utc::now();
        MemoryRecord {
            id: "m1".to_string(),
            content: "the sky is blue".to_string(),
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Ltm,
            importance: Imp::new(0.8),
            confidence: Conf::new(0.9),
            tags: vec!["color".to_string()],
            entities: vec![],
            provenance: Provenance { source_type: SourceType::Explicit, conversation_id: None },
            supersedes: None,
            superseded_by: None,
            embedding: None,
            created_at: now,
            updated_at: now,
            accessed_at: now,
        }
    }

    #[test]
    fn export_then_import_round_trips_observable_fields() {
        let doc = export_records(&[sample()], Utc::now());
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.memories.len(), 1);

        let restored = exported_to_record(&doc.memories[0]);
        assert_eq!(restored.id, "m1");
        assert_eq!(restored.content, "the sky is blue");
        assert_eq!(restored.layer, MemoryLayer::Ltm);
    }

    #[test]
    fn unknown_layer_and_source_type_default_on_import() {
        let mut exported = ExportedRecord::from(&sample());
        exported.layer = "bogus".to_string();
        exported.provenance.source_type = "bogus".to_string();
        let restored = exported_to_record(&exported);
        assert_eq!(restored.layer, MemoryLayer::Stm);
        assert_eq!(restored.provenance.source_type, SourceType::Explicit);
    }

    #[test]
    fn unknown_source_type_in_raw_json_does_not_fail_deserialization() {
        let json = r#"{
            "version": "1.0",
            "exportedAt": "2026-01-01T00:00:00Z",
            "memories": [{
                "id": "m1",
                "content": "x",
                "type": "fact",
                "layer": "stm",
                "importance": 0.5,
                "confidence": 1.0,
                "tags": [],
                "entities": [],
                "provenance": { "sourceType": "some_future_source" },
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z",
                "accessedAt": "2026-01-01T00:00:00Z"
            }]
        }"#;
        let doc = ExportDocument::from_json(json).unwrap();
        let restored = exported_to_record(&doc.memories[0]);
        assert_eq!(restored.provenance.source_type, SourceType::Explicit);
    }

    #[test]
    fn json_round_trips_through_to_json_and_from_json() {
        let doc = export_records(&[sample()], Utc::now());
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"version\": \"1.0\""));

        let parsed = ExportDocument::from_json(&json).unwrap();
        assert_eq!(parsed.memories.len(), 1);
        assert_eq!(parsed.memories[0].id, "m1");
    }
}
