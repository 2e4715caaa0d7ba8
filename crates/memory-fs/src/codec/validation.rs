//! Frontmatter schema (C2): applies defaults, then validates field types,
//! ranges, and enumerations. Failures are aggregated across every field
//! rather than stopping at the first one.

use chrono::{DateTime, Utc};

use memory_core::models::{Confidence, FileSource, Importance, MemoryFileRecord, MemoryLayer, MemoryType, SourceType};

use super::parser::{RawFrontmatter, RawValue};

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

fn err(field: &str, reason: impl Into<String>) -> ValidationError {
    ValidationError { field: field.to_string(), reason: reason.into() }
}

pub fn build_record(raw: RawFrontmatter, content: String) -> Result<MemoryFileRecord, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let id = require_scalar(&raw, "id", &mut errors);

    let version = match raw.get("version") {
        None => 1,
        Some(RawValue::Scalar(s)) => s.parse::<u32>().unwrap_or_else(|_| {
            errors.push(err("version", format!("expected an integer, got {s:?}")));
            1
        }),
        Some(other) => {
            errors.push(err("version", format!("expected a scalar, got {other:?}")));
            1
        }
    };

    let memory_type = require_scalar(&raw, "type", &mut errors)
        .and_then(|s| MemoryType::parse(&s).map_err(|e| errors.push(err("type", e.to_string()))).ok());

    let layer = require_scalar(&raw, "layer", &mut errors)
        .and_then(|s| MemoryLayer::parse(&s).map_err(|e| errors.push(err("layer", e.to_string()))).ok());

    let importance = require_unit_interval(&raw, "importance", &mut errors);

    let confidence = match raw.get("confidence") {
        None => Some(1.0),
        Some(_) => require_unit_interval(&raw, "confidence", &mut errors),
    };

    let tags = require_list(&raw, "tags", &mut errors).unwrap_or_default();
    let entities = require_list(&raw, "entities", &mut errors).unwrap_or_default();

    let source = build_source(&raw, &mut errors);

    let supersedes = optional_scalar(&raw, "supersedes");
    let superseded_by = optional_scalar(&raw, "supersededBy");

    let created_at = require_timestamp(&raw, "createdAt", &mut errors);
    let updated_at = require_timestamp(&raw, "updatedAt", &mut errors);
    let accessed_at = require_timestamp(&raw, "accessedAt", &mut errors);

    if content.trim().is_empty() {
        errors.push(err("content", "must be non-empty after trimming"));
    }
    if content.len() > memory_core::models::MAX_CONTENT_LENGTH {
        errors.push(err("content", format!("exceeds {} bytes", memory_core::models::MAX_CONTENT_LENGTH)));
    }

    if let (Some(created), Some(updated)) = (created_at, updated_at) {
        if created > updated {
            errors.push(err("createdAt", "must be <= updatedAt"));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(MemoryFileRecord {
        id: id.unwrap(),
        version,
        memory_type: memory_type.unwrap(),
        layer: layer.unwrap(),
        importance: Importance::new(importance.unwrap()),
        confidence: Confidence::new(confidence.unwrap()),
        tags,
        entities,
        source: source.unwrap(),
        supersedes,
        superseded_by,
        created_at: created_at.unwrap(),
        updated_at: updated_at.unwrap(),
        accessed_at: accessed_at.unwrap(),
        content,
    })
}

fn require_scalar(raw: &RawFrontmatter, field: &str, errors: &mut Vec<ValidationError>) -> Option<String> {
    match raw.get(field) {
        Some(RawValue::Scalar(s)) => Some(s.clone()),
        Some(RawValue::Null) | None => {
            errors.push(err(field, "is required"));
            None
        }
        Some(other) => {
            errors.push(err(field, format!("expected a scalar, got {other:?}")));
            None
        }
    }
}

fn optional_scalar(raw: &RawFrontmatter, field: &str) -> Option<String> {
    match raw.get(field) {
        Some(RawValue::Scalar(s)) => Some(s.clone()),
        _ => None,
    }
}

fn require_unit_interval(raw: &RawFrontmatter, field: &str, errors: &mut Vec<ValidationError>) -> Option<f64> {
    let s = require_scalar(raw, field, errors)?;
    match s.parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Some(v),
        Ok(v) => {
            errors.push(err(field, format!("must be in [0, 1], got {v}")));
            None
        }
        Err(_) => {
            errors.push(err(field, format!("expected a number, got {s:?}")));
            None
        }
    }
}

fn require_list(raw: &RawFrontmatter, field: &str, errors: &mut Vec<ValidationError>) -> Option<Vec<String>> {
    match raw.get(field) {
        None => Some(Vec::new()),
        Some(RawValue::List(items)) => {
            if items.iter().any(|i| i.trim().is_empty()) {
                errors.push(err(field, "entries must be non-empty strings"));
                None
            } else {
                Some(items.clone())
            }
        }
        Some(other) => {
            errors.push(err(field, format!("expected a list, got {other:?}")));
            None
        }
    }
}

fn require_timestamp(raw: &RawFrontmatter, field: &str, errors: &mut Vec<ValidationError>) -> Option<DateTime<Utc>> {
    let s = require_scalar(raw, field, errors)?;
    match DateTime::parse_from_rfc3339(&s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            errors.push(err(field, format!("expected an ISO-8601 timestamp: {e}")));
            None
        }
    }
}

fn build_source(raw: &RawFrontmatter, errors: &mut Vec<ValidationError>) -> Option<FileSource> {
    match raw.get("source") {
        Some(RawValue::Nested(entries)) => {
            let source_type_str = entries.iter().find(|(k, _)| k == "type").map(|(_, v)| v.clone());
            let source_type = match source_type_str {
                Some(s) => match SourceType::parse(&s) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        errors.push(err("source.type", e.to_string()));
                        None
                    }
                },
                None => {
                    errors.push(err("source.type", "is required"));
                    None
                }
            };
            let conversation_id = entries.iter().find(|(k, _)| k == "conversationId").map(|(_, v)| v.clone());
            let message_id = entries.iter().find(|(k, _)| k == "messageId").map(|(_, v)| v.clone());
            source_type.map(|source_type| FileSource { source_type, conversation_id, message_id })
        }
        _ => {
            errors.push(err("source", "is required"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parser::parse_raw;

    #[test]
    fn aggregates_every_missing_field() {
        let (raw, content) = parse_raw("---\ninvalid: yaml: content\n---\n\nbody\n").unwrap();
        let result = build_record(raw, content);
        let errors = result.unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"id"));
        assert!(fields.contains(&"type"));
        assert!(fields.contains(&"layer"));
        assert!(fields.contains(&"source"));
    }

    #[test]
    fn rejects_out_of_range_importance() {
        let input = "---\nid: x\ntype: fact\nlayer: stm\nimportance: 1.5\nsource:\n  type: explicit\ncreatedAt: 2026-01-01T00:00:00Z\nupdatedAt: 2026-01-01T00:00:00Z\naccessedAt: 2026-01-01T00:00:00Z\n---\n\nbody\n";
        let (raw, content) = parse_raw(input).unwrap();
        let errors = build_record(raw, content).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "importance"));
    }
}
