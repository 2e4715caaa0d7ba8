//! Insert, update, get, delete, bulk ops for `memories`.

use rusqlite::{params, Connection, Error as SqliteError, OptionalExtension};

use memory_core::errors::MemoryResult;
use memory_core::models::{
    Confidence, Importance, MemoryLayer, MemoryRecord, MemoryType, Provenance, SourceType,
};

use crate::to_storage_err;

/// Insert a single memory row. Does not touch `memory_provenance` or
/// `memory_embeddings`; callers append those in the same transaction.
pub fn insert_memory(conn: &Connection, memory: &MemoryRecord) -> MemoryResult<()> {
    let tags_json = serde_json::to_string(&memory.tags).map_err(to_json_err)?;
    let entities_json = serde_json::to_string(&memory.entities).map_err(to_json_err)?;

    conn.execute(
        "INSERT INTO memories (
            id, content, type, layer, importance, confidence, tags, entities,
            source_type, source_conversation_id, source_message_id,
            supersedes_id, superseded_by_id, access_count, reinforcement_count,
            last_accessed_at, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, 0, ?14, ?15, ?16
        )",
        params![
            memory.id,
            memory.content,
            type_to_str(memory.memory_type),
            layer_to_str(memory.layer),
            memory.importance.get(),
            memory.confidence.get(),
            tags_json,
            entities_json,
            source_type_to_str(memory.provenance.source_type),
            memory.provenance.conversation_id,
            Option::<String>::None,
            memory.supersedes,
            memory.superseded_by,
            memory.accessed_at.to_rfc3339(),
            memory.created_at.to_rfc3339(),
            memory.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}

pub(crate) const SELECT_COLUMNS: &str = "id, content, type, layer, importance, confidence, tags, entities,
        source_type, source_conversation_id, source_message_id,
        supersedes_id, superseded_by_id, access_count, reinforcement_count,
        last_accessed_at, created_at, updated_at";

/// Get a single memory by id.
pub fn get_memory(conn: &Connection, id: &str) -> MemoryResult<Option<MemoryRecord>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {SELECT_COLUMNS} FROM memories WHERE id = ?1"))
        .map_err(|e| to_storage_err(e.to_string()))?;

    stmt.query_row(params![id], row_to_memory)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Replace every mutable column of an existing row. The caller is
/// responsible for bumping `updated_at`/`accessed_at` before calling.
pub fn update_memory(conn: &Connection, memory: &MemoryRecord) -> MemoryResult<()> {
    let tags_json = serde_json::to_string(&memory.tags).map_err(to_json_err)?;
    let entities_json = serde_json::to_string(&memory.entities).map_err(to_json_err)?;

    let changed = conn
        .execute(
            "UPDATE memories SET
                content = ?2, type = ?3, layer = ?4, importance = ?5, confidence = ?6,
                tags = ?7, entities = ?8, source_type = ?9, source_conversation_id = ?10,
                supersedes_id = ?11, superseded_by_id = ?12,
                last_accessed_at = ?13, updated_at = ?14
             WHERE id = ?1",
            params![
                memory.id,
                memory.content,
                type_to_str(memory.memory_type),
                layer_to_str(memory.layer),
                memory.importance.get(),
                memory.confidence.get(),
                tags_json,
                entities_json,
                source_type_to_str(memory.provenance.source_type),
                memory.provenance.conversation_id,
                memory.supersedes,
                memory.superseded_by,
                memory.accessed_at.to_rfc3339(),
                memory.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if changed == 0 {
        return Err(memory_core::errors::MemoryError::NotFound { id: memory.id.clone() });
    }

    Ok(())
}

/// Hard delete. Cascades to `memory_embeddings` via its foreign key.
/// Returns whether a row actually existed.
pub fn delete_memory(conn: &Connection, id: &str) -> MemoryResult<bool> {
    let changed = conn
        .execute("DELETE FROM memories WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed > 0)
}

/// Insert many memories in the caller's transaction.
pub fn bulk_insert(conn: &Connection, memories: &[MemoryRecord]) -> MemoryResult<()> {
    for memory in memories {
        insert_memory(conn, memory)?;
    }
    Ok(())
}

/// Fetch many memories by id, skipping any that don't exist.
pub fn bulk_get(conn: &Connection, ids: &[String]) -> MemoryResult<Vec<MemoryRecord>> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(memory) = get_memory(conn, id)? {
            out.push(memory);
        }
    }
    Ok(out)
}

/// List with optional type/layer filters, `limit`/`offset` pagination.
pub fn list_memories(
    conn: &Connection,
    memory_type: Option<MemoryType>,
    layer: Option<MemoryLayer>,
    limit: i64,
    offset: i64,
) -> MemoryResult<Vec<MemoryRecord>> {
    let type_filter = memory_type.map(type_to_str);
    let layer_filter = layer.map(layer_to_str);

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM memories
             WHERE (?1 IS NULL OR type = ?1) AND (?2 IS NULL OR layer = ?2)
             ORDER BY created_at DESC
             LIMIT ?3 OFFSET ?4"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![type_filter, layer_filter, limit, offset], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

/// Count memories matching the same filters as `list_memories`.
pub fn count_memories(
    conn: &Connection,
    memory_type: Option<MemoryType>,
    layer: Option<MemoryLayer>,
) -> MemoryResult<u64> {
    let type_filter = memory_type.map(type_to_str);
    let layer_filter = layer.map(layer_to_str);

    conn.query_row(
        "SELECT COUNT(*) FROM memories WHERE (?1 IS NULL OR type = ?1) AND (?2 IS NULL OR layer = ?2)",
        params![type_filter, layer_filter],
        |row| row.get::<_, i64>(0),
    )
    .map(|c| c as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}

pub(crate) fn row_to_memory(row: &rusqlite::Row<'_>) -> Result<MemoryRecord, SqliteError> {
    let tags_json: String = row.get(6)?;
    let entities_json: String = row.get(7)?;
    let source_type_str: String = row.get(8)?;
    let type_str: String = row.get(2)?;
    let layer_str: String = row.get(3)?;
    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(17)?;
    let accessed_at: String = row.get(15)?;

    Ok(MemoryRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        memory_type: str_to_type(&type_str)?,
        layer: str_to_layer(&layer_str)?,
        importance: Importance::new(row.get(4)?),
        confidence: Confidence::new(row.get(5)?),
        tags: serde_json::from_str(&tags_json).map_err(sqlite_decode_err)?,
        entities: serde_json::from_str(&entities_json).map_err(sqlite_decode_err)?,
        provenance: Provenance {
            source_type: str_to_source_type(&source_type_str)?,
            conversation_id: row.get(9)?,
        },
        supersedes: row.get(11)?,
        superseded_by: row.get(12)?,
        embedding: None,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        accessed_at: parse_timestamp(&accessed_at)?,
    })
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, SqliteError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| sqlite_decode_err(format!("bad timestamp {s:?}: {e}")))
}

fn sqlite_decode_err(e: impl std::fmt::Display) -> SqliteError {
    SqliteError::InvalidColumnType(0, e.to_string(), rusqlite::types::Type::Text)
}

fn to_json_err(e: serde_json::Error) -> memory_core::errors::MemoryError {
    memory_core::errors::MemoryError::Serialization(e)
}

fn type_to_str(t: MemoryType) -> &'static str {
    t.as_str()
}

fn str_to_type(s: &str) -> Result<MemoryType, SqliteError> {
    MemoryType::parse(s).map_err(|e| sqlite_decode_err(e.to_string()))
}

fn layer_to_str(l: MemoryLayer) -> &'static str {
    l.as_str()
}

fn str_to_layer(s: &str) -> Result<MemoryLayer, SqliteError> {
    MemoryLayer::parse(s).map_err(|e| sqlite_decode_err(e.to_string()))
}

fn source_type_to_str(s: SourceType) -> &'static str {
    s.as_str()
}

fn str_to_source_type(s: &str) -> Result<SourceType, SqliteError> {
    SourceType::parse(s).map_err(|e| sqlite_decode_err(e.to_string()))
}
