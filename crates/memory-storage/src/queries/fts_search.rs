//! BM25 full-text query against `memory_fts`, joined back to `memories`.

use rusqlite::{params, Connection};

use memory_core::errors::MemoryResult;
use memory_core::traits::ScoredMemory;

use crate::to_storage_err;

const JOIN_COLUMNS: &str = "m.id, m.content, m.type, m.layer, m.importance, m.confidence, m.tags, m.entities,
        m.source_type, m.source_conversation_id, m.source_message_id,
        m.supersedes_id, m.superseded_by_id, m.access_count, m.reinforcement_count,
        m.last_accessed_at, m.created_at, m.updated_at";

/// Raw (pre-normalization) BM25 hit: more negative `raw_score` means more
/// relevant. Normalization into `[0, 1]` happens in `memory-retrieval`.
pub fn search_fts5(conn: &Connection, sanitized_query: &str, limit: usize) -> MemoryResult<Vec<ScoredMemory>> {
    if sanitized_query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {JOIN_COLUMNS}, bm25(memory_fts) as raw_score
         FROM memory_fts
         JOIN memories m ON m.rowid = memory_fts.rowid
         WHERE memory_fts MATCH ?1
         ORDER BY raw_score ASC
         LIMIT ?2"
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![sanitized_query, limit as i64], |row| {
            let memory = crate::queries::memory_crud::row_to_memory(row)?;
            let raw_score: f64 = row.get(18)?;
            Ok(ScoredMemory { memory, score: raw_score })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}
