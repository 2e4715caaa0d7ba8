//! Append-only audit trail: one `memory_provenance` row per `(memory, event)`.

use rusqlite::{params, Connection};

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// A provenance row as read back from the database.
#[derive(Debug, Clone)]
pub struct ProvenanceRow {
    pub id: i64,
    pub memory_id: String,
    pub event_type: String,
    pub source_details: serde_json::Value,
    pub created_at: String,
}

/// Append a provenance entry. `event_type` is one of
/// `created|updated|deleted|consolidated`; `source_details` carries a
/// checksum, file name, or diff summary depending on the event.
pub fn insert_provenance(
    conn: &Connection,
    memory_id: &str,
    event_type: &str,
    source_details: &serde_json::Value,
) -> MemoryResult<i64> {
    conn.execute(
        "INSERT INTO memory_provenance (memory_id, event_type, source_details, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            memory_id,
            event_type,
            source_details.to_string(),
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

/// All provenance rows for a memory, oldest first.
pub fn get_provenance_for_memory(conn: &Connection, memory_id: &str) -> MemoryResult<Vec<ProvenanceRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, memory_id, event_type, source_details, created_at
             FROM memory_provenance WHERE memory_id = ?1
             ORDER BY id ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![memory_id], row_to_provenance)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_provenance(row: &rusqlite::Row<'_>) -> Result<ProvenanceRow, rusqlite::Error> {
    let details_str: String = row.get(3)?;
    Ok(ProvenanceRow {
        id: row.get(0)?,
        memory_id: row.get(1)?,
        event_type: row.get(2)?,
        source_details: serde_json::from_str(&details_str).unwrap_or(serde_json::Value::Null),
        created_at: row.get(4)?,
    })
}
