use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Creates `consolidation_runs`, `document_sources`, and `document_chunks`.
/// These are orthogonal to the core dual-write/search path; they exist so
/// a consolidation job or a document-ingestion pipeline can coexist in the
/// same database without a later migration colliding on table names.
pub fn migrate(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(
        "CREATE TABLE consolidation_runs (
            id TEXT PRIMARY KEY,
            started_at TEXT NOT NULL,
            completed_at TEXT,
            input_memory_ids TEXT NOT NULL DEFAULT '[]',
            output_memory_id TEXT
        );

        CREATE TABLE document_sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            ingested_at TEXT NOT NULL
        );

        CREATE TABLE document_chunks (
            id TEXT PRIMARY KEY,
            document_source_id TEXT NOT NULL REFERENCES document_sources(id),
            memory_id TEXT REFERENCES memories(id),
            chunk_index INTEGER NOT NULL,
            content TEXT NOT NULL
        );

        CREATE INDEX idx_document_chunks_source ON document_chunks(document_source_id);",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
