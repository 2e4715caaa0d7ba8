//! Housekeeping: integrity check, vacuum, WAL checkpoint, FTS5 rebuild.

use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

pub fn integrity_check(conn: &Connection) -> MemoryResult<bool> {
    let result: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(result == "ok")
}

pub fn vacuum(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch("VACUUM").map_err(|e| to_storage_err(e.to_string()))
}

pub fn wal_checkpoint(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Rebuilds `memory_fts` from scratch against the current `memories` table.
/// Used after bulk imports or to recover from a corrupted index.
pub fn rebuild_fts5_index(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch("INSERT INTO memory_fts(memory_fts) VALUES ('rebuild')")
        .map_err(|e| to_storage_err(e.to_string()))
}
