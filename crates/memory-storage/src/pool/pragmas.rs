use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// WAL journaling, foreign keys on, and a configurable busy timeout.
pub fn apply(conn: &Connection, busy_timeout_ms: u64) -> MemoryResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Confirms the connection is actually in WAL mode — used by tests and by
/// the maintenance healthcheck.
pub fn verify_wal_mode(conn: &Connection) -> MemoryResult<bool> {
    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
