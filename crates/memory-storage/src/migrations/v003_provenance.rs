use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Creates the append-only `memory_provenance` audit trail and the
/// `memory_fts` external-content FTS5 index over `memories.content`.
///
/// `memory_provenance.memory_id` deliberately carries no foreign key.
/// Provenance is an audit log, not a dependent child of `memories`: a
/// `deleted` event is recorded for an id that is about to stop existing,
/// and earlier `created`/`updated` rows for that id are meant to outlive
/// the memory they describe rather than cascade away with it. Enforcing
/// a FK here (with or without `ON DELETE CASCADE`) would either block
/// every delete outright or silently erase the history of the thing just
/// deleted, both of which defeat the point of an audit trail.
///
/// The sync triggers are recreated unconditionally on every engine open
/// (see `crate::pool::ensure_fts_triggers`) rather than gated behind the
/// migration version, so upgrading SQLite's FTS5 build never leaves a
/// stale trigger definition in place.
pub fn migrate(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(
        "CREATE TABLE memory_provenance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            memory_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            source_details TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_memory_provenance_memory_id ON memory_provenance(memory_id);

        CREATE VIRTUAL TABLE memory_fts USING fts5(
            content,
            content='memories',
            content_rowid='rowid'
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    crate::pool::ensure_fts_triggers(conn)?;

    Ok(())
}
