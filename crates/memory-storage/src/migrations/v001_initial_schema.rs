use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Creates the `memories` table — one row per `MemoryRecord`. `tags` and
/// `entities` are stored as JSON arrays; order is preserved on read but
/// equivalence checks elsewhere are order-insensitive.
pub fn migrate(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(
        "CREATE TABLE memories (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            type TEXT NOT NULL,
            layer TEXT NOT NULL DEFAULT 'stm',
            importance REAL NOT NULL DEFAULT 0.5,
            confidence REAL NOT NULL DEFAULT 1.0,
            tags TEXT NOT NULL DEFAULT '[]',
            entities TEXT NOT NULL DEFAULT '[]',
            source_type TEXT NOT NULL,
            source_conversation_id TEXT,
            source_message_id TEXT,
            supersedes_id TEXT,
            superseded_by_id TEXT,
            access_count INTEGER NOT NULL DEFAULT 0,
            reinforcement_count INTEGER NOT NULL DEFAULT 0,
            last_accessed_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_memories_type ON memories(type);
        CREATE INDEX idx_memories_layer ON memories(layer);
        CREATE INDEX idx_memories_source_conversation ON memories(source_conversation_id);",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
