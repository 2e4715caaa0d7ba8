use rusqlite::Connection;

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Creates `memory_embeddings`. A memory may hold one embedding per
/// `(provider, model)` pair; vectors are packed little-endian f32 bytes.
pub fn migrate(conn: &Connection) -> MemoryResult<()> {
    conn.execute_batch(
        "CREATE TABLE memory_embeddings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            dimension INTEGER NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            vector BLOB NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(memory_id, provider, model)
        );

        CREATE INDEX idx_memory_embeddings_memory_id ON memory_embeddings(memory_id);
        CREATE INDEX idx_memory_embeddings_provider_model ON memory_embeddings(provider, model);",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
