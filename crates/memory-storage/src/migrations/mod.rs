//! Migration runner — version tracking, forward-only, transactional per migration.

mod v001_initial_schema;
mod v002_embeddings;
mod v003_provenance;
mod v004_orthogonal_tables;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use memory_core::errors::MemoryResult;

use crate::to_storage_err;

/// Total number of migrations currently defined.
pub const LATEST_VERSION: u32 = 4;

/// All migrations in order. Index 0 = v001, etc.
type MigrationFn = fn(&Connection) -> MemoryResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 4] = [
    (1, "initial_schema", v001_initial_schema::migrate),
    (2, "embeddings", v002_embeddings::migrate),
    (3, "provenance", v003_provenance::migrate),
    (4, "orthogonal_tables", v004_orthogonal_tables::migrate),
];

/// Get the current schema version from the database.
/// Returns 0 if the schema_version table doesn't exist yet.
pub fn current_version(conn: &Connection) -> MemoryResult<u32> {
    // Check if schema_version table exists.
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(version)
}

/// Run all pending migrations. Forward-only, each wrapped in a transaction.
/// Replay is idempotent: a migration whose version is already recorded in
/// `schema_version` is skipped.
pub fn run_migrations(conn: &Connection) -> MemoryResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    let mut applied = 0;

    if current >= LATEST_VERSION {
        debug!("database schema is up to date (v{current})");
        return Ok(0);
    }

    info!("running migrations: v{} → v{}", current, LATEST_VERSION);

    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }

        debug!("applying migration v{version:03}: {name}");

        // Each migration runs in its own transaction.
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| to_storage_err(format!("begin transaction for v{version:03}: {e}")))?;

        match migrate_fn(conn) {
            Ok(()) => {
                conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
                    .map_err(|e| to_storage_err(format!("record version v{version:03}: {e}")))?;

                conn.execute_batch("COMMIT")
                    .map_err(|e| to_storage_err(format!("commit v{version:03}: {e}")))?;

                info!("applied migration v{version:03}: {name}");
                applied += 1;
            }
            Err(e) => {
                warn!("migration v{version:03} failed: {e}, rolling back");
                let _ = conn.execute_batch("ROLLBACK");
                return Err(to_storage_err(format!("migration v{version:03} ({name}) failed: {e}")));
            }
        }
    }

    info!("applied {applied} migration(s), now at v{LATEST_VERSION}");
    Ok(applied)
}
