//! Integration test: all migrations run cleanly on a fresh database and
//! replaying them against an already-migrated one is a no-op.

use memory_storage::StorageEngine;

#[test]
fn all_migrations_run_on_fresh_db() {
    let engine = StorageEngine::open_in_memory().unwrap();

    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let version: u32 = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0)).unwrap();
            assert_eq!(version, memory_storage::migrations::LATEST_VERSION);
            Ok(())
        })
        .unwrap();
}

#[test]
fn migrations_are_idempotent_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.sqlite3");
    let db_path_str = db_path.to_str().unwrap();

    let engine1 = StorageEngine::open(db_path_str, 1_000).unwrap();
    drop(engine1);

    // Reopening the same file re-runs `run_migrations`; it must see every
    // migration already recorded in `schema_version` and apply nothing.
    let engine2 = StorageEngine::open(db_path_str, 1_000).unwrap();
    engine2
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let version: u32 = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0)).unwrap();
            assert_eq!(version, memory_storage::migrations::LATEST_VERSION);
            Ok(())
        })
        .unwrap();
}

#[test]
fn all_core_tables_exist() {
    let engine = StorageEngine::open_in_memory().unwrap();

    let expected_tables = [
        "schema_version",
        "memories",
        "memory_embeddings",
        "memory_provenance",
        "memory_fts",
        "consolidation_runs",
        "document_sources",
        "document_chunks",
    ];

    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            for table in expected_tables {
                let exists: bool = conn
                    .prepare("SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1")
                    .unwrap()
                    .exists([table])
                    .unwrap();
                assert!(exists, "expected table/view {table:?} to exist");
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn fts_triggers_stay_in_sync_with_memories() {
    use memory_storage::queries::memory_crud::insert_memory;
    use memory_core::models::{Confidence, Importance, MemoryLayer, MemoryRecord, MemoryType, Provenance, SourceType};

    let engine = StorageEngine::open_in_memory().unwrap();
    let now = chrono::Utc::now();
    let record = MemoryRecord {
        id: "m1".to_string(),
        content: "the quarterly report is due Friday".to_string(),
        memory_type: MemoryType::Fact,
        layer: MemoryLayer::Stm,
        importance: Importance::new(0.5),
        confidence: Confidence::new(1.0),
        tags: vec![],
        entities: vec![],
        provenance: Provenance { source_type: SourceType::Explicit, conversation_id: None },
        supersedes: None,
        superseded_by: None,
        embedding: None,
        created_at: now,
        updated_at: now,
        accessed_at: now,
    };

    engine.pool().writer.with_conn_sync(|conn| insert_memory(conn, &record)).unwrap();

    engine
        .pool()
        .writer
        .with_conn_sync(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM memory_fts WHERE memory_fts MATCH 'quarterly'", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
}
