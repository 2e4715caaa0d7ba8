//! `StorageEngine` — the concrete `IMemoryStorage` implementation backing
//! the rest of the workspace. Owns the connection pool and runs migrations
//! at open time.

use memory_core::errors::MemoryResult;
use memory_core::models::MemoryRecord;
use memory_core::traits::{IMemoryStorage, ListFilter, ScoredMemory};

use crate::pool::ConnectionPool;
use crate::queries;

/// Default number of read-only connections held open alongside the writer.
const DEFAULT_READER_COUNT: usize = 4;

pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Opens (creating if absent) the database at `db_path`, applies
    /// pragmas, and runs any pending migrations.
    pub fn open(db_path: &str, busy_timeout_ms: u64) -> MemoryResult<Self> {
        let pool = ConnectionPool::open(db_path, busy_timeout_ms, DEFAULT_READER_COUNT)?;
        pool.writer.with_conn_sync(|conn| {
            crate::migrations::run_migrations(conn)?;
            crate::pool::ensure_fts_triggers(conn)
        })?;
        Ok(Self { pool })
    }

    /// In-memory database for tests: same schema, no file on disk.
    pub fn open_in_memory() -> MemoryResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.writer.with_conn_sync(|conn| {
            crate::migrations::run_migrations(conn)?;
            crate::pool::ensure_fts_triggers(conn)
        })?;
        Ok(Self { pool })
    }

    /// Runs `f` against the single writer connection. Exposed so the
    /// dual-write repository in `memory-fs` can compose an insert with its
    /// provenance row inside one transaction.
    pub fn with_writer<T>(&self, f: impl FnOnce(&rusqlite::Connection) -> MemoryResult<T>) -> MemoryResult<T> {
        self.pool.writer.with_conn_sync(f)
    }

    /// Direct access to the underlying connection pool, mainly for
    /// integration tests that need to inspect schema state directly.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn insert_provenance(
        &self,
        memory_id: &str,
        event_type: &str,
        source_details: &serde_json::Value,
    ) -> MemoryResult<i64> {
        self.pool
            .writer
            .with_conn_sync(|conn| queries::provenance_ops::insert_provenance(conn, memory_id, event_type, source_details))
    }

    pub fn store_embedding(&self, memory_id: &str, provider: &str, model: &str, vector: &[f32]) -> MemoryResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| queries::vector_search::store_embedding(conn, memory_id, provider, model, vector))
    }

    pub fn search_vector_by(
        &self,
        provider: &str,
        model: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> MemoryResult<Vec<ScoredMemory>> {
        self.pool
            .readers
            .with_conn_sync(|conn| queries::vector_search::search_vector(conn, provider, model, query_vector, limit))
    }

    /// Every `(id, content)` pair currently in the `memories` table, used
    /// by reconciliation to diff against the filesystem.
    pub fn all_ids_and_content(&self) -> MemoryResult<Vec<(String, String)>> {
        self.pool.readers.with_conn_sync(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, content FROM memories")
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|e| crate::to_storage_err(e.to_string()))
        })
    }

    pub fn integrity_check(&self) -> MemoryResult<bool> {
        self.pool.readers.with_conn_sync(queries::maintenance::integrity_check)
    }

    pub fn wal_checkpoint(&self) -> MemoryResult<()> {
        self.pool.writer.with_conn_sync(queries::maintenance::wal_checkpoint)
    }

    pub fn vacuum(&self) -> MemoryResult<()> {
        self.pool.writer.with_conn_sync(queries::maintenance::vacuum)
    }
}

impl IMemoryStorage for StorageEngine {
    async fn get_by_id(&self, id: &str) -> MemoryResult<Option<MemoryRecord>> {
        self.pool.readers.with_conn_sync(|conn| queries::memory_crud::get_memory(conn, id))
    }

    async fn list(&self, filter: ListFilter) -> MemoryResult<Vec<MemoryRecord>> {
        let limit = filter.limit.unwrap_or(50) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;
        self.pool.readers.with_conn_sync(|conn| {
            queries::memory_crud::list_memories(conn, filter.memory_type, filter.layer, limit, offset)
        })
    }

    async fn count(&self, filter: ListFilter) -> MemoryResult<u64> {
        self.pool
            .readers
            .with_conn_sync(|conn| queries::memory_crud::count_memories(conn, filter.memory_type, filter.layer))
    }

    async fn insert(&self, record: &MemoryRecord) -> MemoryResult<()> {
        self.pool.writer.with_conn_sync(|conn| queries::memory_crud::insert_memory(conn, record))
    }

    async fn update(&self, record: &MemoryRecord) -> MemoryResult<()> {
        self.pool.writer.with_conn_sync(|conn| queries::memory_crud::update_memory(conn, record))
    }

    async fn delete(&self, id: &str) -> MemoryResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            queries::memory_crud::delete_memory(conn, id)?;
            Ok(())
        })
    }

    async fn search_fts5(&self, query: &str, limit: usize) -> MemoryResult<Vec<ScoredMemory>> {
        self.pool.readers.with_conn_sync(|conn| queries::fts_search::search_fts5(conn, query, limit))
    }

    async fn search_vector(&self, query_vector: &[f32], limit: usize) -> MemoryResult<Vec<ScoredMemory>> {
        // Default provider/model resolution lives one layer up, in
        // `memory-retrieval::VectorRetriever`, which knows the active
        // embedding provider's identity. This path exists to satisfy the
        // trait for callers that don't care which provider produced the
        // vector; it scans every stored embedding regardless of model.
        self.pool.readers.with_conn_sync(|conn| {
            let mut stmt = conn
                .prepare("SELECT DISTINCT provider, model FROM memory_embeddings")
                .map_err(|e| crate::to_storage_err(e.to_string()))?;
            let pairs = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
                .map_err(|e| crate::to_storage_err(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| crate::to_storage_err(e.to_string()))?;

            let mut all = Vec::new();
            for (provider, model) in pairs {
                all.extend(queries::vector_search::search_vector(conn, &provider, &model, query_vector, limit)?);
            }
            all.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            all.truncate(limit);
            Ok(all)
        })
    }
}
