use crate::errors::MemoryResult;
use crate::models::{MemoryLayer, MemoryRecord, MemoryType};

/// Filters accepted by `list`/`find_by_*`. `limit`/`offset` follow the
/// service façade's default of `limit = 50` when `None`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub memory_type: Option<MemoryType>,
    pub layer: Option<MemoryLayer>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// A stored memory paired with a retrieval score (BM25 or cosine).
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub memory: MemoryRecord,
    pub score: f64,
}

/// Storage abstraction implemented by `memory-storage`'s `StorageEngine`.
/// Kept separate from the concrete engine so `memory-retrieval` and
/// `memory-service` can depend on the interface rather than the backend.
#[allow(async_fn_in_trait)]
pub trait IMemoryStorage {
    async fn get_by_id(&self, id: &str) -> MemoryResult<Option<MemoryRecord>>;
    async fn list(&self, filter: ListFilter) -> MemoryResult<Vec<MemoryRecord>>;
    async fn count(&self, filter: ListFilter) -> MemoryResult<u64>;
    async fn insert(&self, record: &MemoryRecord) -> MemoryResult<()>;
    async fn update(&self, record: &MemoryRecord) -> MemoryResult<()>;
    async fn delete(&self, id: &str) -> MemoryResult<()>;
    async fn search_fts5(&self, query: &str, limit: usize) -> MemoryResult<Vec<ScoredMemory>>;
    async fn search_vector(&self, query_vector: &[f32], limit: usize) -> MemoryResult<Vec<ScoredMemory>>;
}
