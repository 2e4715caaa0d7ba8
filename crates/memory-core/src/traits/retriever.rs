use crate::errors::MemoryResult;
use crate::models::{MemoryLayer, MemoryType};
use crate::traits::memory_storage::ScoredMemory;

/// Shared query shape for both the BM25 and vector retrievers.
#[derive(Debug, Clone, Default)]
pub struct RetrievalQuery {
    pub text: String,
    pub limit: usize,
    pub min_score: f64,
    pub memory_types: Vec<MemoryType>,
    pub layers: Vec<MemoryLayer>,
}

/// Implemented by the BM25 retriever, the vector retriever, and the
/// hybrid fusion layer that sits above both.
#[allow(async_fn_in_trait)]
pub trait IRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> MemoryResult<Vec<ScoredMemory>>;
}
