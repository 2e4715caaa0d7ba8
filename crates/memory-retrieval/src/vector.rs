use std::sync::Arc;

use memory_core::errors::MemoryResult;
use memory_core::traits::{IEmbeddingProvider, IRetriever, RetrievalQuery, ScoredMemory};

use memory_storage::StorageEngine;

/// Vector retriever (C10): embeds the query text through the configured
/// provider, then asks the storage engine for a cosine-similarity scan
/// restricted to that provider's own model.
pub struct VectorRetriever<P: IEmbeddingProvider> {
    storage: Arc<StorageEngine>,
    provider: Arc<P>,
}

impl<P: IEmbeddingProvider> VectorRetriever<P> {
    pub fn new(storage: Arc<StorageEngine>, provider: Arc<P>) -> Self {
        Self { storage, provider }
    }
}

impl<P: IEmbeddingProvider> IRetriever for VectorRetriever<P> {
    async fn retrieve(&self, query: &RetrievalQuery) -> MemoryResult<Vec<ScoredMemory>> {
        if !self.provider.is_available() {
            return Ok(Vec::new());
        }

        let embedding = self.provider.embed(&query.text).await?;
        let meta = self.provider.metadata();
        if embedding.len() != meta.dimension {
            return Err(memory_core::errors::MemoryError::DimensionMismatch {
                expected: meta.dimension,
                actual: embedding.len(),
            });
        }

        let limit = if query.limit == 0 { 50 } else { query.limit };
        let hits = self.storage.search_vector_by(&meta.provider, &meta.model, &embedding, limit)?;

        let filtered: Vec<ScoredMemory> = hits
            .into_iter()
            .filter(|hit| query.memory_types.is_empty() || query.memory_types.contains(&hit.memory.memory_type))
            .filter(|hit| query.layers.is_empty() || query.layers.contains(&hit.memory.layer))
            .filter(|hit| hit.score >= query.min_score)
            .collect();

        Ok(filtered)
    }
}
