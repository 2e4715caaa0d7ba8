use memory_core::errors::MemoryResult;
use memory_core::traits::{IMemoryStorage, IRetriever, RetrievalQuery, ScoredMemory};

use crate::sanitizer::sanitize_query;

/// Full-text retriever (C9): sanitizes the query, runs it against the
/// storage engine's FTS5 index, and normalizes the raw (negative,
/// unbounded) BM25 scores into `[0, 1]`.
pub struct Bm25Retriever<S: IMemoryStorage> {
    storage: std::sync::Arc<S>,
}

impl<S: IMemoryStorage> Bm25Retriever<S> {
    pub fn new(storage: std::sync::Arc<S>) -> Self {
        Self { storage }
    }
}

impl<S: IMemoryStorage> IRetriever for Bm25Retriever<S> {
    async fn retrieve(&self, query: &RetrievalQuery) -> MemoryResult<Vec<ScoredMemory>> {
        let sanitized = sanitize_query(&query.text);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }

        let limit = if query.limit == 0 { 50 } else { query.limit };
        let hits = self.storage.search_fts5(&sanitized, limit).await?;

        let hits: Vec<ScoredMemory> = hits
            .into_iter()
            .filter(|hit| query.memory_types.is_empty() || query.memory_types.contains(&hit.memory.memory_type))
            .filter(|hit| query.layers.is_empty() || query.layers.contains(&hit.memory.layer))
            .collect();

        let normalized = normalize_bm25(hits);
        Ok(normalized.into_iter().filter(|hit| hit.score >= query.min_score).collect())
    }
}

/// Min-max scales raw (negative) BM25 scores into `[0, 1]`: the
/// most-negative raw score (most relevant) maps to `1.0`, the
/// least-negative to `0.0`. A batch of exactly one hit maps to `1.0`.
fn normalize_bm25(mut hits: Vec<ScoredMemory>) -> Vec<ScoredMemory> {
    if hits.is_empty() {
        return hits;
    }
    if hits.len() == 1 {
        hits[0].score = 1.0;
        return hits;
    }

    let most_negative = hits.iter().map(|h| h.score).fold(f64::INFINITY, f64::min);
    let least_negative = hits.iter().map(|h| h.score).fold(f64::NEG_INFINITY, f64::max);
    let spread = least_negative - most_negative;

    for hit in &mut hits {
        hit.score = if spread == 0.0 { 1.0 } else { (least_negative - hit.score) / spread };
    }
    hits
}


/// Property 10: normalization always lands a single-hit batch on exactly
/// `1.0`, and every score in a min-max-scaled batch lies in `[0, 1]`
/// regardless of the raw (negative, unbounded) BM25 values SQLite hands
/// back.
#[cfg(test)]
mod proptests {
    use super::*;
    use memory_core::models::{Confidence, EmbeddingMeta, Importance, MemoryLayer, MemoryRecord, MemoryType, Provenance, SourceType};
    use memory_core::traits::ScoredMemory as Sm;
    use proptest::prelude::*;

    fn record(id: usize) -> MemoryRecord {
        let now = chrono::Utc::now();
        MemoryRecord {
            id: format!("m{id}"),
            content: "x".to_string(),
            memory_type: MemoryType::Fact,
            layer: MemoryLayer::Stm,
            importance: Importance::new(0.5),
            confidence: Confidence::new(1.0),
            tags: vec![],
            entities: vec![],
            provenance: Provenance { source_type: SourceType::Explicit, conversation_id: None },
            supersedes: None,
            superseded_by: None,
            embedding: None::<EmbeddingMeta>,
            created_at: now,
            updated_at: now,
            accessed_at: now,
        }
    }

    proptest! {
        #[test]
        fn normalized_scores_always_fall_in_unit_interval(raw_scores in prop::collection::vec(-1000.0f64..0.0, 0..20)) {
            let hits: Vec<Sm> = raw_scores
                .into_iter()
                .enumerate()
                .map(|(i, score)| Sm { memory: record(i), score })
                .collect();
            let count = hits.len();
            let normalized = normalize_bm25(hits);

            if count == 1 {
                prop_assert!((normalized[0].score - 1.0).abs() < 1e-9);
            }
            for hit in &normalized {
                prop_assert!(hit.score >= 0.0 && hit.score <= 1.0);
            }
        }
    }
}
