use std::collections::HashMap;

use memory_core::errors::{MemoryError, MemoryResult};
use memory_core::models::MemoryRecord;
use memory_core::traits::{IRetriever, RetrievalQuery};

/// Fusion policy selector (C11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionPolicy {
    #[default]
    WeightedSum,
    ReciprocalRankFusion,
}

#[derive(Debug, Clone)]
pub struct HybridOptions {
    pub limit: usize,
    pub min_score: f64,
    pub bm25_weight: f64,
    pub vector_weight: f64,
    pub importance_boost: f64,
    pub rrf_k: f64,
    pub policy: FusionPolicy,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            limit: 50,
            min_score: 0.0,
            bm25_weight: 0.5,
            vector_weight: 0.5,
            importance_boost: 0.0,
            rrf_k: 60.0,
            policy: FusionPolicy::WeightedSum,
        }
    }
}

/// One fused hit, carrying the per-retriever breakdown the merge used.
#[derive(Debug, Clone)]
pub struct HybridHit {
    pub memory: MemoryRecord,
    pub fused_score: f64,
    pub bm25_score: f64,
    pub vector_score: f64,
}

struct Candidate {
    memory: MemoryRecord,
    bm25_score: f64,
    vector_score: f64,
    bm25_rank: Option<usize>,
    vector_rank: Option<usize>,
}

/// Runs both retrievers, unions their hits by memory id, fuses per the
/// configured policy, and truncates to `options.limit`. If exactly one
/// retriever fails, the other's results are returned alone; if both fail,
/// a single error carrying both causes is surfaced.
pub async fn hybrid_search(
    bm25: &impl IRetriever,
    vector: &impl IRetriever,
    query: &RetrievalQuery,
    options: &HybridOptions,
) -> MemoryResult<Vec<HybridHit>> {
    let bm25_result = bm25.retrieve(query).await;
    let vector_result = vector.retrieve(query).await;

    let (bm25_hits, vector_hits) = match (bm25_result, vector_result) {
        (Ok(b), Ok(v)) => (b, v),
        (Ok(b), Err(e)) => {
            tracing::warn!("vector retriever failed, degrading to bm25-only results: {e}");
            (b, Vec::new())
        }
        (Err(e), Ok(v)) => {
            tracing::warn!("bm25 retriever failed, degrading to vector-only results: {e}");
            (Vec::new(), v)
        }
        (Err(e1), Err(e2)) => {
            return Err(MemoryError::Validation(format!(
                "both retrievers failed: bm25: {e1}; vector: {e2}"
            )));
        }
    };

    let mut candidates: HashMap<String, Candidate> = HashMap::new();

    for (rank, hit) in bm25_hits.into_iter().enumerate() {
        let entry = candidates.entry(hit.memory.id.clone()).or_insert_with(|| Candidate {
            memory: hit.memory.clone(),
            bm25_score: 0.0,
            vector_score: 0.0,
            bm25_rank: None,
            vector_rank: None,
        });
        entry.bm25_score = hit.score;
        entry.bm25_rank = Some(rank + 1);
    }

    for (rank, hit) in vector_hits.into_iter().enumerate() {
        let entry = candidates.entry(hit.memory.id.clone()).or_insert_with(|| Candidate {
            memory: hit.memory.clone(),
            bm25_score: 0.0,
            vector_score: 0.0,
            bm25_rank: None,
            vector_rank: None,
        });
        entry.vector_score = hit.score;
        entry.vector_rank = Some(rank + 1);
    }

    let mut fused: Vec<HybridHit> = candidates
        .into_values()
        .map(|c| {
            let importance = c.memory.importance.get();
            let fused_score = match options.policy {
                FusionPolicy::WeightedSum => clamp01(
                    c.bm25_score * options.bm25_weight
                        + c.vector_score * options.vector_weight
                        + importance * options.importance_boost,
                ),
                FusionPolicy::ReciprocalRankFusion => {
                    let k = options.rrf_k;
                    let rbm25 = c.bm25_rank.map(|r| 1.0 / (k + r as f64)).unwrap_or(0.0);
                    let rvec = c.vector_rank.map(|r| 1.0 / (k + r as f64)).unwrap_or(0.0);
                    let denom = 2.0 / (k + 1.0);
                    clamp01((rbm25 + rvec) / denom + importance * options.importance_boost)
                }
            };
            HybridHit {
                memory: c.memory,
                fused_score,
                bm25_score: c.bm25_score,
                vector_score: c.vector_score,
            }
        })
        .filter(|hit| hit.fused_score >= options.min_score)
        .collect();

    fused.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.memory.id.cmp(&b.memory.id))
    });
    fused.truncate(options.limit);

    Ok(fused)
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}
