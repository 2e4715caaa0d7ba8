use serde::{Deserialize, Serialize};

/// Default weights for the hybrid search fusion policy (C11). Per-call
/// options override these; see `memory-retrieval::hybrid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
    pub bm25_weight: f64,
    pub vector_weight: f64,
    pub importance_boost: f64,
    pub rrf_k: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            bm25_weight: 0.5,
            vector_weight: 0.5,
            importance_boost: 0.0,
            rrf_k: 60.0,
        }
    }
}
