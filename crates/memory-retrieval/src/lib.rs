//! # memory-retrieval
//!
//! BM25 full-text retrieval (C9), vector similarity retrieval (C10), and
//! hybrid fusion (C11) over the memory store.

mod bm25;
mod hybrid;
mod sanitizer;
mod vector;

pub use bm25::Bm25Retriever;
pub use hybrid::{hybrid_search, FusionPolicy, HybridHit, HybridOptions};
pub use sanitizer::sanitize_query;
pub use vector::VectorRetriever;
