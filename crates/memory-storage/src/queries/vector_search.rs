//! Embedding storage and linear-scan cosine-similarity search.
//!
//! Vectors are packed as little-endian f32 bytes. A linear scan suffices
//! at expected sizes; an ANN index can sit behind the same retriever
//! interface later without touching the schema.

use rusqlite::{params, Connection};

use memory_core::errors::MemoryResult;
use memory_core::traits::ScoredMemory;

use crate::to_storage_err;

/// Insert or replace the embedding for `(memory_id, provider, model)`.
pub fn store_embedding(
    conn: &Connection,
    memory_id: &str,
    provider: &str,
    model: &str,
    vector: &[f32],
) -> MemoryResult<()> {
    let bytes = pack_vector(vector);
    conn.execute(
        "INSERT INTO memory_embeddings (memory_id, provider, model, dimension, version, vector, created_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
         ON CONFLICT(memory_id, provider, model) DO UPDATE SET
            dimension = excluded.dimension,
            vector = excluded.vector,
            created_at = excluded.created_at",
        params![memory_id, provider, model, vector.len() as i64, bytes, chrono::Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Cosine-similarity search over every stored vector for `(provider, model)`.
/// Dimension mismatches are skipped rather than erroring; a zero-norm query
/// vector yields an empty result; negative similarities are filtered out.
pub fn search_vector(
    conn: &Connection,
    provider: &str,
    model: &str,
    query_vector: &[f32],
    limit: usize,
) -> MemoryResult<Vec<ScoredMemory>> {
    let query_norm = norm(query_vector);
    if query_norm == 0.0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(
            "SELECT memory_id, dimension, vector FROM memory_embeddings
             WHERE provider = ?1 AND model = ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![provider, model], |row| {
            let memory_id: String = row.get(0)?;
            let dimension: i64 = row.get(1)?;
            let bytes: Vec<u8> = row.get(2)?;
            Ok((memory_id, dimension as usize, bytes))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let (memory_id, dimension, bytes) = row.map_err(|e| to_storage_err(e.to_string()))?;
        if dimension != query_vector.len() {
            continue;
        }
        let stored = unpack_vector(&bytes);
        let similarity = cosine_similarity(query_vector, &stored, query_norm);
        if similarity <= 0.0 {
            continue;
        }
        if let Some(memory) = crate::queries::memory_crud::get_memory(conn, &memory_id)? {
            scored.push(ScoredMemory { memory, score: similarity as f64 });
        }
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    Ok(scored)
}

fn pack_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

fn unpack_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32) -> f32 {
    let b_norm = norm(b);
    if b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_round_trip() {
        let v = vec![0.1_f32, -0.5, 2.0, 0.0];
        assert_eq!(unpack_vector(&pack_vector(&v)), v);
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0_f32, 2.0, 3.0];
        let n = norm(&v);
        assert!((cosine_similarity(&v, &v, n) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_zero_similarity() {
        let a = vec![1.0_f32, 0.0];
        let b = vec![0.0_f32, 1.0];
        assert!(cosine_similarity(&a, &b, norm(&a)).abs() < 1e-6);
    }
}
