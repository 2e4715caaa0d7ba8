use memory_core::models::{Confidence, Importance, MemoryType, Provenance};
use memory_core::models::MemoryLayer;

/// Fields supplied by a caller creating a new memory. The repository
/// computes `id`, `createdAt`, `updatedAt`, and `accessedAt` itself.
#[derive(Debug, Clone)]
pub struct CreateInput {
    pub content: String,
    pub memory_type: MemoryType,
    pub layer: MemoryLayer,
    pub importance: Importance,
    pub confidence: Confidence,
    pub tags: Vec<String>,
    pub entities: Vec<String>,
    pub provenance: Provenance,
    pub supersedes: Option<String>,
    pub superseded_by: Option<String>,
}

/// Fields a caller may change on an existing memory. `None` leaves the
/// corresponding field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateInput {
    pub content: Option<String>,
    pub importance: Option<Importance>,
    pub confidence: Option<Confidence>,
    pub tags: Option<Vec<String>>,
    pub entities: Option<Vec<String>>,
    pub supersedes: Option<Option<String>>,
    pub superseded_by: Option<Option<String>>,
}
