use crate::models::{Confidence, Importance, Provenance};

/// Input seen by every write-policy validator. Mirrors the fields a
/// `create` call needs to check, independent of the richer `MemoryRecord`.
#[derive(Debug, Clone)]
pub struct WritePolicyInput {
    pub content: String,
    pub importance: Importance,
    pub confidence: Confidence,
    pub provenance: Provenance,
}

/// A single synchronous validator in the write-policy pipeline.
/// `validate` never performs I/O; the duplicate-check policy's I/O-bound
/// half lives behind a separate async method on its concrete type.
pub trait IWritePolicy {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &WritePolicyInput) -> Result<(), String>;
}
