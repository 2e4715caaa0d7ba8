use std::sync::Arc;

use memory_core::traits::{IMemoryStorage, IWritePolicy, WritePolicyInput};

/// The synchronous half is a no-op — duplicate detection needs a
/// repository round-trip, which the `IWritePolicy::validate` contract
/// doesn't allow. `check_duplicate_async` is the real check, called
/// separately by the runner and folded into the report as a warning
/// rather than a violation.
pub struct DuplicatePolicy<S: IMemoryStorage> {
    storage: Arc<S>,
}

impl<S: IMemoryStorage> DuplicatePolicy<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Best-effort: any storage error is swallowed and treated as "no
    /// duplicate found" rather than surfaced, since this check must never
    /// block a write.
    pub async fn check_duplicate_async(&self, content: &str) -> Option<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        let hits = match self.storage.search_fts5(trimmed, 5).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::debug!("duplicate check failed, treating as no duplicate: {e}");
                return None;
            }
        };
        hits.into_iter()
            .find(|hit| hit.memory.content == content)
            .map(|hit| format!("identical content already exists as memory {}", hit.memory.id))
    }
}

impl<S: IMemoryStorage> IWritePolicy for DuplicatePolicy<S> {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn validate(&self, _input: &WritePolicyInput) -> Result<(), String> {
        Ok(())
    }
}
