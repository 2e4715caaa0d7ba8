use serde::{Deserialize, Serialize};

/// SQLite connection tuning. WAL journaling and foreign keys are always on;
/// only the busy timeout is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { busy_timeout_ms: 1_000 }
    }
}
