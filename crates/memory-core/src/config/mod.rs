mod paths_config;
mod policy_config;
mod retrieval_config;
mod storage_config;
mod watcher_config;

pub use paths_config::PathsConfig;
pub use policy_config::PolicyConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::StorageConfig;
pub use watcher_config::WatcherConfig;

use serde::{Deserialize, Serialize};

use crate::errors::MemoryResult;

/// Root configuration for the engine, composed of one struct per
/// subsystem. Each subsystem struct is independently `#[serde(default)]`
/// so a partial TOML document only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryEngineConfig {
    pub paths: PathsConfig,
    pub storage: StorageConfig,
    pub watcher: WatcherConfig,
    pub policy: PolicyConfig,
    pub retrieval: RetrievalConfig,
}

impl MemoryEngineConfig {
    pub fn from_toml(input: &str) -> MemoryResult<Self> {
        toml::from_str(input).map_err(|e| crate::errors::MemoryError::Validation(e.to_string()))
    }
}
