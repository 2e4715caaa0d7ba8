use serde::{Deserialize, Serialize};

/// Debounce and filtering knobs for the filesystem watcher (C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub debounce_ms: u64,
    pub ignored_suffixes: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            ignored_suffixes: vec![
                ".tmp".to_string(),
                ".swp".to_string(),
                ".swo".to_string(),
                ".bak".to_string(),
                ".crswap".to_string(),
            ],
        }
    }
}
