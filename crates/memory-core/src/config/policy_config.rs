use serde::{Deserialize, Serialize};

/// Thresholds consumed by the write-policy pipeline (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub max_content_length: usize,
    pub min_implicit_confidence: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_content_length: crate::models::MAX_CONTENT_LENGTH,
            min_implicit_confidence: 0.3,
        }
    }
}
