use memory_core::traits::{IWritePolicy, WritePolicyInput};

/// Rejects empty/whitespace-only content and content past the configured
/// length ceiling.
pub struct ContentPolicy {
    max_content_length: usize,
}

impl ContentPolicy {
    pub fn new(max_content_length: usize) -> Self {
        Self { max_content_length }
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(memory_core::models::MAX_CONTENT_LENGTH)
    }
}

impl IWritePolicy for ContentPolicy {
    fn name(&self) -> &'static str {
        "content"
    }

    fn validate(&self, input: &WritePolicyInput) -> Result<(), String> {
        if input.content.trim().is_empty() {
            return Err("content must be non-empty after trimming".to_string());
        }
        if input.content.len() > self.max_content_length {
            return Err(format!("content exceeds {} bytes", self.max_content_length));
        }
        Ok(())
    }
}
