use memory_core::models::SourceType;
use memory_core::traits::{IWritePolicy, WritePolicyInput};

/// For implicitly-sourced memories, requires a minimum confidence;
/// explicit memories skip the check entirely.
pub struct ConfidencePolicy {
    min_implicit_confidence: f64,
}

impl ConfidencePolicy {
    pub fn new(min_implicit_confidence: f64) -> Self {
        Self { min_implicit_confidence }
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl IWritePolicy for ConfidencePolicy {
    fn name(&self) -> &'static str {
        "confidence"
    }

    fn validate(&self, input: &WritePolicyInput) -> Result<(), String> {
        if input.provenance.source_type != SourceType::Implicit {
            return Ok(());
        }
        if input.confidence.get() < self.min_implicit_confidence {
            return Err(format!(
                "implicit memory confidence {:.2} is below the minimum of {:.2}",
                input.confidence.get(),
                self.min_implicit_confidence
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::models::{Confidence, Importance, Provenance};

    fn input(source_type: SourceType, confidence: f64) -> WritePolicyInput {
        WritePolicyInput {
            content: "x".to_string(),
            importance: Importance::new(0.5),
            confidence: Confidence::new(confidence),
            provenance: Provenance { source_type, conversation_id: None },
        }
    }

    #[test]
    fn explicit_memories_skip_the_check() {
        let policy = ConfidencePolicy::default();
        assert!(policy.validate(&input(SourceType::Explicit, 0.0)).is_ok());
    }

    #[test]
    fn low_confidence_implicit_memory_is_rejected() {
        let policy = ConfidencePolicy::default();
        assert!(policy.validate(&input(SourceType::Implicit, 0.1)).is_err());
    }

    #[test]
    fn implicit_memory_at_threshold_passes() {
        let policy = ConfidencePolicy::default();
        assert!(policy.validate(&input(SourceType::Implicit, 0.3)).is_ok());
    }
}
