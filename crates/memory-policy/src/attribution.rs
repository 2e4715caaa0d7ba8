use memory_core::models::SourceType;
use memory_core::traits::{IWritePolicy, WritePolicyInput};

/// For implicitly-sourced memories, requires a non-empty conversation id
/// to attribute the memory to; explicit memories are exempt.
#[derive(Default)]
pub struct AttributionPolicy;

impl IWritePolicy for AttributionPolicy {
    fn name(&self) -> &'static str {
        "attribution"
    }

    fn validate(&self, input: &WritePolicyInput) -> Result<(), String> {
        if input.provenance.source_type != SourceType::Implicit {
            return Ok(());
        }
        match &input.provenance.conversation_id {
            Some(id) if !id.trim().is_empty() => Ok(()),
            _ => Err("implicit memories require a non-empty conversationId".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_core::models::{Confidence, Importance, Provenance};

    fn input(source_type: SourceType, conversation_id: Option<&str>) -> WritePolicyInput {
        WritePolicyInput {
            content: "x".to_string(),
            importance: Importance::new(0.5),
            confidence: Confidence::new(1.0),
            provenance: Provenance { source_type, conversation_id: conversation_id.map(str::to_string) },
        }
    }

    #[test]
    fn explicit_memories_skip_the_check() {
        let policy = AttributionPolicy;
        assert!(policy.validate(&input(SourceType::Explicit, None)).is_ok());
    }

    #[test]
    fn implicit_memory_without_conversation_id_is_rejected() {
        let policy = AttributionPolicy;
        assert!(policy.validate(&input(SourceType::Implicit, None)).is_err());
        assert!(policy.validate(&input(SourceType::Implicit, Some("   "))).is_err());
    }

    #[test]
    fn implicit_memory_with_conversation_id_passes() {
        let policy = AttributionPolicy;
        assert!(policy.validate(&input(SourceType::Implicit, Some("conv-1"))).is_ok());
    }
}
