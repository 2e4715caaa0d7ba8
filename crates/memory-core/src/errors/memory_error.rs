/// Top-level error type for the memory engine.
///
/// Variants map to the kinds in the error taxonomy, not to implementation
/// classes: callers match on kind, not on which subsystem raised it.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("format error at line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(String),

    #[error("engine not ready")]
    NotReady,

    #[error("memory not found: {id}")]
    NotFound { id: String },

    #[error("write policy violation: {0}")]
    Policy(String),

    #[error("embedding provider request failed: {0}")]
    ProviderRequest(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("operation cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MemoryError {
    /// Stable short code surfaced to clients alongside the human message.
    pub fn code(&self) -> &'static str {
        match self {
            MemoryError::Validation(_) => "VALIDATION",
            MemoryError::Format { .. } => "FORMAT",
            MemoryError::Io(_) => "IO",
            MemoryError::Db(_) => "DB",
            MemoryError::NotReady => "NOT_READY",
            MemoryError::NotFound { .. } => "NOT_FOUND",
            MemoryError::Policy(_) => "POLICY",
            MemoryError::ProviderRequest(_) => "PROVIDER_REQUEST",
            MemoryError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            MemoryError::Cancelled => "CANCELLED",
            MemoryError::Serialization(_) => "SERIALIZATION",
        }
    }
}

/// Convenience type alias used throughout the engine.
pub type MemoryResult<T> = Result<T, MemoryError>;
