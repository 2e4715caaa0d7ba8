use serde::{Deserialize, Serialize};

/// Identifies a built-in write-policy validator, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyName {
    Content,
    Confidence,
    Attribution,
    Duplicate,
}

/// A single validator failure. Violations accumulate; a failing policy
/// does not stop later policies from also running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritePolicyViolation {
    pub policy: PolicyName,
    pub reason: String,
}

/// Outcome of running the full write-policy pipeline over one input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WritePolicyReport {
    pub passed: bool,
    pub violations: Vec<WritePolicyViolation>,
    pub warnings: Vec<String>,
}
