//! # memory-policy
//!
//! Write-policy pipeline (C7): four built-in validators — content,
//! confidence, attribution, duplicate — run in order ahead of every
//! create.

mod attribution;
mod confidence;
mod content;
mod duplicate;
mod runner;

pub use attribution::AttributionPolicy;
pub use confidence::ConfidencePolicy;
pub use content::ContentPolicy;
pub use duplicate::DuplicatePolicy;
pub use runner::{run_policies, with_duplicate_warning};
