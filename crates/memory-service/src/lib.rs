//! # memory-service
//!
//! Service façade (C8): readiness-gated CRUD with documented defaults,
//! domain event emission, and the export/import (v1.0) boundary.

mod export;
mod service;

pub use export::{export_records, exported_to_record, ExportDocument, ExportedProvenance, ExportedRecord};
pub use memory_fs::UpdateInput;
pub use service::{HealthStatus, MemoryService, RememberExplicitInput, SaveImplicitInput};
