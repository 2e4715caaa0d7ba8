mod bounded;
mod domain_event;
mod memory_file_record;
mod memory_record;
mod memory_type;
mod reports;
mod write_policy;

pub use bounded::{Confidence, Importance};
pub use domain_event::{DomainEvent, DomainEventType};
pub use memory_file_record::{FileSource, MemoryFileRecord, FILE_FORMAT_VERSION};
pub use memory_record::{EmbeddingMeta, MemoryRecord, Provenance, MAX_CONTENT_LENGTH};
pub use memory_type::{MemoryLayer, MemoryType, SourceType};
pub use reports::{IngestAction, IngestOutcome, ReconciliationReport, ScanReport};
pub use write_policy::{PolicyName, WritePolicyReport, WritePolicyViolation};
