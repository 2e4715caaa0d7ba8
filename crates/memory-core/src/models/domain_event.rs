use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::memory_record::MemoryRecord;

/// Event kind emitted by the service façade after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEventType {
    Created,
    Updated,
    Deleted,
}

/// Event emitted to subscribed sinks. Emission is synchronous with respect
/// to the triggering operation's return but never blocks on sink work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub event_type: DomainEventType,
    pub record: MemoryRecord,
    pub timestamp: DateTime<Utc>,
}
