use crate::models::DomainEvent;

/// A subscriber to service-emitted domain events. Implementations must be
/// side-effect-free with respect to the calling operation: a panicking or
/// slow sink must never poison the mutation that produced the event.
pub trait IEventSink: Send + Sync {
    fn on_memory_event(&self, event: &DomainEvent);
}
