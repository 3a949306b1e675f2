//! Event publisher that writes domain events to the log.

use tijori_core::{DomainEvent, EventPublisher};
use tracing::info;

/// Default publisher: every event becomes one structured `info!` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &DomainEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(event = event.name(), %payload, "domain event"),
            Err(err) => info!(event = event.name(), error = %err, "domain event"),
        }
    }
}
