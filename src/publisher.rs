//! Domain event fan-out over NATS.

use crate::domain::events::DomainEvent;
use tracing::{info, warn};

/// Publishes domain events when a NATS connection is configured. Without
/// one, events are logged and dropped.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }
    pub fn disabled() -> Self { Self { nats: None } }
    pub fn is_connected(&self) -> bool { self.nats.is_some() }

    /// Delivery failures are logged, never returned: an event is a side note
    /// to a write that already happened.
    pub async fn publish(&self, event: DomainEvent) {
        let subject = event.subject();
        let Some(client) = &self.nats else {
            info!("📭 {} (no event bus configured)", subject);
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("⚠️ Failed to encode {}: {}", subject, e);
                return;
            }
        };
        match client.publish(subject.clone(), payload.into()).await {
            Ok(()) => info!("📣 Published {}", subject),
            Err(e) => warn!("⚠️ Failed to publish {}: {}", subject, e),
        }
    }
}
