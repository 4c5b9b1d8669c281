use serde::Serialize;
use tokio::sync::broadcast;

use crate::services::classifier::AlertTier;

/// Domain events emitted by the check pipeline.
///
/// Listeners (live UI feeds, audit sinks) subscribe through the bus; the
/// core never couples to a specific transport.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    SnapshotCreated {
        target_id: String,
        snapshot_id: String,
        tier: AlertTier,
        change_percentage: f64,
    },
    AlertRaised {
        target_id: String,
        tier: AlertTier,
        change_percentage: f64,
    },
    TargetChecked {
        target_id: String,
        success: bool,
    },
}

/// Broadcast fan-out for domain events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. A send error just means nobody is listening.
    pub fn publish(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Domain event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
