//! Event Hub - fan-out of dashboard events to every connected observer.
//!
//! Publishers (command handlers, the simulator) never see the transport.
//! Each observer owns a receiver; a receiver that falls behind skips the
//! oldest events and keeps going.

use tokio::sync::broadcast;

use crate::constants::BROADCAST_CAPACITY;
use crate::models::ServerEvent;

#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to all observers. Returns how many received it; having
    /// nobody connected is not an error.
    pub fn publish(&self, event: ServerEvent) -> usize {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::trace!("Event '{}' delivered to {} observer(s)", name, receivers);
                receivers
            }
            Err(_) => {
                tracing::trace!("No observers connected, event '{}' dropped", name);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Number of connected observers
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
