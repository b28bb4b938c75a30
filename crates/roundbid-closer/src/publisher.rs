//! Notification publishing — fire-and-forget event fan-out.
//!
//! The engine publishes settlement and bid events; downstream transport
//! (WebSocket broadcast, message queue) lives behind this trait. The core
//! never waits for acknowledgement and never fails because publishing did.

use std::sync::{Mutex, PoisonError};

use roundbid_types::{AuctionEvent, AuctionId};

/// Receives engine events for downstream broadcast.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, auction_id: AuctionId, event: AuctionEvent);
}

/// Discards all events. The default when no transport is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

impl NotificationPublisher for NullPublisher {
    fn publish(&self, _auction_id: AuctionId, _event: AuctionEvent) {}
}

/// Captures events in memory, for tests and local wiring.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    events: Mutex<Vec<(AuctionId, AuctionEvent)>>,
}

impl MemoryPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// All events published so far, in order.
    #[must_use]
    pub fn published(&self) -> Vec<(AuctionId, AuctionEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events for one auction, in order.
    #[must_use]
    pub fn published_for(&self, auction_id: AuctionId) -> Vec<AuctionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(id, _)| *id == auction_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationPublisher for MemoryPublisher {
    fn publish(&self, auction_id: AuctionId, event: AuctionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((auction_id, event));
    }
}
