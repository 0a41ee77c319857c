//! # Cart Change Events
//!
//! Subscribers get a [`CartEvent`] after the startup load and after every
//! operation that changed the cart.
//!
//! ```text
//!  CartStore ──publish──► broadcast::Sender<CartEvent> ──► Receiver (UI)
//!                                                      └──► Receiver (tests)
//! ```
//!
//! Receivers that fall more than `events.capacity` behind lose the oldest
//! events (`RecvError::Lagged`). The current state is always available from
//! `CartStore::products()`.

use gomarket_core::{CartChange, LineItem};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// What caused a [`CartEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartEventKind {
    /// The store finished loading its persisted snapshot.
    Loaded,
    /// An operation changed the cart.
    Changed { change: CartChange },
}

/// A cart state notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEvent {
    #[serde(flatten)]
    pub kind: CartEventKind,
    /// The cart contents right after the event.
    pub products: Vec<LineItem>,
}

impl CartEvent {
    pub fn loaded(products: Vec<LineItem>) -> Self {
        CartEvent {
            kind: CartEventKind::Loaded,
            products,
        }
    }

    pub fn changed(change: CartChange, products: Vec<LineItem>) -> Self {
        CartEvent {
            kind: CartEventKind::Changed { change },
            products,
        }
    }

    /// Returns the change, if this event came from an operation.
    pub fn change(&self) -> Option<&CartChange> {
        match &self.kind {
            CartEventKind::Changed { change } => Some(change),
            CartEventKind::Loaded => None,
        }
    }
}

/// Fan-out of cart events.
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<CartEvent>,
}

impl EventBus {
    /// Creates the bus. A capacity of 0 is raised to 1.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        EventBus { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event. Having no subscribers is fine.
    pub(crate) fn publish(&self, event: CartEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        trace!(receivers, "Published cart event");
    }
}
