// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-process change notification.
//!
//! Every write to a collection publishes a [`StoreEvent`]; views subscribe
//! (optionally to a single collection) and re-read when notified.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::Collection;

/// Where a change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Written through this process's store
    Local,
    /// Noticed on disk, written by someone else
    External,
}

/// A collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub collection: Collection,
    pub origin: EventOrigin,
}

impl StoreEvent {
    pub fn local(collection: Collection) -> Self {
        Self {
            collection,
            origin: EventOrigin::Local,
        }
    }

    pub fn external(collection: Collection) -> Self {
        Self {
            collection,
            origin: EventOrigin::External,
        }
    }
}

struct Subscriber {
    filter: Option<Collection>,
    sender: Sender<StoreEvent>,
}

/// Publish/subscribe hub. Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one collection, or to all of them with `None`
    pub fn subscribe(&self, filter: Option<Collection>) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Subscriber { filter, sender });
        Subscription { receiver }
    }

    /// Deliver an event to every interested subscriber. Subscribers whose
    /// [`Subscription`] was dropped are pruned. Returns the delivery count.
    pub fn publish(&self, event: StoreEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut delivered = 0;
        subscribers.retain(|s| {
            if s.filter.is_some_and(|c| c != event.collection) {
                return true;
            }
            match s.sender.send(event) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        tracing::trace!(?event, delivered, "published store event");
        delivered
    }

    /// Number of live subscribers (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Receiving end of a subscription
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<StoreEvent>,
}

impl Subscription {
    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&self) -> Option<StoreEvent> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending events
    pub fn recv_all(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
