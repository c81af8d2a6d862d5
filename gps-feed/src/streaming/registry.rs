//! Subscriber registry for the broadcast relay
//!
//! Each subscriber owns a bounded outbox (a crossbeam channel). The relay
//! pushes lines into outboxes with `try_send`, which never blocks; the
//! subscriber's connection thread drains its outbox onto the socket at
//! whatever pace the peer allows.
//!
//! # Lifecycle
//!
//! ```text
//! register()          open()                 remove() / outbox disconnected
//!     │                  │                          │
//!     ▼                  ▼                          ▼
//! Connecting ───────► Open ──────────────────► Closed (entry dropped)
//! ```
//!
//! Only `Open` subscribers receive lines. A line broadcast while a
//! subscriber is `Connecting` is skipped for it, not queued.

use crate::core::TelemetryLine;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::fmt;
use std::net::SocketAddr;

/// Identifier assigned to each subscriber at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Subscriber connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Registered, channel handshake still running
    Connecting,
    /// Receiving broadcasts
    Open,
    /// Removed from the registry
    Closed,
}

/// Per-broadcast delivery counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Subscribers the line was queued for
    pub delivered: usize,
    /// Subscribers skipped because they were not open yet
    pub skipped: usize,
    /// Subscribers whose outbox was full
    pub dropped: usize,
    /// Subscribers removed because their outbox was disconnected
    pub removed: usize,
}

struct Subscriber {
    id: SubscriberId,
    peer: SocketAddr,
    state: SubscriberState,
    outbox: Sender<TelemetryLine>,
}

/// Registered subscribers, in registration order
pub struct SubscriberRegistry {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    outbox_capacity: usize,
}

impl SubscriberRegistry {
    /// Create an empty registry whose outboxes hold `outbox_capacity` lines
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 1,
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Register a subscriber in `Connecting` state
    ///
    /// Returns its id and the receiving end of its outbox.
    pub fn register(&mut self, peer: SocketAddr) -> (SubscriberId, Receiver<TelemetryLine>) {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;

        let (outbox, rx) = bounded(self.outbox_capacity);
        self.subscribers.push(Subscriber {
            id,
            peer,
            state: SubscriberState::Connecting,
            outbox,
        });
        (id, rx)
    }

    /// Move a subscriber to `Open`; false if it is no longer registered
    pub fn open(&mut self, id: SubscriberId) -> bool {
        match self.subscribers.iter_mut().find(|s| s.id == id) {
            Some(subscriber) => {
                subscriber.state = SubscriberState::Open;
                true
            }
            None => false,
        }
    }

    /// Remove a subscriber, returning its peer address if it was registered
    pub fn remove(&mut self, id: SubscriberId) -> Option<SocketAddr> {
        let index = self.subscribers.iter().position(|s| s.id == id)?;
        Some(self.subscribers.remove(index).peer)
    }

    /// Current state of a subscriber
    pub fn state(&self, id: SubscriberId) -> SubscriberState {
        self.subscribers
            .iter()
            .find(|s| s.id == id)
            .map_or(SubscriberState::Closed, |s| s.state)
    }

    /// Number of registered subscribers (any state)
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// True when no subscriber is registered
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Number of subscribers in `Open` state
    pub fn open_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|s| s.state == SubscriberState::Open)
            .count()
    }

    /// Queue `line` for every open subscriber without blocking
    ///
    /// Subscribers whose outbox has been dropped are removed.
    pub fn broadcast(&mut self, line: &TelemetryLine) -> Delivery {
        let mut delivery = Delivery::default();

        self.subscribers.retain(|subscriber| {
            if subscriber.state != SubscriberState::Open {
                delivery.skipped += 1;
                return true;
            }

            match subscriber.outbox.try_send(line.clone()) {
                Ok(()) => {
                    delivery.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    log::trace!(
                        "Subscriber {} ({}) outbox full, dropping line",
                        subscriber.id,
                        subscriber.peer
                    );
                    delivery.dropped += 1;
                    true
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::debug!(
                        "Subscriber {} ({}) channel closed, removing",
                        subscriber.id,
                        subscriber.peer
                    );
                    delivery.removed += 1;
                    false
                }
            }
        });

        delivery
    }
}
