//! Broadcast relay: one ordered line source, many subscribers
//!
//! The relay is driven by two kinds of events:
//!
//! - **Lines** from the ingest thread ([`Relay::on_line`]), strictly one at
//!   a time in source order.
//! - **Subscriber lifecycle** from connection threads ([`Relay::connect`],
//!   [`Relay::on_subscriber_join`], [`Relay::on_subscriber_leave`]).
//!
//! The registry mutex is held only while iterating or mutating the registry.
//! Broadcasting does `try_send` into in-memory outboxes, never a socket
//! write, so a stalled subscriber cannot hold up the source or any other
//! subscriber. Delivery is fire-and-forget: no acknowledgement, no retry, no
//! replay for late joiners.

use crate::core::TelemetryLine;
use crate::error::Error;
use crate::streaming::registry::{Delivery, SubscriberId, SubscriberRegistry, SubscriberState};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Receiving side of one subscriber's outbox
pub struct Subscription {
    id: SubscriberId,
    peer: SocketAddr,
    outbox: Receiver<TelemetryLine>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Next queued line, if any
    pub fn try_recv(&self) -> Result<TelemetryLine, TryRecvError> {
        self.outbox.try_recv()
    }

    /// Wait up to `timeout` for the next line
    pub fn recv_timeout(&self, timeout: Duration) -> Result<TelemetryLine, RecvTimeoutError> {
        self.outbox.recv_timeout(timeout)
    }
}

/// Snapshot of relay counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Lines received from the source
    pub lines: u64,
    /// Line copies queued to subscribers
    pub delivered: u64,
    /// Line copies dropped for full outboxes
    pub dropped: u64,
    /// Line copies skipped for subscribers still connecting
    pub skipped: u64,
    /// Subscribers removed after their channel closed
    pub removed: u64,
}

/// Fans telemetry lines out to every open subscriber
pub struct Relay {
    registry: Mutex<SubscriberRegistry>,
    source_failed: AtomicBool,
    lines: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    skipped: AtomicU64,
    removed: AtomicU64,
}

impl Relay {
    /// Create a relay whose subscribers buffer up to `outbox_capacity` lines
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            registry: Mutex::new(SubscriberRegistry::new(outbox_capacity)),
            source_failed: AtomicBool::new(false),
            lines: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            removed: AtomicU64::new(0),
        }
    }

    /// Broadcast one line to every open subscriber
    pub fn on_line(&self, line: &TelemetryLine) -> Delivery {
        let delivery = self.registry.lock().broadcast(line);

        self.lines.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(delivery.delivered as u64, Ordering::Relaxed);
        self.dropped.fetch_add(delivery.dropped as u64, Ordering::Relaxed);
        self.skipped.fetch_add(delivery.skipped as u64, Ordering::Relaxed);
        self.removed.fetch_add(delivery.removed as u64, Ordering::Relaxed);

        log::trace!("Relayed {:?} to {} subscribers", line, delivery.delivered);
        delivery
    }

    /// Register a subscriber whose channel is still being set up
    ///
    /// The subscriber receives nothing until [`Relay::on_subscriber_join`].
    pub fn connect(&self, peer: SocketAddr) -> Subscription {
        let (id, outbox) = self.registry.lock().register(peer);
        log::debug!("Subscriber {} ({}) connecting", id, peer);
        Subscription { id, peer, outbox }
    }

    /// Mark a subscriber open; it receives every line broadcast from now on
    ///
    /// Returns false if the subscriber already left.
    pub fn on_subscriber_join(&self, subscription: &Subscription) -> bool {
        let opened = self.registry.lock().open(subscription.id);
        if opened {
            log::info!(
                "Subscriber {} joined from {} ({} open)",
                subscription.id,
                subscription.peer,
                self.open_subscribers()
            );
        }
        opened
    }

    /// Remove a subscriber; safe to call more than once
    pub fn on_subscriber_leave(&self, id: SubscriberId) {
        if let Some(peer) = self.registry.lock().remove(id) {
            log::info!("Subscriber {} left ({})", id, peer);
        }
    }

    /// Record that the line source failed
    ///
    /// Ingestion stops for good; subscribers stay connected but receive
    /// nothing further until the process is restarted.
    pub fn on_source_error(&self, err: &Error) {
        self.source_failed.store(true, Ordering::SeqCst);
        log::error!(
            "Telemetry source failed: {} ({} subscribers remain connected, no further data)",
            err,
            self.subscriber_count()
        );
    }

    /// True once [`Relay::on_source_error`] has been reported
    pub fn source_failed(&self) -> bool {
        self.source_failed.load(Ordering::SeqCst)
    }

    /// Lifecycle state of a subscriber
    pub fn state(&self, id: SubscriberId) -> SubscriberState {
        self.registry.lock().state(id)
    }

    /// Number of registered subscribers (connecting or open)
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// Number of open subscribers
    pub fn open_subscribers(&self) -> usize {
        self.registry.lock().open_count()
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            lines: self.lines.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
        }
    }
}
