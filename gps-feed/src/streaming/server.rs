//! WebSocket subscriber server
//!
//! Accepts live-view connections and pushes every relayed line to them as a
//! text message, exactly as received from the device (no envelope).
//!
//! # Threads
//!
//! ```text
//! [accept loop] ──spawn──► [subscriber thread] ×N
//!                                │  outbox.recv_timeout()
//!                                ▼
//!                          socket.write(Text(line))
//! ```
//!
//! Each subscriber thread owns its socket. Slow peers block only their own
//! thread; the relay keeps filling (and, when full, dropping from) that
//! subscriber's outbox without waiting.
//!
//! # Connection Lifecycle
//!
//! 1. TCP accept, subscriber registered as `Connecting`
//! 2. WebSocket handshake
//! 3. Subscriber marked `Open`, lines start flowing
//! 4. Peer closes, send fails, or shutdown: subscriber removed

use crate::error::{Error, Result};
use crate::streaming::relay::{Relay, Subscription};
use crossbeam_channel::RecvTimeoutError;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tungstenite::error::ProtocolError;
use tungstenite::{Message, WebSocket};

/// How long a connecting peer has to complete the WebSocket handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outbox wait per loop iteration; bounds shutdown latency
const OUTBOX_POLL: Duration = Duration::from_millis(50);

/// Socket read timeout used to poll for close/ping frames between sends
const INBOUND_POLL: Duration = Duration::from_millis(5);

/// Sleep between accept attempts when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Accept loop for WebSocket subscribers
pub struct SubscriberServer {
    listener: TcpListener,
    relay: Arc<Relay>,
    running: Arc<AtomicBool>,
}

impl SubscriberServer {
    /// Bind the subscriber listener
    ///
    /// # Arguments
    /// - `bind_address`: TCP bind address (e.g., "0.0.0.0:8089")
    pub fn bind(bind_address: &str, relay: Arc<Relay>, running: Arc<AtomicBool>) -> Result<Self> {
        let listener = TcpListener::bind(bind_address)
            .map_err(|e| Error::Other(format!("Failed to bind to {}: {}", bind_address, e)))?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            listener,
            relay,
            running,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept subscribers until the running flag is cleared
    pub fn run(&self) -> Result<()> {
        log::info!("Subscriber server listening on ws://{}", self.local_addr()?);

        while self.running.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_subscriber(stream, peer),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                    thread::sleep(ACCEPT_POLL);
                }
            }
        }

        log::info!("Subscriber server stopped");
        Ok(())
    }

    fn spawn_subscriber(&self, stream: TcpStream, peer: SocketAddr) {
        let relay = Arc::clone(&self.relay);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name(format!("subscriber-{}", peer))
            .spawn(move || {
                if let Err(e) = serve_subscriber(stream, peer, &relay, &running) {
                    log::warn!("Subscriber {} dropped: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn subscriber thread for {}: {}", peer, e);
        }
    }
}

/// Run one subscriber connection to completion
fn serve_subscriber(
    stream: TcpStream,
    peer: SocketAddr,
    relay: &Relay,
    running: &AtomicBool,
) -> Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    stream.set_nodelay(true)?;

    let subscription = relay.connect(peer);

    let mut socket = match tungstenite::accept(stream) {
        Ok(socket) => socket,
        Err(e) => {
            relay.on_subscriber_leave(subscription.id());
            return Err(Error::Handshake(e.to_string()));
        }
    };

    let result = socket
        .get_ref()
        .set_read_timeout(Some(INBOUND_POLL))
        .map_err(Error::from)
        .and_then(|()| {
            relay.on_subscriber_join(&subscription);
            pump(&mut socket, &subscription, running)
        });

    relay.on_subscriber_leave(subscription.id());
    let _ = socket.close(None);
    let _ = socket.flush();

    match result {
        Err(Error::WebSocket(ref e)) if is_disconnect(e) => Ok(()),
        other => other,
    }
}

/// Move lines from the outbox to the socket until either side goes away
fn pump(
    socket: &mut WebSocket<TcpStream>,
    subscription: &Subscription,
    running: &AtomicBool,
) -> Result<()> {
    while running.load(Ordering::Relaxed) {
        match subscription.recv_timeout(OUTBOX_POLL) {
            Ok(line) => {
                socket.write(Message::Text(line.as_str().to_owned()))?;
                // Batch whatever else is already queued into one flush
                while let Ok(line) = subscription.try_recv() {
                    socket.write(Message::Text(line.as_str().to_owned()))?;
                }
                socket.flush()?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            // Removed from the registry
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        match socket.read() {
            Ok(Message::Close(_)) => {
                log::debug!("Subscriber {} sent close", subscription.peer());
                return Ok(());
            }
            // Pings are answered by tungstenite on the next flush; other
            // client messages carry no meaning for the relay
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Errors that just mean the peer went away
fn is_disconnect(error: &tungstenite::Error) -> bool {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => true,
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => true,
        tungstenite::Error::Io(e) => matches!(
            e.kind(),
            ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}
