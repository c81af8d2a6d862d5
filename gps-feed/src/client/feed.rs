//! Blocking WebSocket client for the telemetry feed

use crate::client::view::{ChannelState, LiveView};
use crate::core::TelemetryLine;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tungstenite::Message;
use tungstenite::error::ProtocolError;
use tungstenite::stream::MaybeTlsStream;

/// Socket read timeout; bounds how long shutdown takes to notice
const READ_POLL: Duration = Duration::from_millis(100);

/// Notification passed to the display callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// The channel state changed; see [`LiveView::state`]
    StateChanged,
    /// A line was received; `fix_updated` is true if it moved the display
    Line { fix_updated: bool },
}

/// Connects to the relay and feeds received lines into a [`LiveView`]
pub struct FeedClient {
    url: String,
    running: Arc<AtomicBool>,
}

impl FeedClient {
    /// Client for a relay URL such as `ws://127.0.0.1:8089`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_shutdown(url, Arc::new(AtomicBool::new(true)))
    }

    /// Client that stops once `running` is cleared
    pub fn with_shutdown(url: impl Into<String>, running: Arc<AtomicBool>) -> Self {
        Self {
            url: url.into(),
            running,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and receive until the relay closes the channel or shutdown
    ///
    /// Every state transition and every line is reported to `on_event`
    /// after `view` has been updated. A connection or protocol failure
    /// leaves the view in [`ChannelState::Error`] and is returned.
    pub fn run<F>(&self, view: &mut LiveView, mut on_event: F) -> Result<()>
    where
        F: FnMut(&LiveView, FeedEvent),
    {
        transition(view, ChannelState::Connecting, &mut on_event);

        let (mut socket, _response) = match tungstenite::connect(self.url.as_str()) {
            Ok(connected) => connected,
            Err(e) => {
                log::warn!("Failed to connect to {}: {}", self.url, e);
                transition(view, ChannelState::Error(e.to_string()), &mut on_event);
                return Err(e.into());
            }
        };

        match socket.get_mut() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(READ_POLL))?,
            _ => log::debug!("Non-plain stream, shutdown waits for the next message"),
        }

        log::info!("Connected to {}", self.url);
        transition(view, ChannelState::Open, &mut on_event);

        let outcome = loop {
            if !self.running.load(Ordering::Relaxed) {
                let _ = socket.close(None);
                let _ = socket.flush();
                break Ok(());
            }

            match socket.read() {
                Ok(Message::Text(text)) => {
                    let fix_updated = view.on_line(TelemetryLine::new(&text));
                    on_event(&*view, FeedEvent::Line { fix_updated });
                }
                Ok(Message::Close(_)) => break Ok(()),
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(
                    tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake),
                ) => break Ok(()),
                Err(e) => break Err(Error::from(e)),
            }
        };

        match outcome {
            Ok(()) => {
                log::info!("Feed {} closed", self.url);
                transition(view, ChannelState::Closed, &mut on_event);
                Ok(())
            }
            Err(e) => {
                log::warn!("Feed {} failed: {}", self.url, e);
                transition(view, ChannelState::Error(e.to_string()), &mut on_event);
                Err(e)
            }
        }
    }
}

fn transition<F>(view: &mut LiveView, state: ChannelState, on_event: &mut F)
where
    F: FnMut(&LiveView, FeedEvent),
{
    view.set_state(state);
    on_event(&*view, FeedEvent::StateChanged);
}
