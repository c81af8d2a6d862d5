//! Live-view display state
//!
//! Every received line goes into the scrollback. The displayed position only
//! changes when a line decodes to a complete fix; partial or unrecognized
//! lines leave the previous fix on screen.

use crate::client::recent::RecentLines;
use crate::core::TelemetryLine;
use crate::decoder::{self, Fix};
use std::fmt;

/// Message shown when the feed cannot be reached
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Cannot reach the GPS feed: the relay may not be running or its port may be unreachable";

/// Connection state of the live-view channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    /// Connection failed; carries the underlying cause for diagnostics
    Error(String),
    Closed,
}

impl ChannelState {
    /// Status text for the display
    pub fn status_text(&self) -> &'static str {
        match self {
            ChannelState::Connecting => "Connecting to GPS feed...",
            ChannelState::Open => "Connected",
            ChannelState::Error(_) => CONNECTION_ERROR_MESSAGE,
            ChannelState::Closed => "Disconnected",
        }
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Error(_) => "error",
            ChannelState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What the live view currently shows
#[derive(Debug, Clone)]
pub struct LiveView {
    recent: RecentLines,
    fix: Option<Fix>,
    state: ChannelState,
    lines_received: u64,
    fixes_accepted: u64,
}

impl LiveView {
    pub fn new() -> Self {
        Self::with_recent(RecentLines::new())
    }

    pub fn with_recent(recent: RecentLines) -> Self {
        Self {
            recent,
            fix: None,
            state: ChannelState::Connecting,
            lines_received: 0,
            fixes_accepted: 0,
        }
    }

    /// Handle one received line
    ///
    /// Returns true if the displayed fix changed to this line's position.
    pub fn on_line(&mut self, line: TelemetryLine) -> bool {
        let coordinate = decoder::decode(line.as_str());
        self.recent.push(line);
        self.lines_received += 1;

        match coordinate.fix() {
            Some(fix) => {
                self.fix = Some(fix);
                self.fixes_accepted += 1;
                true
            }
            None => false,
        }
    }

    pub fn set_state(&mut self, state: ChannelState) {
        self.state = state;
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Last complete fix received, if any
    pub fn fix(&self) -> Option<Fix> {
        self.fix
    }

    pub fn recent(&self) -> &RecentLines {
        &self.recent
    }

    pub fn lines_received(&self) -> u64 {
        self.lines_received
    }

    pub fn fixes_accepted(&self) -> u64 {
        self.fixes_accepted
    }
}

impl Default for LiveView {
    fn default() -> Self {
        Self::new()
    }
}
