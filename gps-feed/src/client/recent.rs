//! Bounded scrollback of received lines

use crate::core::TelemetryLine;
use std::collections::VecDeque;

/// Number of lines kept for the scrollback display
pub const RECENT_LINES_CAPACITY: usize = 50;

/// The most recent lines, newest first
#[derive(Debug, Clone)]
pub struct RecentLines {
    lines: VecDeque<TelemetryLine>,
    capacity: usize,
}

impl RecentLines {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_LINES_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a line as the newest, evicting the oldest when full
    pub fn push(&mut self, line: TelemetryLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_back();
        }
        self.lines.push_front(line);
    }

    /// Lines from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &TelemetryLine> {
        self.lines.iter()
    }

    pub fn newest(&self) -> Option<&TelemetryLine> {
        self.lines.front()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentLines {
    fn default() -> Self {
        Self::new()
    }
}
