//! Line framing for the serial byte stream
//!
//! Serial reads do not respect record boundaries: one read may carry half a
//! sentence, or several sentences at once. [`LineFramer`] accumulates bytes
//! and emits one [`TelemetryLine`] per `\n`-terminated record, with any `\r`
//! removed. Empty records are skipped.
//!
//! A record that grows past `max_line_length` without a terminator is
//! discarded up to the next `\n`, so a stream of garbage cannot grow the
//! buffer without bound.

use crate::core::TelemetryLine;

/// Reassembles newline-delimited records from arbitrary chunks
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_length: usize,
    /// Set while skipping the tail of an oversized record
    discarding: bool,
    discarded: u64,
}

impl LineFramer {
    /// Create a framer that accepts lines up to `max_line_length` bytes
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_line_length.min(4096)),
            max_line_length: max_line_length.max(1),
            discarding: false,
            discarded: 0,
        }
    }

    /// Feed a chunk, returning every line it completes (in order)
    pub fn push(&mut self, chunk: &[u8]) -> Vec<TelemetryLine> {
        let mut lines = Vec::new();

        for segment in chunk.split_inclusive(|b| *b == b'\n') {
            let terminated = segment.last() == Some(&b'\n');
            let body = if terminated {
                &segment[..segment.len() - 1]
            } else {
                segment
            };

            if self.discarding {
                if terminated {
                    self.discarding = false;
                }
                continue;
            }

            // A trailing '\r' belongs to the terminator, not the line
            let mut length = self.buffer.len() + body.len();
            if body.last().or(self.buffer.last()) == Some(&b'\r') {
                length -= 1;
            }

            if length > self.max_line_length {
                log::warn!("Discarding line longer than {} bytes", self.max_line_length);
                self.buffer.clear();
                self.discarded += 1;
                self.discarding = !terminated;
                continue;
            }

            self.buffer.extend_from_slice(body);
            if terminated && let Some(line) = self.take_line() {
                lines.push(line);
            }
        }

        lines
    }

    /// Emit the pending partial line, if any
    ///
    /// Called when the source goes idle so that devices which never send a
    /// terminator still have each burst forwarded as one line.
    pub fn flush(&mut self) -> Option<TelemetryLine> {
        if self.discarding {
            self.discarding = false;
            return None;
        }
        self.take_line()
    }

    /// Bytes buffered for the current, unterminated line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Number of oversized lines discarded so far
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn take_line(&mut self) -> Option<TelemetryLine> {
        let line = TelemetryLine::from_bytes(&self.buffer);
        self.buffer.clear();
        (!line.is_empty()).then_some(line)
    }
}
