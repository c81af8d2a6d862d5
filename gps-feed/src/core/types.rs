//! Core data types for telemetry transport.

use std::fmt;
use std::sync::Arc;

/// One inbound device record, without its line terminator.
///
/// The text is shared, so cloning a line to hand it to every subscriber
/// copies a pointer rather than the bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TelemetryLine(Arc<str>);

impl TelemetryLine {
    /// Create a line from text, stripping any trailing `\r`/`\n`.
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text.trim_end_matches(['\r', '\n'])))
    }

    /// Create a line from raw device bytes.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the device is
    /// expected to emit ASCII but the relay does not police it.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(&String::from_utf8_lossy(bytes))
    }

    /// Line content
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a line with no content
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for TelemetryLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TelemetryLine {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for TelemetryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TelemetryLine").field(&&*self.0).finish()
    }
}

impl fmt::Display for TelemetryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
