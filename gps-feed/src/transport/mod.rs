//! Transport layer for the telemetry byte source

use crate::error::Result;

mod mock;
mod serial;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Byte source the relay ingests telemetry from
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// `Ok(0)` means no data arrived within the transport's timeout; the
    /// source is idle, not closed. End of stream and device failures are
    /// reported as errors.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Human-readable name of the source for log messages
    fn describe(&self) -> String;
}
