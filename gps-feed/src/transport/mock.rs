//! Mock transport for testing

use super::Transport;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// In-memory transport that replays injected chunks
///
/// Each injected chunk is returned by exactly one `read` call (split only if
/// the caller's buffer is smaller), so tests control chunk boundaries.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    chunks: VecDeque<Vec<u8>>,
    /// Failure to report once the queued chunks are drained
    failure: Option<Error>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                chunks: VecDeque::new(),
                failure: None,
            })),
        }
    }

    /// Queue a chunk to be returned by a future read
    pub fn inject(&self, chunk: &[u8]) {
        self.inner.lock().chunks.push_back(chunk.to_vec());
    }

    /// Fail every read after the queued chunks are consumed
    pub fn fail_with(&self, error: Error) {
        self.inner.lock().failure = Some(error);
    }

    /// Number of chunks not yet read
    pub fn pending(&self) -> usize {
        self.inner.lock().chunks.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();

        let Some(mut chunk) = inner.chunks.pop_front() else {
            return match inner.failure.take() {
                Some(error) => {
                    // Keep failing on subsequent reads
                    inner.failure = Some(Error::SourceClosed);
                    Err(error)
                }
                None => Ok(0),
            };
        };

        let n = chunk.len().min(buffer.len());
        buffer[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            inner.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn describe(&self) -> String {
        "mock transport".to_string()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
