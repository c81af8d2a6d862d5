//! Ingest loop: serial source → line framing → relay
//!
//! Runs on its own thread for the life of the source. Every complete line is
//! handed to [`Relay::on_line`] before the next read, so lines reach the
//! relay strictly in source order.
//!
//! A read error ends the loop: it is reported through
//! [`Relay::on_source_error`] and the source is not reopened.

use crate::streaming::framing::LineFramer;
use crate::streaming::relay::Relay;
use crate::transport::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Read buffer size; comfortably above one NMEA sentence (82 bytes)
const READ_BUFFER_SIZE: usize = 512;

/// Back-off when a read returns immediately with no data
const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Log throughput every this many lines
const PROGRESS_INTERVAL: u64 = 1000;

/// Ingest settings
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Longest accepted line in bytes
    pub max_line_length: usize,
    /// Forward a pending unterminated line when the source goes idle
    pub flush_partial_lines: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_line_length: 1024,
            flush_partial_lines: true,
        }
    }
}

/// Read from `source` until shutdown or failure, relaying each line
///
/// Returns the number of lines relayed.
pub fn ingest_loop(
    mut source: Box<dyn Transport>,
    relay: Arc<Relay>,
    running: Arc<AtomicBool>,
    options: IngestOptions,
) -> u64 {
    let mut framer = LineFramer::new(options.max_line_length);
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut line_count = 0u64;

    log::info!("Ingesting telemetry from {}", source.describe());

    while running.load(Ordering::Relaxed) {
        match source.read(&mut buffer) {
            Ok(0) => {
                if options.flush_partial_lines
                    && let Some(line) = framer.flush()
                {
                    relay.on_line(&line);
                    line_count += 1;
                }
                thread::sleep(IDLE_SLEEP);
            }
            Ok(n) => {
                for line in framer.push(&buffer[..n]) {
                    relay.on_line(&line);
                    line_count += 1;
                    if line_count % PROGRESS_INTERVAL == 0 {
                        log::debug!(
                            "Relayed {} lines ({} open subscribers)",
                            line_count,
                            relay.open_subscribers()
                        );
                    }
                }
            }
            Err(e) => {
                relay.on_source_error(&e);
                break;
            }
        }
    }

    log::info!(
        "Ingest loop exiting ({} lines relayed, {} oversized lines discarded)",
        line_count,
        framer.discarded()
    );
    line_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;
    use std::net::SocketAddr;

    fn run_until_failure(mock: &MockTransport, relay: &Arc<Relay>, options: IngestOptions) -> u64 {
        mock.fail_with(Error::SourceClosed);
        ingest_loop(
            Box::new(mock.clone()),
            Arc::clone(relay),
            Arc::new(AtomicBool::new(true)),
            options,
        )
    }

    #[test]
    fn test_lines_relayed_in_order() {
        let relay = Arc::new(Relay::new(64));
        let sub = relay.connect(SocketAddr::from(([127, 0, 0, 1], 1)));
        relay.on_subscriber_join(&sub);

        let mock = MockTransport::new();
        mock.inject(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,\r\n");
        mock.inject(b"10.5, -3.2, 7.0\r\n1,2");
        mock.inject(b",3\r\n");

        let count = run_until_failure(&mock, &relay, IngestOptions::default());
        assert_eq!(count, 3);

        let received: Vec<String> = std::iter::from_fn(|| sub.try_recv().ok())
            .map(|l| l.to_string())
            .collect();
        assert_eq!(
            received,
            vec![
                "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
                "10.5, -3.2, 7.0",
                "1,2,3",
            ]
        );
    }

    #[test]
    fn test_source_failure_reported() {
        let relay = Arc::new(Relay::new(4));
        let mock = MockTransport::new();
        mock.inject(b"1,2,3\n");

        run_until_failure(&mock, &relay, IngestOptions::default());

        assert!(relay.source_failed());
        assert_eq!(relay.stats().lines, 1);
        assert_eq!(mock.pending(), 0);
    }

    #[test]
    fn test_unterminated_chunk_flushed_when_idle() {
        let relay = Arc::new(Relay::new(4));
        let sub = relay.connect(SocketAddr::from(([127, 0, 0, 1], 1)));
        relay.on_subscriber_join(&sub);

        let mock = MockTransport::new();
        mock.inject(b"4.0,5.0,6.0");
        // An empty chunk reads as an idle source
        mock.inject(b"");
        mock.inject(b"7.0,8.0,9.0");

        let count = run_until_failure(&mock, &relay, IngestOptions::default());
        assert_eq!(count, 1);
        assert_eq!(sub.try_recv().unwrap().as_str(), "4.0,5.0,6.0");
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn test_partial_lines_held_without_idle_flush() {
        let relay = Arc::new(Relay::new(4));
        let mock = MockTransport::new();
        mock.inject(b"4.0,5.0,6.0");
        mock.inject(b"");

        let options = IngestOptions {
            flush_partial_lines: false,
            ..IngestOptions::default()
        };
        assert_eq!(run_until_failure(&mock, &relay, options), 0);
    }

    #[test]
    fn test_stops_when_not_running() {
        let relay = Arc::new(Relay::new(4));
        let mock = MockTransport::new();
        mock.inject(b"1,2,3\n");

        let count = ingest_loop(
            Box::new(mock.clone()),
            relay.clone(),
            Arc::new(AtomicBool::new(false)),
            IngestOptions::default(),
        );
        assert_eq!(count, 0);
        assert_eq!(mock.pending(), 1);
        assert!(!relay.source_failed());
    }
}
