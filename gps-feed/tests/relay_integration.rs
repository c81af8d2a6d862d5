//! End-to-end tests: relay → WebSocket server → subscribers over loopback.

use gps_feed::client::{ChannelState, FeedClient, FeedEvent, LiveView};
use gps_feed::streaming::{IngestOptions, Relay, SubscriberServer, ingest_loop};
use gps_feed::transport::MockTransport;
use gps_feed::{Error, TelemetryLine};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Client = WebSocket<MaybeTlsStream<TcpStream>>;

const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";

struct Harness {
    relay: Arc<Relay>,
    running: Arc<AtomicBool>,
    addr: SocketAddr,
    server: Option<JoinHandle<()>>,
}

impl Harness {
    fn start() -> Self {
        let relay = Arc::new(Relay::new(64));
        let running = Arc::new(AtomicBool::new(true));
        let server =
            SubscriberServer::bind("127.0.0.1:0", Arc::clone(&relay), Arc::clone(&running))
                .expect("bind subscriber server");
        let addr = server.local_addr().unwrap();
        let handle = thread::spawn(move || {
            server.run().expect("server run");
        });

        Self {
            relay,
            running,
            addr,
            server: Some(handle),
        }
    }

    fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    fn connect(&self) -> Client {
        let (mut socket, _) = tungstenite::connect(self.url()).expect("connect to relay");
        if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        }
        socket
    }

    fn wait_for_open(&self, count: usize) {
        wait_until(|| self.relay.open_subscribers() == count);
    }

    fn send(&self, line: &str) {
        self.relay.on_line(&TelemetryLine::new(line));
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.server.take() {
            let _ = handle.join();
        }
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for condition");
        thread::sleep(Duration::from_millis(10));
    }
}

fn read_text(socket: &mut Client) -> String {
    loop {
        match socket.read().expect("read from relay") {
            Message::Text(text) => return text.to_string(),
            Message::Close(_) => panic!("relay closed the channel"),
            _ => {}
        }
    }
}

#[test]
fn test_lines_reach_all_subscribers_in_order() {
    let harness = Harness::start();
    let mut a = harness.connect();
    let mut b = harness.connect();
    harness.wait_for_open(2);

    let mut sent = vec![GGA.to_string()];
    sent.extend((0..20).map(|i| format!("{i}.5, -{i}.25, 7.0")));
    for line in &sent {
        harness.send(line);
    }

    for socket in [&mut a, &mut b] {
        let received: Vec<String> = (0..sent.len()).map(|_| read_text(socket)).collect();
        assert_eq!(received, sent);
    }
}

#[test]
fn test_closed_subscriber_does_not_disrupt_others() {
    let harness = Harness::start();
    let mut leaving = harness.connect();
    let abrupt = harness.connect();
    let mut staying = harness.connect();
    harness.wait_for_open(3);

    leaving.close(None).unwrap();
    let _ = leaving.flush();
    drop(leaving);
    // No close handshake at all
    drop(abrupt);

    wait_until(|| harness.relay.subscriber_count() == 1);

    harness.send("1,2,3");
    harness.send("4,5,6");
    assert_eq!(read_text(&mut staying), "1,2,3");
    assert_eq!(read_text(&mut staying), "4,5,6");
}

#[test]
fn test_late_joiner_sees_only_new_lines() {
    let harness = Harness::start();
    let mut early = harness.connect();
    harness.wait_for_open(1);

    harness.send("1,1,1");
    assert_eq!(read_text(&mut early), "1,1,1");

    let mut late = harness.connect();
    harness.wait_for_open(2);
    harness.send("2,2,2");

    assert_eq!(read_text(&mut late), "2,2,2");
    assert_eq!(read_text(&mut early), "2,2,2");
}

#[test]
fn test_serial_chunks_relayed_as_lines() {
    let harness = Harness::start();
    let mut subscriber = harness.connect();
    harness.wait_for_open(1);

    // Queued up front so an idle read cannot flush the first half early
    let mock = MockTransport::new();
    mock.inject(b"$GPGGA,123519,4807.038,N,0113");
    mock.inject(b"1.000,E,1,08,0.9,545.4,M,46.9,M,,\r\n10.5, -3.2, 7.0\r\n");
    mock.fail_with(Error::SourceClosed);

    let ingest = {
        let relay = Arc::clone(&harness.relay);
        let running = Arc::clone(&harness.running);
        let source = Box::new(mock.clone());
        thread::spawn(move || ingest_loop(source, relay, running, IngestOptions::default()))
    };

    assert_eq!(read_text(&mut subscriber), GGA);
    assert_eq!(read_text(&mut subscriber), "10.5, -3.2, 7.0");

    assert_eq!(ingest.join().unwrap(), 2);
    assert!(harness.relay.source_failed());

    // Subscribers stay connected after the source fails
    assert_eq!(harness.relay.open_subscribers(), 1);
}

#[test]
fn test_feed_client_holds_last_good_fix() {
    let harness = Harness::start();
    let stop = Arc::new(AtomicBool::new(true));

    let client_thread = {
        let client = FeedClient::with_shutdown(harness.url(), Arc::clone(&stop));
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut view = LiveView::new();
            let mut states = Vec::new();
            let result = client.run(&mut view, |view, event| match event {
                FeedEvent::StateChanged => states.push(view.state().clone()),
                FeedEvent::Line { .. } => {
                    if view.lines_received() == 3 {
                        stop.store(false, Ordering::Relaxed);
                    }
                }
            });
            (result.is_ok(), view, states)
        })
    };

    harness.wait_for_open(1);
    harness.send(GGA);
    harness.send("$GPGGA,123520,4807.100,N,01131.100,E,1,08,0.9,,M,46.9,M,,");
    harness.send("garbage line");

    let (ok, view, states) = client_thread.join().unwrap();
    assert!(ok);
    assert_eq!(
        states,
        vec![
            ChannelState::Connecting,
            ChannelState::Open,
            ChannelState::Closed
        ]
    );

    let fix = view.fix().expect("fix from the complete GGA sentence");
    assert!((fix.x - 11.516_666).abs() < 1e-4);
    assert!((fix.y - 48.1173).abs() < 1e-4);
    assert_eq!(fix.z, 545.4);

    let recent: Vec<String> = view.recent().iter().map(|l| l.to_string()).collect();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0], "garbage line");
    assert_eq!(recent[2], GGA);

    wait_until(|| harness.relay.subscriber_count() == 0);
}
