//! Telemetry relay: framing, broadcast and WebSocket delivery

pub mod framing;
pub mod ingest;
pub mod registry;
pub mod relay;
pub mod server;

pub use framing::LineFramer;
pub use ingest::{IngestOptions, ingest_loop};
pub use registry::{Delivery, SubscriberId, SubscriberState};
pub use relay::{Relay, RelayStats, Subscription};
pub use server::SubscriberServer;
