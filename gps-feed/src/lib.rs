//! GPS feed relay
//!
//! Reads positioning sentences from a serial receiver and fans every line
//! out, unmodified and in order, to all connected WebSocket subscribers.
//!
//! ## Modules
//!
//! - [`decoder`]: line → coordinate (NMEA GGA or raw `x,y,z` triplet)
//! - [`transport`]: serial byte source (and a mock for tests)
//! - [`streaming`]: line framing, subscriber registry, relay, WebSocket server
//! - [`client`]: live-view state and a blocking feed client

pub mod client;
pub mod config;
pub mod core;
pub mod decoder;
pub mod error;
pub mod streaming;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use crate::core::TelemetryLine;
pub use decoder::{Coordinate, Decoded, Fix, classify, decode};
pub use error::{Error, Result};
pub use streaming::{Relay, SubscriberServer};
