//! Core data types shared by the relay and the live-view client.
//!
//! - [`types::TelemetryLine`]: one inbound device record

pub mod types;

pub use types::TelemetryLine;
