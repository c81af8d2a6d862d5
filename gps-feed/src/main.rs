//! gps-feed - serial GPS telemetry relay
//!
//! ## Threads
//!
//! - **serial-ingest**: reads the receiver, frames lines, feeds the relay
//! - **main**: WebSocket accept loop
//! - **subscriber-<addr>**: one per connected live view
//!
//! If the serial port cannot be opened, or fails later, the failure is
//! logged and the WebSocket side keeps running without data until restart.

use clap::Parser;
use gps_feed::config::Config;
use gps_feed::error::{Error, Result};
use gps_feed::streaming::{IngestOptions, Relay, SubscriberServer, ingest_loop};
use gps_feed::transport::{SerialTransport, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Serial port path, overrides the config file
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate, overrides the config file
    #[arg(short, long)]
    baud: Option<u32>,

    /// WebSocket bind address, overrides the config file
    #[arg(long)]
    bind: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.serial.baud_rate = baud;
    }
    if let Some(bind) = &args.bind {
        config.relay.bind_address = bind.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("gps-feed v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        log::info!("Using config: {}", path);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let relay = Arc::new(Relay::new(config.relay.subscriber_queue));

    let ingest_handle = match SerialTransport::open(
        &config.serial.port,
        config.serial.baud_rate,
        config.serial.read_timeout(),
    ) {
        Ok(transport) => {
            let source: Box<dyn Transport> = Box::new(transport);
            let ingest_relay = Arc::clone(&relay);
            let ingest_running = Arc::clone(&running);
            let options = IngestOptions {
                max_line_length: config.relay.max_line_length,
                flush_partial_lines: config.relay.flush_partial_lines,
            };
            let handle = thread::Builder::new()
                .name("serial-ingest".to_string())
                .spawn(move || ingest_loop(source, ingest_relay, ingest_running, options))
                .map_err(|e| Error::Other(format!("Failed to spawn ingest thread: {}", e)))?;
            Some(handle)
        }
        Err(e) => {
            relay.on_source_error(&e);
            None
        }
    };

    let server = SubscriberServer::bind(
        &config.relay.bind_address,
        Arc::clone(&relay),
        Arc::clone(&running),
    )?;
    log::info!("gps-feed running. Press Ctrl-C to stop.");
    server.run()?;

    // Shutdown
    log::info!("Shutting down...");
    running.store(false, Ordering::Relaxed);
    if let Some(handle) = ingest_handle
        && handle.join().is_err()
    {
        log::error!("Ingest thread panicked");
    }

    let stats = relay.stats();
    log::info!(
        "gps-feed stopped ({} lines, {} deliveries, {} dropped, {} skipped)",
        stats.lines,
        stats.delivered,
        stats.dropped,
        stats.skipped
    );
    Ok(())
}
