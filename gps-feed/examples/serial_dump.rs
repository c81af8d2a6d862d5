//! Serial line dumper
//!
//! Opens the receiver's serial port and prints every line it produces along
//! with how the decoder reads it. Useful for checking wiring and sentence
//! formats before starting the relay.
//!
//! Usage: `cargo run --example serial_dump -- /dev/ttyUSB0 115200`

use gps_feed::decoder::{Decoded, classify};
use gps_feed::streaming::LineFramer;
use gps_feed::transport::{SerialTransport, Transport};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let baud: u32 = match args.next() {
        Some(baud) => baud.parse()?,
        None => 115_200,
    };

    log::info!("Opening serial port {} at {} baud...", port, baud);
    let mut transport = SerialTransport::open(&port, baud, Duration::from_millis(100))?;
    log::info!("Capturing for 10 seconds");

    let start = Instant::now();
    let mut framer = LineFramer::new(1024);
    let mut buffer = [0u8; 512];
    let (mut valid, mut partial, mut unrecognized) = (0u32, 0u32, 0u32);

    while start.elapsed() < Duration::from_secs(10) {
        let n = transport.read(&mut buffer)?;
        for line in framer.push(&buffer[..n]) {
            match classify(line.as_str()) {
                Decoded::Valid(fix) => {
                    valid += 1;
                    println!("FIX   x={:.6} y={:.6} z={:.2}  {}", fix.x, fix.y, fix.z, line);
                }
                Decoded::Partial(coordinate) => {
                    partial += 1;
                    println!("PART  {:?}  {}", coordinate, line);
                }
                Decoded::Unrecognized => {
                    unrecognized += 1;
                    println!("----  {}", line);
                }
            }
        }
    }

    log::info!(
        "Done: {} fixes, {} partial, {} unrecognized, {} oversized discarded",
        valid,
        partial,
        unrecognized,
        framer.discarded()
    );
    Ok(())
}
