//! gps-view - terminal live view of the GPS feed
//!
//! Prints connection state changes, each new fix, and (with `--scrollback`)
//! the recent-lines buffer whenever the fix changes.

use clap::Parser;
use gps_feed::client::{FeedClient, FeedEvent, LiveView, RecentLines};
use gps_feed::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8089")]
    url: String,

    /// Number of recent lines to keep
    #[arg(short, long, default_value_t = gps_feed::client::RECENT_LINES_CAPACITY)]
    lines: usize,

    /// Print the recent-lines buffer after every fix update
    #[arg(short, long)]
    scrollback: bool,
}

fn print_event(view: &LiveView, event: FeedEvent, scrollback: bool) {
    match event {
        FeedEvent::StateChanged => {
            println!("[{}] {}", view.state(), view.state().status_text());
        }
        FeedEvent::Line { fix_updated: true } => {
            if let Some(fix) = view.fix() {
                println!("fix  x={:.6}  y={:.6}  z={:.2}", fix.x, fix.y, fix.z);
            }
            if scrollback {
                for line in view.recent().iter() {
                    println!("    {}", line);
                }
            }
        }
        FeedEvent::Line { fix_updated: false } => {
            if let Some(line) = view.recent().newest() {
                log::debug!("No complete fix in: {}", line);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let client = FeedClient::with_shutdown(args.url.clone(), running);
    let mut view = LiveView::with_recent(RecentLines::with_capacity(args.lines));
    println!("Feed {} (keeping {} recent lines)", client.url(), view.recent().capacity());

    client.run(&mut view, |view, event| print_event(view, event, args.scrollback))?;

    println!(
        "{} lines received, {} fixes displayed",
        view.lines_received(),
        view.fixes_accepted()
    );
    Ok(())
}
