//! Live-view client for the telemetry relay
//!
//! - [`RecentLines`]: bounded newest-first scrollback
//! - [`LiveView`]: display state with a "hold last good fix" policy
//! - [`FeedClient`]: blocking WebSocket connection that feeds a [`LiveView`]

pub mod feed;
pub mod recent;
pub mod view;

pub use feed::{FeedClient, FeedEvent};
pub use recent::{RECENT_LINES_CAPACITY, RecentLines};
pub use view::{CONNECTION_ERROR_MESSAGE, ChannelState, LiveView};
