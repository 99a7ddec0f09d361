//! Host bridge - connects a running session to whatever embeds it
//!
//! The engine never blocks on the host. Finished level attempts leave the game
//! thread as [`ResultRecord`]s and host commands arrive on a bounded channel
//! that the game loop drains once per tick.
//!
//! # Outbound
//!
//! - [`JsonLinesReporter`]: one JSON object per line into any `Write`
//! - [`ChannelReporter`]: hands records to a tokio task
//!
//! # Inbound
//!
//! [`HostCommand`] is a small tagged JSON message:
//!
//! ```text
//! {"type":"pause"}
//! {"type":"resume"}
//! {"type":"setVolume","volume":0.4}
//! ```
//!
//! # Environment Variables
//!
//! - `MATCH3_REPORT_PATH`: append result records to this file as JSON lines
//! - `MATCH3_REPORT_DISABLED`: "1" or "true" disables the bridge entirely
//! - `MATCH3_MAX_PENDING`: inbound command queue depth (default: 16)
//!
//! [`ResultRecord`]: tui_match3_core::ResultRecord

pub mod bridge;
pub mod command;
pub mod reporter;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use bridge::{write_records, BridgeConfig, HostBridge};
pub use command::HostCommand;
pub use reporter::{ChannelReporter, JsonLinesReporter};
