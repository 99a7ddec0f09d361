//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::PlayerAction`] and keeps
//! the grid cursor the keyboard moves around. Nothing here touches the
//! session; the binary feeds the resulting actions into it.

pub mod cursor;
pub mod map;

pub use tui_match3_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, should_quit};
