//! Terminal rendering for the match-3 board.
//!
//! Rendering is split in two:
//!
//! - [`BoardView`] paints a [`Session`](crate::core::Session) into a
//!   [`Canvas`] of styled cells. Pure, no I/O, unit-testable.
//! - [`TerminalRenderer`] flushes a canvas to the terminal with crossterm,
//!   redrawing only the runs that changed since the last frame.

pub mod board_view;
pub mod canvas;
pub mod renderer;

pub use tui_match3_core as core;
pub use tui_match3_types as types;

pub use board_view::{BoardView, Viewport};
pub use canvas::{Canvas, Glyph, Rgb, Style};
pub use renderer::{encode_changes_into, encode_frame_into, TerminalRenderer};
