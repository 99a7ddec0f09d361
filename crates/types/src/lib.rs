//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, so they can be used
//! by the engine, the terminal frontend and the host bridge alike.
//!
//! # Grid Coordinates
//!
//! Positions are `(row, col)` with row 0 at the top. Cards fall towards
//! higher row indices during compaction.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frontend frame interval (~60 FPS) |
//! | `COUNTDOWN_STEP_MS` | 1000 | One countdown decrement |
//! | `REMOVE_PHASE_MS` | 300 | Removal animation window |
//! | `DROP_PHASE_MS` | 300 | Drop-in animation window |
//! | `SETTLE_PHASE_MS` | 200 | Settle window before the re-check |
//! | `HINT_CLEAR_MS` | 1800 | How long a hint stays highlighted |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{LoseReason, PlayerAction, Position};
//!
//! assert_eq!(LoseReason::from_str("nomoves"), Some(LoseReason::NoMoves));
//! assert_eq!(PlayerAction::from_str("hint"), Some(PlayerAction::Hint));
//!
//! let a = Position::new(2, 3);
//! assert!(a.is_adjacent(Position::new(2, 4)));
//! assert!(!a.is_adjacent(Position::new(3, 4)));
//! ```

/// Frontend frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Countdown resolution: remaining time drops by one second per 1000ms ticked.
pub const COUNTDOWN_STEP_MS: u32 = 1000;

/// Pause between scoring a match and compacting the grid.
pub const REMOVE_PHASE_MS: u32 = 300;

/// Pause between refilling and settling (drop-in animation).
pub const DROP_PHASE_MS: u32 = 300;

/// Pause between settling and the follow-up match check.
pub const SETTLE_PHASE_MS: u32 = 200;

/// Hint highlight lifetime.
pub const HINT_CLEAR_MS: u32 = 1800;

/// Layout size of one grid cell in pixels.
pub const TILE_SIZE: i32 = 40;

/// Points awarded per matched card before multipliers.
pub const POINTS_PER_CARD: u32 = 10;

/// A trap-tainted match keeps this fraction of its points.
pub const TRAP_PENALTY: f64 = 0.5;

/// Smallest run length that counts as a match.
pub const MIN_MATCH_FLOOR: u8 = 3;

/// Upper bound for a level's trap probability.
pub const TRAP_RATE_MAX: f64 = 0.9;

/// Number of card artworks shipped with the default palette.
pub const DEFAULT_PALETTE_SIZE: usize = 24;

/// Default grid dimensions when a level does not provide them.
pub const DEFAULT_ROWS: u8 = 8;
pub const DEFAULT_COLS: u8 = 8;

/// Default number of distinct card kinds.
pub const DEFAULT_CARD_KINDS: u8 = 5;


/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True when `other` is one step away in the same row or column.
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr + dc == 1
    }
}

/// Card lifecycle state
///
/// - **Normal**: on the grid and clickable
/// - **Selected**: the single card awaiting a swap partner
/// - **Removed**: matched; terminal for this card identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardState {
    #[default]
    Normal,
    Selected,
    Removed,
}

/// Why a level attempt was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoseReason {
    /// Countdown reached zero below the target score.
    Time,
    /// Move budget reached zero below the target score.
    Moves,
    /// No swap on the grid can produce a match.
    NoMoves,
}

impl LoseReason {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "time" => Some(LoseReason::Time),
            "moves" => Some(LoseReason::Moves),
            "nomoves" => Some(LoseReason::NoMoves),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoseReason::Time => "time",
            LoseReason::Moves => "moves",
            LoseReason::NoMoves => "nomoves",
        }
    }
}

/// Terminal outcome of a level attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win,
    Lose,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Lose => "lose",
        }
    }
}

/// Audio cue emitted by the session while sound is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Select,
    Match,
    Win,
    Lose,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Select => "select",
            SoundCue::Match => "match",
            SoundCue::Win => "win",
            SoundCue::Lose => "lose",
        }
    }
}

/// Player-facing actions produced by input layers (keyboard, host, scripts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Move the cursor one cell up
    CursorUp,
    /// Move the cursor one cell down
    CursorDown,
    /// Move the cursor one cell left
    CursorLeft,
    /// Move the cursor one cell right
    CursorRight,
    /// Select (or swap with) the card under the cursor
    Select,
    /// Drop the current selection
    Deselect,
    /// Spend a shuffle power-up
    Shuffle,
    /// Spend a hint power-up
    Hint,
    /// Toggle pause state
    Pause,
    /// Replay the current level
    Retry,
    /// Advance to the next level (or replay the last one)
    NextLevel,
    /// Toggle sound on/off
    ToggleSound,
}

impl PlayerAction {
    /// Parse action from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::PlayerAction;
    ///
    /// assert_eq!(PlayerAction::from_str("cursorLeft"), Some(PlayerAction::CursorLeft));
    /// assert_eq!(PlayerAction::from_str("SHUFFLE"), Some(PlayerAction::Shuffle));
    /// assert_eq!(PlayerAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorup" => Some(PlayerAction::CursorUp),
            "cursordown" => Some(PlayerAction::CursorDown),
            "cursorleft" => Some(PlayerAction::CursorLeft),
            "cursorright" => Some(PlayerAction::CursorRight),
            "select" => Some(PlayerAction::Select),
            "deselect" => Some(PlayerAction::Deselect),
            "shuffle" => Some(PlayerAction::Shuffle),
            "hint" => Some(PlayerAction::Hint),
            "pause" => Some(PlayerAction::Pause),
            "retry" => Some(PlayerAction::Retry),
            "nextlevel" => Some(PlayerAction::NextLevel),
            "togglesound" => Some(PlayerAction::ToggleSound),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerAction::CursorUp => "cursorUp",
            PlayerAction::CursorDown => "cursorDown",
            PlayerAction::CursorLeft => "cursorLeft",
            PlayerAction::CursorRight => "cursorRight",
            PlayerAction::Select => "select",
            PlayerAction::Deselect => "deselect",
            PlayerAction::Shuffle => "shuffle",
            PlayerAction::Hint => "hint",
            PlayerAction::Pause => "pause",
            PlayerAction::Retry => "retry",
            PlayerAction::NextLevel => "nextLevel",
            PlayerAction::ToggleSound => "toggleSound",
        }
    }
}
