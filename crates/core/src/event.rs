//! Outcome events emitted by a [`Session`](crate::session::Session).
//!
//! Events queue up inside the session and are drained by the owner with
//! [`Session::drain_events`](crate::session::Session::drain_events).

use crate::scoring::ScoreBreakdown;
use crate::types::{LoseReason, Position, SoundCue};

/// Score change with its breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEvent {
    /// Running total across levels.
    pub total: u32,
    pub level_score: u32,
    pub target: u32,
    pub breakdown: ScoreBreakdown,
}

/// Snapshot taken when a level attempt ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub level_id: u32,
    pub level_index: usize,
    /// Total after rollback (losses) or including the level (wins).
    pub total: u32,
    pub level_score: u32,
    pub target: u32,
    pub moves_left: Option<u32>,
    pub time_left: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScoreChanged(ScoreEvent),
    LevelChanged {
        index: usize,
        level_id: u32,
        name: String,
    },
    Won(OutcomeSummary),
    Lost {
        reason: LoseReason,
        summary: OutcomeSummary,
    },
    /// A card was clicked and accepted as input.
    Clicked(Position),
    ShuffleUsed {
        remaining: u32,
    },
    HintUsed {
        remaining: u32,
        pair: (Position, Position),
    },
    Sound(SoundCue),
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::ScoreChanged(_) => "score",
            GameEvent::LevelChanged { .. } => "level",
            GameEvent::Won(_) => "win",
            GameEvent::Lost { .. } => "lose",
            GameEvent::Clicked(_) => "click",
            GameEvent::ShuffleUsed { .. } => "shuffle",
            GameEvent::HintUsed { .. } => "hint",
            GameEvent::Sound(_) => "sound",
        }
    }
}
