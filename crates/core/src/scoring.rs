//! Scoring module - match points, combo multiplier and trap penalty
//!
//! For one resolved set of match groups:
//!
//! - base = cards matched (summed over groups) × [`POINTS_PER_CARD`]
//! - multiplier = `1 + streak × combo_bonus`
//! - a trap anywhere in the groups halves the points and resets the streak,
//!   otherwise the streak grows by one
//! - the result is rounded to the nearest integer once, at the end

use crate::grid::Grid;
use crate::matcher::{cards_matched, MatchGroup};
use crate::types::{POINTS_PER_CARD, TRAP_PENALTY};

/// Points awarded for one scoring event and how they were derived.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub gained: u32,
    pub base: u32,
    /// Streak the multiplier was computed from (before this match).
    pub combo: u32,
    pub multiplier: f64,
    pub contains_trap: bool,
}

/// True when any live card in `groups` carries the trap flag.
pub fn groups_contain_trap(grid: &Grid, groups: &[MatchGroup]) -> bool {
    groups
        .iter()
        .flat_map(|group| group.cells.iter())
        .filter_map(|&pos| grid.get(pos))
        .any(|card| card.is_live() && card.is_trap)
}

/// Score `cards` matched cards at the given streak.
pub fn score_cards(cards: usize, streak: u32, combo_bonus: f64, contains_trap: bool) -> ScoreBreakdown {
    let base = (cards as u32).saturating_mul(POINTS_PER_CARD);
    let multiplier = 1.0 + streak as f64 * combo_bonus.max(0.0);
    let mut points = base as f64 * multiplier;
    if contains_trap {
        points *= TRAP_PENALTY;
    }

    ScoreBreakdown {
        gained: points.round().clamp(0.0, u32::MAX as f64) as u32,
        base,
        combo: streak,
        multiplier,
        contains_trap,
    }
}

/// Score a set of match groups on `grid`. Call before the cards are marked
/// removed so trap flags are still visible.
pub fn score_match(grid: &Grid, groups: &[MatchGroup], streak: u32, combo_bonus: f64) -> ScoreBreakdown {
    score_cards(
        cards_matched(groups),
        streak,
        combo_bonus,
        groups_contain_trap(grid, groups),
    )
}

/// Streak after a scoring event.
pub fn next_streak(streak: u32, contains_trap: bool) -> u32 {
    if contains_trap {
        0
    } else {
        streak.saturating_add(1)
    }
}
