//! Cascade module - remove, compact, refill and re-check
//!
//! The cascade is a small state machine:
//!
//! ```text
//! Idle -> Removing -> Compacting -> Refilling -> Settling -> Idle
//! ```
//!
//! The caller marks the matched cards removed and applies scoring, then calls
//! [`CascadeResolver::start`]. Each call to [`CascadeResolver::advance`] spends
//! elapsed time on the phase windows of [`CascadePacing`]; when a window runs
//! out the next phase executes. Settling ends the cycle with a
//! [`CascadeSignal`]: either more matches (the caller scores them and starts
//! again) or a stable grid.
//!
//! With [`CascadePacing::immediate`] every window is zero and one `advance(0)`
//! runs the whole cycle synchronously.

use rand::Rng;

use crate::card::{Card, CardFactory, SpawnRules};
use crate::grid::Grid;
use crate::matcher::{find_matches, has_possible_move, MatchGroup};
use crate::types::{CardState, Position, DROP_PHASE_MS, REMOVE_PHASE_MS, SETTLE_PHASE_MS, TILE_SIZE};

/// Cascade phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CascadePhase {
    #[default]
    Idle,
    Removing,
    Compacting,
    Refilling,
    Settling,
}

impl CascadePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadePhase::Idle => "idle",
            CascadePhase::Removing => "removing",
            CascadePhase::Compacting => "compacting",
            CascadePhase::Refilling => "refilling",
            CascadePhase::Settling => "settling",
        }
    }
}

/// Presentation windows between cascade phases, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadePacing {
    /// Removal animation before compaction.
    pub remove_ms: u32,
    /// Drop-in animation after refill.
    pub drop_ms: u32,
    /// Pause before the follow-up match check.
    pub settle_ms: u32,
}

impl Default for CascadePacing {
    fn default() -> Self {
        Self {
            remove_ms: REMOVE_PHASE_MS,
            drop_ms: DROP_PHASE_MS,
            settle_ms: SETTLE_PHASE_MS,
        }
    }
}

impl CascadePacing {
    /// No presentation windows: cascades resolve inside the triggering call.
    pub const fn immediate() -> Self {
        Self {
            remove_ms: 0,
            drop_ms: 0,
            settle_ms: 0,
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.remove_ms == 0 && self.drop_ms == 0 && self.settle_ms == 0
    }
}

/// Mark every live card in `groups` removed and append a copy of it to
/// `removed`. Cards shared by two groups are removed once.
///
/// Returns the number of cards newly removed.
pub fn mark_removed(grid: &mut Grid, groups: &[MatchGroup], now_ms: u64, removed: &mut Vec<Card>) -> usize {
    let mut count = 0;
    for pos in groups.iter().flat_map(|group| group.cells.iter().copied()) {
        let Some(card) = grid.get_mut(pos) else {
            continue;
        };
        if !card.is_live() {
            continue;
        }
        card.state = CardState::Removed;
        card.is_hinted = false;
        card.removed_ms = Some(now_ms);
        removed.push(card.clone());
        count += 1;
    }
    count
}

/// Apply gravity: per column, live cards slide down over removed cards and
/// empty slots, keeping their relative order. Removed cards leave the grid.
///
/// Returns the number of vacated slots (all at the top of their columns).
pub fn compact(grid: &mut Grid) -> usize {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut survivors: Vec<Card> = Vec::with_capacity(rows as usize);
    let mut vacated = 0;

    for col in 0..cols {
        // Bottom-up, so survivors[0] is the lowest card.
        for row in (0..rows).rev() {
            if let Some(card) = grid.take(Position::new(row, col)) {
                if card.is_live() {
                    survivors.push(card);
                }
            }
        }

        let mut row = rows;
        for card in survivors.drain(..) {
            row -= 1;
            grid.place_at(Position::new(row, col), card);
        }
        vacated += row as usize;
    }

    vacated
}

/// Fill every empty slot with a new card flagged as entering. Entering cards
/// are stacked above the grid so they can be animated falling into place.
///
/// Returns the number of cards created.
pub fn refill<R: Rng + ?Sized>(
    grid: &mut Grid,
    factory: &mut CardFactory,
    rules: SpawnRules,
    rng: &mut R,
    now_ms: u64,
) -> usize {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut created = 0;

    for col in 0..cols {
        let gap = (0..rows)
            .filter(|&row| grid.get(Position::new(row, col)).is_none())
            .count() as i32;

        for row in 0..rows {
            let pos = Position::new(row, col);
            if grid.get(pos).is_some() {
                continue;
            }
            grid.place(factory.create(pos, rules, rng, now_ms, true));
            if let Some(card) = grid.get_mut(pos) {
                card.top = (row as i32 - gap) * TILE_SIZE;
            }
            created += 1;
        }
    }

    created
}

/// Clear entering flags and snap every card to its layout position.
pub fn settle(grid: &mut Grid) {
    for card in grid.cards_mut() {
        card.is_entering = false;
        card.relayout();
    }
}

/// Everything a cascade step needs from its owner.
pub struct CascadeContext<'a, R: ?Sized> {
    pub grid: &'a mut Grid,
    pub factory: &'a mut CardFactory,
    pub rng: &'a mut R,
    pub rules: SpawnRules,
    pub min_match: u8,
    pub now_ms: u64,
}

/// How a cascade cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeSignal {
    /// The refilled grid matched again; score these and restart.
    Matches(Vec<MatchGroup>),
    /// No matches remain. `has_move` is false when no swap can match.
    Stable { has_move: bool },
}

/// Drives one cascade at a time through its phases.
#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    phase: CascadePhase,
    timer_ms: u32,
    pacing: CascadePacing,
}

impl CascadeResolver {
    pub fn new(pacing: CascadePacing) -> Self {
        Self {
            phase: CascadePhase::Idle,
            timer_ms: 0,
            pacing,
        }
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    pub fn pacing(&self) -> CascadePacing {
        self.pacing
    }

    /// Milliseconds left in the current phase window.
    pub fn timer_ms(&self) -> u32 {
        self.timer_ms
    }

    pub fn is_active(&self) -> bool {
        self.phase != CascadePhase::Idle
    }

    /// Begin a cycle. Matched cards must already be marked removed.
    pub fn start(&mut self) {
        self.enter(CascadePhase::Removing, self.pacing.remove_ms);
    }

    /// Skip straight to the settle check, for grids changed outside a cascade.
    pub fn recheck(&mut self) {
        self.enter(CascadePhase::Settling, self.pacing.settle_ms);
    }

    /// Abandon the current cycle.
    pub fn reset(&mut self) {
        self.enter(CascadePhase::Idle, 0);
    }

    fn enter(&mut self, phase: CascadePhase, timer_ms: u32) {
        self.phase = phase;
        self.timer_ms = timer_ms;
    }

    /// Spend `elapsed_ms` on the phase windows, running every phase whose
    /// window has closed. Returns a signal when the cycle reaches its end.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        elapsed_ms: u32,
        ctx: &mut CascadeContext<'_, R>,
    ) -> Option<CascadeSignal> {
        let mut budget = elapsed_ms;

        loop {
            if self.phase == CascadePhase::Idle {
                return None;
            }

            let spent = budget.min(self.timer_ms);
            self.timer_ms -= spent;
            budget -= spent;
            if self.timer_ms > 0 {
                return None;
            }

            match self.phase {
                CascadePhase::Idle => return None,
                CascadePhase::Removing => {
                    compact(ctx.grid);
                    self.enter(CascadePhase::Compacting, 0);
                }
                CascadePhase::Compacting => {
                    refill(ctx.grid, ctx.factory, ctx.rules, ctx.rng, ctx.now_ms);
                    self.enter(CascadePhase::Refilling, self.pacing.drop_ms);
                }
                CascadePhase::Refilling => {
                    settle(ctx.grid);
                    self.enter(CascadePhase::Settling, self.pacing.settle_ms);
                }
                CascadePhase::Settling => {
                    self.reset();
                    let groups = find_matches(ctx.grid, ctx.min_match);
                    if !groups.is_empty() {
                        return Some(CascadeSignal::Matches(groups));
                    }
                    let has_move = has_possible_move(ctx.grid, ctx.min_match);
                    return Some(CascadeSignal::Stable { has_move });
                }
            }
        }
    }
}
