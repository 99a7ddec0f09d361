//! Session module - the player-facing game state machine
//!
//! A [`Session`] owns the grid, the cascade resolver, the timers and all score
//! state for one player. It is driven by two kinds of calls:
//!
//! - player operations ([`Session::select`], [`Session::use_shuffle`], ...)
//! - [`Session::tick`], the single logical clock, which advances the
//!   countdown, the hint timer and any paced cascade
//!
//! Everything observable leaves through [`Session::drain_events`] and the
//! optional [`ResultReporter`].

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::card::{Card, CardFactory, KindPalette, SpawnRules};
use crate::cascade::{
    compact, mark_removed, refill, settle, CascadeContext, CascadePhase, CascadeResolver, CascadeSignal,
};
use crate::clock::{Countdown, CountdownTick, OneShot};
use crate::event::{GameEvent, OutcomeSummary, ScoreEvent};
use crate::grid::Grid;
use crate::level::{GameConfig, LevelDefinition, ResolvedConfig};
use crate::matcher::{find_hint_pair, find_matches, has_possible_move, MatchGroup};
use crate::report::{ResultRecord, ResultReporter};
use crate::scoring::{next_streak, score_match};
use crate::types::{CardState, GameResult, LoseReason, PlayerAction, Position, SoundCue, HINT_CLEAR_MS};

/// Boards generated per level before giving up with a no-moves loss.
const MAX_BOARD_ATTEMPTS: u32 = 16;

/// Silent clean-up passes over a freshly generated board.
const MAX_SETUP_PASSES: u32 = 32;

/// Chained resolutions allowed in one cascade.
const MAX_CASCADE_CHAIN: u32 = 64;

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    Paused,
    GameOver(GameResult),
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Playing => "playing",
            SessionStatus::Paused => "paused",
            SessionStatus::GameOver(GameResult::Win) => "won",
            SessionStatus::GameOver(GameResult::Lose) => "lost",
        }
    }
}

/// One player's game.
pub struct Session {
    levels: Vec<LevelDefinition>,
    level_index: usize,
    palette: KindPalette,
    rules: SpawnRules,
    grid: Grid,
    factory: CardFactory,
    rng: SmallRng,
    cascade: CascadeResolver,
    /// Resolutions in the current cascade.
    chain: u32,
    countdown: Countdown,
    hint_timer: OneShot,
    hint_pair: Option<(Position, Position)>,
    selected: Option<Position>,
    total_score: u32,
    /// Total at the start of the current attempt; losses roll back to it.
    checkpoint: u32,
    level_score: u32,
    combo_streak: u32,
    moves_left: Option<u32>,
    shuffles_left: u32,
    hints_left: u32,
    paused: bool,
    outcome: Option<GameResult>,
    lose_reason: Option<LoseReason>,
    sound_enabled: bool,
    volume: f32,
    restore_volume: f32,
    clock_ms: u64,
    events: Vec<GameEvent>,
    removed: Vec<Card>,
    reporter: Option<Box<dyn ResultReporter + Send>>,
}

impl Session {
    /// Resolve `config` and start on its first level.
    pub fn new(config: GameConfig) -> Self {
        Self::from_resolved(config.resolve())
    }

    /// Start from an already resolved configuration. An empty level list
    /// falls back to the synthesized default level.
    pub fn from_resolved(config: ResolvedConfig) -> Self {
        let volume = if config.sound { 1.0 } else { 0.0 };
        let levels = if config.levels.is_empty() {
            warn!("resolved config has no levels, using the default level");
            GameConfig::default().resolve().levels
        } else {
            config.levels
        };
        let mut session = Self {
            levels,
            level_index: config.start_index,
            palette: config.palette,
            rules: SpawnRules {
                pool: 1,
                trap_rate: 0.0,
            },
            grid: Grid::new(0, 0),
            factory: CardFactory::new(),
            rng: SmallRng::seed_from_u64(config.seed),
            cascade: CascadeResolver::new(config.pacing),
            chain: 0,
            countdown: Countdown::default(),
            hint_timer: OneShot::default(),
            hint_pair: None,
            selected: None,
            total_score: 0,
            checkpoint: 0,
            level_score: 0,
            combo_streak: 0,
            moves_left: None,
            shuffles_left: 0,
            hints_left: 0,
            paused: false,
            outcome: None,
            lose_reason: None,
            sound_enabled: config.sound,
            volume,
            restore_volume: 1.0,
            clock_ms: 0,
            events: Vec::new(),
            removed: Vec::new(),
            reporter: None,
        };
        session.apply_level(config.start_index);
        session
    }

    pub fn with_reporter(mut self, reporter: impl ResultReporter + Send + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    pub fn set_reporter(&mut self, reporter: Box<dyn ResultReporter + Send>) {
        self.reporter = Some(reporter);
    }

    /// Replace the grid with a scripted one. Selection, hint and any cascade
    /// are dropped; score and timers are kept.
    pub fn load_grid(&mut self, grid: Grid) {
        if let Some(max) = grid.cards().map(|card| card.id).max() {
            self.factory.reserve_past(max);
        }
        self.grid = grid;
        self.selected = None;
        self.hint_pair = None;
        self.hint_timer.cancel();
        self.cascade.reset();
        self.chain = 0;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.levels[self.level_index]
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn palette(&self) -> &KindPalette {
        &self.palette
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn checkpoint(&self) -> u32 {
        self.checkpoint
    }

    pub fn level_score(&self) -> u32 {
        self.level_score
    }

    pub fn target_score(&self) -> u32 {
        self.level().target_score
    }

    pub fn combo_streak(&self) -> u32 {
        self.combo_streak
    }

    pub fn moves_left(&self) -> Option<u32> {
        self.moves_left
    }

    pub fn time_left(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    pub fn shuffles_left(&self) -> u32 {
        self.shuffles_left
    }

    pub fn hints_left(&self) -> u32 {
        self.hints_left
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn hint_pair(&self) -> Option<(Position, Position)> {
        self.hint_pair
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<GameResult> {
        self.outcome
    }

    pub fn lose_reason(&self) -> Option<LoseReason> {
        self.lose_reason
    }

    pub fn is_cascading(&self) -> bool {
        self.cascade.is_active()
    }

    pub fn cascade_phase(&self) -> CascadePhase {
        self.cascade.phase()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Logical time in milliseconds, as accumulated by [`Session::tick`].
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn status(&self) -> SessionStatus {
        match self.outcome {
            Some(result) => SessionStatus::GameOver(result),
            None if self.paused => SessionStatus::Paused,
            None => SessionStatus::Playing,
        }
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take the cards removed since the last call (for removal animations).
    pub fn take_removed(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.removed)
    }

    fn accepts_input(&self) -> bool {
        !self.paused && self.outcome.is_none() && !self.cascade.is_active()
    }

    // ------------------------------------------------------------------
    // Player operations
    // ------------------------------------------------------------------

    /// Click the card at `pos`.
    ///
    /// Ignored while paused, after game over, during a cascade, on empty or
    /// removed slots, and on the card that is already selected. Returns true
    /// when the click was accepted.
    pub fn select(&mut self, pos: Position) -> bool {
        if !self.accepts_input() || self.grid.kind_at(pos).is_none() || self.selected == Some(pos) {
            return false;
        }

        self.clear_hint();
        self.events.push(GameEvent::Clicked(pos));

        match self.selected {
            Some(current) if current.is_adjacent(pos) => self.swap_selected(current, pos),
            Some(current) => {
                self.set_card_state(current, CardState::Normal);
                self.mark_selected(pos);
            }
            None => self.mark_selected(pos),
        }
        true
    }

    /// Drop the current selection, if any.
    pub fn deselect(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.clear_selection();
        true
    }

    /// Spend a shuffle: permute the live cards and reset the combo.
    pub fn use_shuffle(&mut self) -> bool {
        if !self.accepts_input() || self.shuffles_left == 0 {
            return false;
        }

        self.shuffles_left -= 1;
        self.clear_selection();
        self.clear_hint();
        self.grid.shuffle(&mut self.rng);
        self.combo_streak = 0;
        self.events.push(GameEvent::ShuffleUsed {
            remaining: self.shuffles_left,
        });
        debug!("shuffle used, {} left", self.shuffles_left);

        let min_match = self.level().min_match;
        if !has_possible_move(&mut self.grid, min_match) {
            self.lose(LoseReason::NoMoves);
        }
        true
    }

    /// Spend a hint: highlight a matching swap for [`HINT_CLEAR_MS`].
    ///
    /// A grid without any matching swap ends the attempt instead; the hint is
    /// not spent in that case.
    pub fn use_hint(&mut self) -> bool {
        if !self.accepts_input() || self.hints_left == 0 {
            return false;
        }

        let min_match = self.level().min_match;
        let Some((a, b)) = find_hint_pair(&mut self.grid, min_match) else {
            self.lose(LoseReason::NoMoves);
            return true;
        };

        self.hints_left -= 1;
        self.clear_hint();
        for pos in [a, b] {
            if let Some(card) = self.grid.get_mut(pos) {
                card.is_hinted = true;
            }
        }
        self.hint_pair = Some((a, b));
        self.hint_timer.arm(HINT_CLEAR_MS);
        self.events.push(GameEvent::HintUsed {
            remaining: self.hints_left,
            pair: (a, b),
        });
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.paused || self.outcome.is_some() {
            return false;
        }
        self.paused = true;
        self.countdown.stop();
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        if self.outcome.is_none() {
            self.countdown.start();
        }
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Set the output volume, clamped to `0.0..=1.0`. Zero disables sound.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        self.volume = volume;
        self.sound_enabled = volume > 0.0;
        if volume > 0.0 {
            self.restore_volume = volume;
        }
    }

    /// Mute, or unmute at the last audible volume.
    pub fn toggle_sound(&mut self) {
        if self.sound_enabled {
            self.sound_enabled = false;
            self.volume = 0.0;
        } else {
            self.set_volume(self.restore_volume);
        }
    }

    /// Replay the current level. Points from the abandoned attempt are dropped.
    pub fn retry_level(&mut self) {
        self.total_score = self.checkpoint;
        self.apply_level(self.level_index);
    }

    /// Same as [`Session::retry_level`].
    pub fn restart(&mut self) {
        self.retry_level();
    }

    /// Advance to the next level, or replay the last one. The total is kept.
    pub fn next_level(&mut self) {
        let next = (self.level_index + 1).min(self.levels.len().saturating_sub(1));
        self.apply_level(next);
    }

    /// Apply a frontend action. Cursor movement belongs to the frontend and is
    /// ignored here; `cursor` names the cell a `Select` acts on.
    pub fn apply(&mut self, action: PlayerAction, cursor: Position) -> bool {
        match action {
            PlayerAction::Select => self.select(cursor),
            PlayerAction::Deselect => self.deselect(),
            PlayerAction::Shuffle => self.use_shuffle(),
            PlayerAction::Hint => self.use_hint(),
            PlayerAction::Pause => self.toggle_pause(),
            PlayerAction::Retry => {
                self.retry_level();
                true
            }
            PlayerAction::NextLevel => {
                self.next_level();
                true
            }
            PlayerAction::ToggleSound => {
                self.toggle_sound();
                true
            }
            PlayerAction::CursorUp
            | PlayerAction::CursorDown
            | PlayerAction::CursorLeft
            | PlayerAction::CursorRight => false,
        }
    }

    /// Advance the logical clock by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms as u64);

        if self.hint_timer.advance(elapsed_ms) {
            self.clear_hint();
        }

        if self.outcome.is_none() && !self.paused {
            if let CountdownTick::Expired = self.countdown.advance(elapsed_ms) {
                if self.level_score < self.level().target_score {
                    self.lose(LoseReason::Time);
                }
            }
        }

        // Cascades finish even while paused.
        self.pump_cascade(elapsed_ms);
    }

    // ------------------------------------------------------------------
    // Selection and matching
    // ------------------------------------------------------------------

    fn set_card_state(&mut self, pos: Position, state: CardState) {
        if let Some(card) = self.grid.get_mut(pos) {
            if card.is_live() {
                card.state = state;
            }
        }
    }

    fn mark_selected(&mut self, pos: Position) {
        self.set_card_state(pos, CardState::Selected);
        self.selected = Some(pos);
        self.cue(SoundCue::Select);
    }

    fn clear_selection(&mut self) {
        if let Some(pos) = self.selected.take() {
            self.set_card_state(pos, CardState::Normal);
        }
    }

    fn clear_hint(&mut self) {
        if let Some((a, b)) = self.hint_pair.take() {
            for pos in [a, b] {
                if let Some(card) = self.grid.get_mut(pos) {
                    card.is_hinted = false;
                }
            }
        }
        self.hint_timer.cancel();
    }

    /// Swap the selected card at `a` with `b`. The selection is released only
    /// once the swap is resolved, so a matched selected card goes straight to
    /// `Removed`.
    fn swap_selected(&mut self, a: Position, b: Position) {
        match self.moves_left {
            Some(0) => {
                self.clear_selection();
                self.check_moves_exhausted();
                return;
            }
            Some(moves) => self.moves_left = Some(moves - 1),
            None => {}
        }

        self.grid.swap(a, b);
        let groups = find_matches(&self.grid, self.level().min_match);
        if groups.is_empty() {
            self.grid.swap(a, b);
            self.clear_selection();
            self.combo_streak = 0;
            debug!("swap {:?} <-> {:?} made no match", a, b);
            self.check_moves_exhausted();
            return;
        }

        // The selected card now sits at `b`.
        self.selected = None;
        if !groups.iter().any(|group| group.contains(b)) {
            self.set_card_state(b, CardState::Normal);
        }
        self.chain = 0;
        self.resolve_matches(groups);
        self.pump_cascade(0);
    }

    /// Score `groups`, remove their cards, then either win or start a cascade.
    fn resolve_matches(&mut self, groups: Vec<MatchGroup>) {
        let (combo_bonus, target) = {
            let level = self.level();
            (level.combo_bonus, level.target_score)
        };

        let breakdown = score_match(&self.grid, &groups, self.combo_streak, combo_bonus);
        self.combo_streak = next_streak(self.combo_streak, breakdown.contains_trap);
        mark_removed(&mut self.grid, &groups, self.clock_ms, &mut self.removed);
        self.chain += 1;

        self.level_score = self.level_score.saturating_add(breakdown.gained);
        self.total_score = self.total_score.saturating_add(breakdown.gained);
        self.events.push(GameEvent::ScoreChanged(ScoreEvent {
            total: self.total_score,
            level_score: self.level_score,
            target,
            breakdown,
        }));
        self.cue(if breakdown.contains_trap {
            SoundCue::Lose
        } else {
            SoundCue::Match
        });

        if self.level_score >= target {
            self.cascade.reset();
            self.win();
            return;
        }
        self.cascade.start();
    }

    fn pump_cascade(&mut self, elapsed_ms: u32) {
        let mut budget = elapsed_ms;
        loop {
            let min_match = self.level().min_match;
            let mut ctx = CascadeContext {
                grid: &mut self.grid,
                factory: &mut self.factory,
                rng: &mut self.rng,
                rules: self.rules,
                min_match,
                now_ms: self.clock_ms,
            };
            let signal = self.cascade.advance(budget, &mut ctx);
            budget = 0;

            match signal {
                None => return,
                Some(_) if self.outcome.is_some() => {
                    self.cascade.reset();
                    return;
                }
                Some(CascadeSignal::Matches(groups)) => {
                    if self.chain >= MAX_CASCADE_CHAIN {
                        // `groups` stay on the board unscored as live runs.
                        warn!("cascade stopped after {} chained matches", self.chain);
                        self.cascade.reset();
                        let has_move = has_possible_move(&mut self.grid, min_match);
                        self.cascade_settled(has_move);
                        return;
                    }
                    self.resolve_matches(groups);
                }
                Some(CascadeSignal::Stable { has_move }) => {
                    self.cascade_settled(has_move);
                    return;
                }
            }
        }
    }

    fn cascade_settled(&mut self, has_move: bool) {
        self.chain = 0;
        if has_move {
            self.check_moves_exhausted();
        } else {
            self.lose(LoseReason::NoMoves);
        }
    }

    fn check_moves_exhausted(&mut self) {
        if self.outcome.is_none()
            && self.moves_left == Some(0)
            && self.level_score < self.level().target_score
        {
            self.lose(LoseReason::Moves);
        }
    }

    // ------------------------------------------------------------------
    // Level lifecycle
    // ------------------------------------------------------------------

    fn apply_level(&mut self, index: usize) {
        self.level_index = index.min(self.levels.len().saturating_sub(1));
        let level = self.levels[self.level_index].clone();

        self.rules = SpawnRules::for_level(&level, &self.palette);
        self.checkpoint = self.total_score;
        self.level_score = 0;
        self.combo_streak = 0;
        self.chain = 0;
        self.moves_left = level.move_limit;
        self.shuffles_left = level.shuffles;
        self.hints_left = level.hints;
        self.paused = false;
        self.outcome = None;
        self.lose_reason = None;
        self.selected = None;
        self.hint_pair = None;
        self.hint_timer.cancel();
        self.cascade.reset();
        self.removed.clear();
        self.countdown = Countdown::new(level.time_limit);

        self.events.push(GameEvent::LevelChanged {
            index: self.level_index,
            level_id: level.id,
            name: level.display_name(),
        });
        info!(
            "level {} \"{}\" started: {}x{} grid, {} kinds, target {}",
            level.id,
            level.display_name(),
            level.rows,
            level.cols,
            self.rules.pool,
            level.target_score
        );

        self.generate_board(&level);
        if self.outcome.is_none() {
            self.countdown.start();
        }
    }

    fn generate_board(&mut self, level: &LevelDefinition) {
        for attempt in 1..=MAX_BOARD_ATTEMPTS {
            self.grid = Grid::filled(
                level.rows,
                level.cols,
                &mut self.factory,
                self.rules,
                &mut self.rng,
                self.clock_ms,
            );
            self.clear_initial_matches(level.min_match);
            if has_possible_move(&mut self.grid, level.min_match) {
                return;
            }
            debug!("board attempt {} has no possible move", attempt);
        }

        warn!(
            "no playable board for level {} after {} attempts",
            level.id, MAX_BOARD_ATTEMPTS
        );
        self.lose(LoseReason::NoMoves);
    }

    /// Resolve matches present on a new board without scoring or events.
    fn clear_initial_matches(&mut self, min_match: u8) {
        let mut discarded = Vec::new();
        for _ in 0..MAX_SETUP_PASSES {
            let groups = find_matches(&self.grid, min_match);
            if groups.is_empty() {
                return;
            }
            mark_removed(&mut self.grid, &groups, self.clock_ms, &mut discarded);
            discarded.clear();
            compact(&mut self.grid);
            refill(&mut self.grid, &mut self.factory, self.rules, &mut self.rng, self.clock_ms);
            settle(&mut self.grid);
        }
    }

    // ------------------------------------------------------------------
    // Outcomes
    // ------------------------------------------------------------------

    fn summary(&self) -> OutcomeSummary {
        let level = self.level();
        OutcomeSummary {
            level_id: level.id,
            level_index: self.level_index,
            total: self.total_score,
            level_score: self.level_score,
            target: level.target_score,
            moves_left: self.moves_left,
            time_left: self.countdown.remaining(),
        }
    }

    fn win(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(GameResult::Win);
        self.countdown.stop();
        self.clear_selection();
        self.clear_hint();
        self.checkpoint = self.total_score;

        let summary = self.summary();
        info!(
            "level {} won: {} / {} (total {})",
            summary.level_id, summary.level_score, summary.target, summary.total
        );
        self.events.push(GameEvent::Won(summary));
        self.cue(SoundCue::Win);
        self.report(GameResult::Win, None, &summary);
    }

    fn lose(&mut self, reason: LoseReason) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(GameResult::Lose);
        self.lose_reason = Some(reason);
        self.total_score = self.checkpoint;
        self.countdown.stop();
        self.clear_selection();
        self.clear_hint();

        let summary = self.summary();
        info!(
            "level {} lost ({}): {} / {} (total back to {})",
            summary.level_id,
            reason.as_str(),
            summary.level_score,
            summary.target,
            summary.total
        );
        self.events.push(GameEvent::Lost { reason, summary });
        self.cue(SoundCue::Lose);
        self.report(GameResult::Lose, Some(reason), &summary);
    }

    fn report(&mut self, result: GameResult, reason: Option<LoseReason>, summary: &OutcomeSummary) {
        let Some(reporter) = self.reporter.as_mut() else {
            return;
        };
        let record = ResultRecord::new(result, reason, summary);
        if let Err(err) = reporter.post_result(&record) {
            warn!(
                "failed to report {} for level {}: {}",
                result.as_str(),
                summary.level_id,
                err
            );
        }
    }

    fn cue(&mut self, cue: SoundCue) {
        if self.sound_enabled {
            self.events.push(GameEvent::Sound(cue));
        }
    }
}
