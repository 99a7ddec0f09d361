//! Integration tests for the session state machine through the facade crate

use tui_match3::core::{
    CascadePacing, GameConfig, GameEvent, Grid, GridSizeConfig, LevelConfig, MemoryReporter,
    Session, SessionStatus,
};
use tui_match3::types::{GameResult, LoseReason, PlayerAction, Position};

/// Swapping (0,2) with (1,2) completes the top row.
const OPEN_ROW: &[&[u8]] = &[&[0, 0, 1, 2], &[3, 4, 0, 1], &[2, 1, 3, 4], &[4, 3, 2, 0]];

/// No swap anywhere completes a run of three.
const DEAD_BOARD: &[&[u8]] = &[&[0, 1, 2, 3], &[2, 3, 0, 1], &[0, 1, 2, 3], &[2, 3, 0, 1]];

fn level(target: f64, moves: Option<f64>) -> LevelConfig {
    LevelConfig {
        grid_size: Some(GridSizeConfig { rows: 8.0, cols: 8.0 }),
        card_kinds: Some(5.0),
        target_score: Some(target),
        move_limit: moves,
        hints: Some(1.0),
        trap_rate: Some(0.0),
        ..LevelConfig::default()
    }
}

fn session(levels: Vec<LevelConfig>, layout: &[&[u8]]) -> Session {
    let config = GameConfig::default()
        .with_levels(levels)
        .with_seed(99)
        .with_pacing(CascadePacing::immediate());
    let mut session = Session::new(config);
    session.load_grid(Grid::from_kinds(layout));
    session.drain_events();
    session
}

#[test]
fn test_campaign_starts_playing() {
    let session = Session::new(GameConfig::campaign().with_seed(1));
    assert_eq!(session.status(), SessionStatus::Playing);
    assert_eq!(session.level_index(), 0);
    assert_eq!(session.total_score(), 0);
    assert!(session.grid().is_full());
    assert!(session.grid().is_consistent());
    assert_eq!(session.moves_left(), Some(25));
}

#[test]
fn test_same_seed_same_board() {
    let a = Session::new(GameConfig::campaign().with_seed(1234));
    let b = Session::new(GameConfig::campaign().with_seed(1234));
    assert_eq!(a.grid().kinds(), b.grid().kinds());
}

#[test]
fn test_player_actions_drive_a_winning_swap() {
    let mut session = session(vec![level(30.0, None), level(500.0, None)], OPEN_ROW);
    let reporter = MemoryReporter::default();
    session = session.with_reporter(reporter);

    assert!(session.apply(PlayerAction::Select, Position::new(0, 2)));
    assert!(session.apply(PlayerAction::Select, Position::new(1, 2)));

    assert_eq!(session.status(), SessionStatus::GameOver(GameResult::Win));
    assert_eq!(session.total_score(), 30);
    assert_eq!(session.checkpoint(), 30);

    let events = session.drain_events();
    assert!(events.iter().any(|e| matches!(e, GameEvent::Won(s) if s.level_score == 30)));

    session.apply(PlayerAction::NextLevel, Position::new(0, 0));
    assert_eq!(session.level_index(), 1);
    assert_eq!(session.total_score(), 30);
    assert_eq!(session.level_score(), 0);
    assert!(session
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::LevelChanged { index: 1, .. })));
}

#[test]
fn test_out_of_moves_rolls_back_and_retry_resets() {
    let mut session = session(vec![level(10_000.0, Some(1.0))], OPEN_ROW);

    // Not adjacent to anything matching: a failed swap still costs the move.
    session.select(Position::new(3, 0));
    session.select(Position::new(3, 1));

    assert_eq!(session.moves_left(), Some(0));
    assert_eq!(session.status(), SessionStatus::GameOver(GameResult::Lose));
    assert_eq!(session.lose_reason(), Some(LoseReason::Moves));

    session.apply(PlayerAction::Retry, Position::new(0, 0));
    assert_eq!(session.status(), SessionStatus::Playing);
    assert_eq!(session.moves_left(), Some(1));
    assert_eq!(session.total_score(), 0);
}

#[test]
fn test_dead_board_hint_loses() {
    let mut session = session(vec![level(10_000.0, None)], DEAD_BOARD);
    assert!(session.apply(PlayerAction::Hint, Position::new(0, 0)));
    assert_eq!(session.lose_reason(), Some(LoseReason::NoMoves));
}

#[test]
fn test_pause_blocks_selection() {
    let mut session = session(vec![level(10_000.0, None)], OPEN_ROW);
    assert!(session.apply(PlayerAction::Pause, Position::new(0, 0)));
    assert_eq!(session.status(), SessionStatus::Paused);
    assert!(!session.apply(PlayerAction::Select, Position::new(0, 2)));
    assert_eq!(session.selected(), None);

    assert!(session.apply(PlayerAction::Pause, Position::new(0, 0)));
    assert_eq!(session.status(), SessionStatus::Playing);
}

#[test]
fn test_tick_runs_down_the_clock() {
    let mut levels = vec![level(10_000.0, None)];
    levels[0].time_limit = Some(2.0);
    let mut session = session(levels, OPEN_ROW);

    assert_eq!(session.time_left(), Some(2));
    for _ in 0..(2000 / 16 + 2) {
        session.tick(16);
    }
    assert_eq!(session.time_left(), Some(0));
    assert_eq!(session.lose_reason(), Some(LoseReason::Time));
}
