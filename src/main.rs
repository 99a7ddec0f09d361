//! Terminal match-3 runner (default binary).
//!
//! Environment:
//! - `MATCH3_LEVELS`: JSON file with a level list (default: built-in campaign)
//! - `MATCH3_SEED`: RNG seed
//! - `MATCH3_LOG_PATH`: write logs here (stdout belongs to the board)
//! - `MATCH3_REPORT_PATH`, `MATCH3_REPORT_DISABLED`: see the adapter crate

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, LevelFilter};

use tui_match3::adapter::{BridgeConfig, HostBridge};
use tui_match3::core::{parse_levels, GameConfig, GameEvent, Session};
use tui_match3::input::{handle_key_event, should_quit, Cursor};
use tui_match3::term::{BoardView, Canvas, TerminalRenderer, Viewport};
use tui_match3::types::TICK_MS;

fn main() -> Result<()> {
    init_logging()?;
    let config = config_from_env()?;
    let bridge = HostBridge::start(BridgeConfig::from_env())?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config, bridge);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var("MATCH3_LOG_PATH").ok().filter(|s| !s.trim().is_empty()) else {
        return Ok(());
    };
    let file = File::create(path.trim()).with_context(|| format!("cannot create log file {path}"))?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    simplelog::WriteLogger::init(LevelFilter::Debug, config, file)?;
    Ok(())
}

fn config_from_env() -> Result<GameConfig> {
    let mut config = GameConfig::campaign();
    if let Ok(path) = std::env::var("MATCH3_LEVELS") {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read level file {path}"))?;
        let levels = parse_levels(&json).with_context(|| format!("invalid level file {path}"))?;
        info!("loaded {} levels from {path}", levels.len());
        config = config.with_levels(levels);
    }
    if let Some(seed) = std::env::var("MATCH3_SEED").ok().and_then(|s| s.parse().ok()) {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn run(term: &mut TerminalRenderer, config: GameConfig, mut bridge: Option<HostBridge>) -> Result<()> {
    let mut session = Session::new(config);
    if let Some(reporter) = bridge.as_ref().and_then(HostBridge::reporter) {
        session.set_reporter(Box::new(reporter));
    }

    let level = session.level();
    let mut cursor = Cursor::new(level.rows, level.cols);
    let mut view = BoardView::new();
    let mut canvas = Canvas::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    let outcome = loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&session, cursor.position(), Viewport::new(w, h), &mut canvas);
        term.present(&canvas)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        break Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        if !cursor.apply(action) {
                            session.apply(action, cursor.position());
                        }
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            if let Some(bridge) = bridge.as_mut() {
                while let Some(cmd) = bridge.try_recv() {
                    cmd.apply(&mut session);
                }
            }

            session.tick(TICK_MS);
            view.advance(TICK_MS);
            view.flash_removed(&session.take_removed());
            for ev in session.drain_events() {
                if let GameEvent::LevelChanged { .. } = ev {
                    let level = session.level();
                    cursor.resize(level.rows, level.cols);
                }
                view.observe(&ev);
            }
        }
    };

    // The session holds a reporter clone; drop it so the writer can finish.
    drop(session);
    if let Some(bridge) = bridge {
        bridge.shutdown();
    }
    outcome
}
