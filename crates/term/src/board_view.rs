//! BoardView: maps a `core::Session` into a terminal canvas.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::canvas::{Canvas, Rgb, Style};
use crate::core::{Card, GameEvent, Session, SessionStatus};
use crate::types::{CardState, GameResult, LoseReason, Position};

/// Terminal columns per card: bracket, glyph, trap mark, bracket.
pub const CELL_W: u16 = 4;

/// Width reserved for the HUD to the right of the board.
pub const PANEL_W: u16 = 30;

/// How long a notice stays in the HUD.
pub const NOTICE_MS: u32 = 2000;

/// How long a removed card flashes in its old cell.
pub const FLASH_MS: u32 = 250;

const BOARD_BG: Rgb = Rgb::new(28, 28, 38);
const SELECT_BG: Rgb = Rgb::new(70, 70, 110);
const HINT_BG: Rgb = Rgb::new(90, 80, 30);
const FLASH_BG: Rgb = Rgb::new(120, 40, 40);
const BORDER: Rgb = Rgb::new(190, 190, 200);
const LABEL: Rgb = Rgb::new(150, 150, 165);
const VALUE: Rgb = Rgb::new(235, 235, 235);

const KIND_COLORS: [Rgb; 8] = [
    Rgb::new(230, 80, 80),
    Rgb::new(80, 200, 120),
    Rgb::new(90, 140, 240),
    Rgb::new(240, 210, 80),
    Rgb::new(200, 110, 220),
    Rgb::new(80, 210, 220),
    Rgb::new(250, 150, 60),
    Rgb::new(200, 200, 200),
];

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Where the board and panel land for a given grid and viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub frame_x: u16,
    pub frame_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    pub panel_x: u16,
}

impl Layout {
    pub fn new(rows: u8, cols: u8, viewport: Viewport) -> Self {
        let frame_w = cols as u16 * CELL_W + 2;
        let frame_h = rows as u16 + 2;
        let total_w = frame_w + 2 + PANEL_W;
        Self {
            frame_x: viewport.width.saturating_sub(total_w) / 2,
            frame_y: viewport.height.saturating_sub(frame_h.max(16)) / 2,
            frame_w,
            frame_h,
            panel_x: viewport.width.saturating_sub(total_w) / 2 + frame_w + 2,
        }
    }

    /// Top-left terminal cell of the card at `pos`.
    pub fn cell_origin(&self, pos: Position) -> (u16, u16) {
        (
            self.frame_x + 1 + pos.col as u16 * CELL_W,
            self.frame_y + 1 + pos.row as u16,
        )
    }
}

/// Glyph for a card kind.
pub fn kind_glyph(kind: u8) -> char {
    (b'A' + kind % 26) as char
}

pub fn kind_color(kind: u8) -> Rgb {
    KIND_COLORS[kind as usize % KIND_COLORS.len()]
}

fn clock_text(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn lose_text(reason: Option<LoseReason>) -> &'static str {
    match reason {
        Some(LoseReason::Time) => "OUT OF TIME",
        Some(LoseReason::Moves) => "OUT OF MOVES",
        Some(LoseReason::NoMoves) | None => "NO MOVES LEFT",
    }
}

/// Renders the board, the HUD and overlays.
#[derive(Debug, Default, Clone)]
pub struct BoardView {
    notice: Option<(String, u32)>,
    flashes: Vec<Flash>,
}

#[derive(Debug, Clone, Copy)]
struct Flash {
    pos: Position,
    kind: u8,
    ttl: u32,
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    /// Turn an engine event into a short HUD notice.
    pub fn observe(&mut self, event: &GameEvent) {
        let text = match event {
            GameEvent::ScoreChanged(score) => {
                let b = &score.breakdown;
                let mut text = format!("+{}", b.gained);
                if b.combo > 0 {
                    text.push_str(&format!(" combo x{:.1}", b.multiplier));
                }
                if b.contains_trap {
                    text.push_str(" trap!");
                }
                text
            }
            GameEvent::LevelChanged { name, .. } => format!("Level: {}", name),
            GameEvent::Won(summary) => format!("Cleared {} / {}", summary.level_score, summary.target),
            GameEvent::Lost { reason, .. } => format!("Lost: {}", reason.as_str()),
            GameEvent::ShuffleUsed { remaining } => format!("Shuffled ({} left)", remaining),
            GameEvent::HintUsed { remaining, .. } => format!("Hint ({} left)", remaining),
            GameEvent::Clicked(_) | GameEvent::Sound(_) => return,
        };
        self.notice = Some((text, NOTICE_MS));
    }

    /// Flash the cells of cards drained from `Session::take_removed`.
    pub fn flash_removed(&mut self, cards: &[Card]) {
        for card in cards {
            let pos = card.position();
            self.flashes.retain(|flash| flash.pos != pos);
            self.flashes.push(Flash {
                pos,
                kind: card.kind,
                ttl: FLASH_MS,
            });
        }
    }

    /// Positions currently flashing.
    pub fn flashing(&self) -> impl Iterator<Item = Position> + '_ {
        self.flashes.iter().map(|flash| flash.pos)
    }

    /// Age the current notice and removal flashes.
    pub fn advance(&mut self, elapsed_ms: u32) {
        if let Some((_, ttl)) = self.notice.as_mut() {
            *ttl = ttl.saturating_sub(elapsed_ms);
            if *ttl == 0 {
                self.notice = None;
            }
        }
        for flash in self.flashes.iter_mut() {
            flash.ttl = flash.ttl.saturating_sub(elapsed_ms);
        }
        self.flashes.retain(|flash| flash.ttl > 0);
    }

    /// Render `session` into `canvas`, resizing it to `viewport`.
    pub fn render_into(&self, session: &Session, cursor: Position, viewport: Viewport, canvas: &mut Canvas) {
        canvas.reset(viewport.width, viewport.height);

        let grid = session.grid();
        let layout = Layout::new(grid.rows(), grid.cols(), viewport);

        canvas.fill(
            layout.frame_x + 1,
            layout.frame_y + 1,
            layout.frame_w - 2,
            layout.frame_h - 2,
            Style::default().on(BOARD_BG),
        );
        canvas.frame(
            layout.frame_x,
            layout.frame_y,
            layout.frame_w,
            layout.frame_h,
            Style::fg(BORDER),
        );

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let pos = Position::new(row, col);
                self.draw_card(canvas, &layout, pos, grid.get(pos), pos == cursor);
            }
        }
        for flash in &self.flashes {
            if grid.contains(flash.pos) {
                let (x, y) = layout.cell_origin(flash.pos);
                let style = Style::fg(kind_color(flash.kind)).on(FLASH_BG).bold();
                canvas.put(x + 1, y, '*', style);
                canvas.put(x + 2, y, ' ', style);
            }
        }

        self.draw_panel(canvas, &layout, session);

        match session.status() {
            SessionStatus::Playing => {}
            SessionStatus::Paused => self.draw_overlay(canvas, &layout, "PAUSED", "p: resume"),
            SessionStatus::GameOver(GameResult::Win) => {
                self.draw_overlay(canvas, &layout, "LEVEL CLEAR", "n: next  r: replay")
            }
            SessionStatus::GameOver(GameResult::Lose) => {
                self.draw_overlay(canvas, &layout, lose_text(session.lose_reason()), "r: retry")
            }
        }
    }

    /// Convenience helper that allocates a new canvas.
    pub fn render(&self, session: &Session, cursor: Position, viewport: Viewport) -> Canvas {
        let mut canvas = Canvas::new(viewport.width, viewport.height);
        self.render_into(session, cursor, viewport, &mut canvas);
        canvas
    }

    fn draw_card(&self, canvas: &mut Canvas, layout: &Layout, pos: Position, card: Option<&Card>, cursor: bool) {
        let (x, y) = layout.cell_origin(pos);
        let bracket = Style::fg(Rgb::new(255, 255, 255)).on(BOARD_BG).bold();
        if cursor {
            canvas.put(x, y, '[', bracket);
            canvas.put(x + 3, y, ']', bracket);
        }

        let Some(card) = card else {
            return;
        };

        if card.state == CardState::Removed {
            canvas.put(x + 1, y, '·', Style::fg(LABEL).on(BOARD_BG).dim());
            return;
        }

        let mut style = Style::fg(kind_color(card.kind)).on(BOARD_BG);
        if card.state == CardState::Selected {
            style = style.on(SELECT_BG).bold();
        }
        if card.is_hinted {
            style = style.on(HINT_BG).underline();
        }
        if card.is_entering {
            style = style.dim();
        }

        canvas.put(x + 1, y, kind_glyph(card.kind), style);
        if card.is_trap {
            canvas.put(x + 2, y, '!', Style::fg(Rgb::new(255, 90, 90)).on(style.bg).bold());
        } else {
            canvas.put(x + 2, y, ' ', style);
        }
    }

    fn draw_panel(&self, canvas: &mut Canvas, layout: &Layout, session: &Session) {
        let x = layout.panel_x;
        if x >= canvas.width() {
            return;
        }

        let label = Style::fg(LABEL);
        let value = Style::fg(VALUE).bold();
        let level = session.level();
        let dash = || "--".to_string();

        let rows: [(&str, String); 10] = [
            (
                "Level",
                format!(
                    "{}/{} {}",
                    session.level_index() + 1,
                    session.levels().len(),
                    level.display_name()
                ),
            ),
            ("Score", session.total_score().to_string()),
            (
                "Goal",
                format!("{} / {}", session.level_score(), session.target_score()),
            ),
            ("Combo", format!("x{}", session.combo_streak())),
            ("Time", session.time_left().map_or_else(dash, clock_text)),
            ("Moves", session.moves_left().map_or_else(dash, |m| m.to_string())),
            ("Shuffle", session.shuffles_left().to_string()),
            ("Hints", session.hints_left().to_string()),
            (
                "Sound",
                if session.sound_enabled() { "on" } else { "off" }.to_string(),
            ),
            ("Status", session.status().as_str().to_string()),
        ];

        let mut y = layout.frame_y;
        canvas.text(x, y, "MATCH-3", Style::fg(VALUE).bold().underline());
        y += 2;
        for (name, text) in rows.iter() {
            canvas.text(x, y, name, label);
            canvas.text(x + 9, y, text, value);
            y += 1;
        }

        y += 1;
        if let Some(notice) = self.notice() {
            canvas.text(x, y, notice, Style::fg(Rgb::new(250, 220, 120)).bold());
        }
        y += 2;

        let help = Style::fg(LABEL).dim();
        for line in [
            "arrows/hjkl  move",
            "space  select   esc  back",
            "f  shuffle      ?  hint",
            "p  pause        r  retry",
            "n  next   m  sound   q  quit",
        ] {
            canvas.text(x, y, line, help);
            y += 1;
        }
    }

    fn draw_overlay(&self, canvas: &mut Canvas, layout: &Layout, title: &str, keys: &str) {
        let mid_y = layout.frame_y + layout.frame_h / 2;
        let style = Style::fg(Rgb::new(255, 255, 255)).bold();
        for (dy, text) in [(0u16, title), (1, keys)] {
            let w = text.chars().count() as u16;
            let x = layout.frame_x + layout.frame_w.saturating_sub(w) / 2;
            canvas.text(x, mid_y.saturating_sub(1) + dy, text, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CascadePacing, GameConfig, Grid, LevelConfig};

    fn session() -> Session {
        let levels = vec![LevelConfig {
            target_score: Some(1000.0),
            move_limit: Some(20.0),
            ..LevelConfig::default()
        }];
        let config = GameConfig::default()
            .with_levels(levels)
            .with_pacing(CascadePacing::immediate());
        let mut session = Session::new(config);
        session.load_grid(Grid::from_kinds(&[&[0, 1, 2], &[3, 4, 0], &[1, 2, 3]]));
        session
    }

    #[test]
    fn test_cards_and_cursor_are_drawn() {
        let session = session();
        let view = BoardView::new();
        let viewport = Viewport::new(80, 24);
        let canvas = view.render(&session, Position::new(1, 1), viewport);
        let layout = Layout::new(3, 3, viewport);

        let (x, y) = layout.cell_origin(Position::new(0, 2));
        assert_eq!(canvas.get(x + 1, y).unwrap().ch, 'C');

        let (x, y) = layout.cell_origin(Position::new(1, 1));
        assert_eq!(canvas.get(x, y).unwrap().ch, '[');
        assert_eq!(canvas.get(x + 1, y).unwrap().ch, 'E');
        assert_eq!(canvas.get(x + 3, y).unwrap().ch, ']');
    }

    #[test]
    fn test_hud_shows_score_and_moves() {
        let session = session();
        let canvas = BoardView::new().render(&session, Position::default(), Viewport::new(80, 24));
        assert!(canvas.contains_text("MATCH-3"));
        assert!(canvas.contains_text("0 / 1000"));
        assert!(canvas.contains_text("20"));
        assert!(canvas.contains_text("playing"));
    }

    #[test]
    fn test_pause_overlay() {
        let mut session = session();
        session.pause();
        let canvas = BoardView::new().render(&session, Position::default(), Viewport::new(80, 24));
        assert!(canvas.contains_text("PAUSED"));
    }

    #[test]
    fn test_selected_card_is_highlighted() {
        let mut session = session();
        session.select(Position::new(2, 2));
        let viewport = Viewport::new(80, 24);
        let canvas = BoardView::new().render(&session, Position::default(), viewport);
        let (x, y) = Layout::new(3, 3, viewport).cell_origin(Position::new(2, 2));
        let glyph = canvas.get(x + 1, y).unwrap();
        assert_eq!(glyph.style.bg, SELECT_BG);
        assert!(glyph.style.bold);
    }

    #[test]
    fn test_notice_expires() {
        let mut view = BoardView::new();
        view.observe(&GameEvent::ShuffleUsed { remaining: 1 });
        assert_eq!(view.notice(), Some("Shuffled (1 left)"));
        view.observe(&GameEvent::Clicked(Position::default()));
        assert_eq!(view.notice(), Some("Shuffled (1 left)"));
        view.advance(NOTICE_MS - 1);
        assert!(view.notice().is_some());
        view.advance(1);
        assert_eq!(view.notice(), None);
    }

    #[test]
    fn test_removed_cards_flash_then_fade() {
        let mut session = Session::new(
            GameConfig::default()
                .with_levels(vec![LevelConfig {
                    target_score: Some(1000.0),
                    trap_rate: Some(0.0),
                    ..LevelConfig::default()
                }])
                .with_pacing(CascadePacing::immediate()),
        );
        session.load_grid(Grid::from_kinds(&[&[0, 0, 1, 2], &[3, 4, 0, 1], &[2, 1, 3, 4], &[4, 3, 2, 0]]));
        session.select(Position::new(0, 2));
        session.select(Position::new(1, 2));

        let mut view = BoardView::new();
        let removed = session.take_removed();
        assert!(removed.len() >= 3);
        view.flash_removed(&removed);
        assert!(view.flashing().any(|pos| pos == Position::new(0, 0)));

        let viewport = Viewport::new(80, 24);
        let canvas = view.render(&session, Position::new(3, 3), viewport);
        let (x, y) = Layout::new(4, 4, viewport).cell_origin(Position::new(0, 1));
        let glyph = canvas.get(x + 1, y).unwrap();
        assert_eq!(glyph.ch, '*');
        assert_eq!(glyph.style.bg, FLASH_BG);

        view.advance(FLASH_MS);
        assert_eq!(view.flashing().count(), 0);
        let canvas = view.render(&session, Position::new(3, 3), viewport);
        assert_ne!(canvas.get(x + 1, y).unwrap().ch, '*');
    }

    #[test]
    fn test_clock_text() {
        assert_eq!(clock_text(65), "1:05");
        assert_eq!(clock_text(0), "0:00");
    }
}
