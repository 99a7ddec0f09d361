//! Keyboard cursor over the card grid.

use crate::types::{PlayerAction, Position};

/// Cell highlighted by the keyboard, always inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    rows: u8,
    cols: u8,
}

impl Cursor {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            pos: Position::default(),
            rows,
            cols,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Adopt new grid dimensions (level change), clamping the position.
    pub fn resize(&mut self, rows: u8, cols: u8) {
        self.rows = rows;
        self.cols = cols;
        self.pos = Position::new(
            self.pos.row.min(rows.saturating_sub(1)),
            self.pos.col.min(cols.saturating_sub(1)),
        );
    }

    /// Move by one cell. Returns false at an edge.
    pub fn step(&mut self, d_row: i8, d_col: i8) -> bool {
        let row = self.pos.row as i16 + d_row as i16;
        let col = self.pos.col as i16 + d_col as i16;
        if row < 0 || col < 0 || row >= self.rows as i16 || col >= self.cols as i16 {
            return false;
        }
        self.pos = Position::new(row as u8, col as u8);
        true
    }

    /// Apply a cursor action. Non-cursor actions are not consumed.
    pub fn apply(&mut self, action: PlayerAction) -> bool {
        match action {
            PlayerAction::CursorUp => self.step(-1, 0),
            PlayerAction::CursorDown => self.step(1, 0),
            PlayerAction::CursorLeft => self.step(0, -1),
            PlayerAction::CursorRight => self.step(0, 1),
            _ => false,
        }
    }
}
