//! Key mapping from terminal events to player actions.

use crate::types::PlayerAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to player actions.
pub fn handle_key_event(key: KeyEvent) -> Option<PlayerAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    let code = match key.code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };

    match code {
        // Cursor
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(PlayerAction::CursorUp),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(PlayerAction::CursorDown),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(PlayerAction::CursorLeft),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(PlayerAction::CursorRight),

        // Cards
        KeyCode::Char(' ') | KeyCode::Enter => Some(PlayerAction::Select),
        KeyCode::Esc | KeyCode::Backspace => Some(PlayerAction::Deselect),

        // Power-ups
        KeyCode::Char('f') => Some(PlayerAction::Shuffle),
        KeyCode::Char('?') | KeyCode::Char('i') => Some(PlayerAction::Hint),

        // Session
        KeyCode::Char('p') => Some(PlayerAction::Pause),
        KeyCode::Char('r') => Some(PlayerAction::Retry),
        KeyCode::Char('n') => Some(PlayerAction::NextLevel),
        KeyCode::Char('m') => Some(PlayerAction::ToggleSound),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
