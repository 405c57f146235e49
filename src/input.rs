//! Reference key bindings: Left/Right/Up/Down/Space/P/Q.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a key event to an engine command; `None` for unbound keys.
///
/// P toggles pause (the session resumes on `Pause` while paused), Esc is an
/// alias for quit. Event polling stays with the caller.
pub fn key_to_command(key: KeyEvent) -> Option<Command> {
    let KeyEvent { code, modifiers, .. } = key;
    if !modifiers.is_empty() && modifiers != KeyModifiers::SHIFT {
        return None;
    }
    match code {
        KeyCode::Left => Some(Command::MoveLeft),
        KeyCode::Right => Some(Command::MoveRight),
        KeyCode::Up => Some(Command::RotateCw),
        KeyCode::Down => Some(Command::SoftDrop),
        KeyCode::Char(' ') => Some(Command::HardDrop),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Pause),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_reference_bindings() {
        assert_eq!(key_to_command(key(KeyCode::Left)), Some(Command::MoveLeft));
        assert_eq!(key_to_command(key(KeyCode::Right)), Some(Command::MoveRight));
        assert_eq!(key_to_command(key(KeyCode::Up)), Some(Command::RotateCw));
        assert_eq!(key_to_command(key(KeyCode::Down)), Some(Command::SoftDrop));
        assert_eq!(key_to_command(key(KeyCode::Char(' '))), Some(Command::HardDrop));
        assert_eq!(key_to_command(key(KeyCode::Char('p'))), Some(Command::Pause));
        assert_eq!(key_to_command(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(key_to_command(key(KeyCode::Esc)), Some(Command::Quit));
    }

    #[test]
    fn test_unbound_and_modified_keys_ignored() {
        assert_eq!(key_to_command(key(KeyCode::Char('x'))), None);
        assert_eq!(key_to_command(key(KeyCode::Tab)), None);
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(key_to_command(ctrl_q), None);
    }

    #[test]
    fn test_kind_is_irrelevant_to_the_mapping() {
        let mut release = key(KeyCode::Left);
        release.kind = KeyEventKind::Release;
        assert_eq!(key_to_command(release), Some(Command::MoveLeft));
    }
}
