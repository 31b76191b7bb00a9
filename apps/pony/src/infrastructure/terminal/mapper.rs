//! Event mapper: crossterm events to core messages.

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui::{Key, Message};

/// Map a terminal event to a message, or `None` when it is irrelevant.
#[must_use]
pub fn map_event(event: &TermEvent) -> Option<Message> {
    match event {
        TermEvent::Key(key) => map_key(key).map(Message::Key),
        TermEvent::Resize(width, height) => Some(Message::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

/// Map a key event to a logical key.
///
/// Only presses count; repeats and releases are dropped. Control chords
/// other than Ctrl+C are ignored.
#[must_use]
pub fn map_key(key: &KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(Key::CtrlC),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::BackTab),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Backspace => Some(Key::Backspace),
        _ => None,
    }
}
