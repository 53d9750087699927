//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! The viewer has a single text input (the filter bar), so every printable
//! key edits the filter and there is no separate navigation mode.
//!
//! | Key(s)             | Event           |
//! |--------------------|-----------------|
//! | `Esc`, `Ctrl+c`    | `Quit`          |
//! | printable char     | `Char(c)`       |
//! | `Backspace`        | `Backspace`     |
//! | `Delete`           | `Delete`        |
//! | `←` / `→`          | `CursorLeft` / `CursorRight` |
//! | `Home` / `End`     | `CursorHome` / `CursorEnd`   |
//! | `Ctrl+u`           | `ClearFilter`   |
//! | terminal resize    | `Resize(w, h)`  |

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Exit the viewer.
    Quit,
    /// A printable character typed into the filter.
    Char(char),
    /// Delete the character before the cursor.
    Backspace,
    /// Delete the character under the cursor.
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    /// Empty the filter.
    ClearFilter,
    /// The terminal was resized to the given (width, height).
    Resize(u16, u16),
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`].
///
/// Returns `None` for events with no meaning to the viewer (mouse events,
/// key releases, unbound keys).
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Esc => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),
        Char('u') if key.modifiers == Mod::CONTROL => Some(AppEvent::ClearFilter),

        Left => Some(AppEvent::CursorLeft),
        Right => Some(AppEvent::CursorRight),
        Home => Some(AppEvent::CursorHome),
        End => Some(AppEvent::CursorEnd),

        // Shifted characters arrive with SHIFT set on most terminals
        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace => Some(AppEvent::Backspace),
        Delete => Some(AppEvent::Delete),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
