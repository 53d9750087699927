//! Filter bar: the single-line regex input at the bottom of the screen.
//!
//! Renders as `Filter ❯ <text>` followed by a status marker. The marker is
//! green while the text compiles (or is empty) and red with the compile
//! error otherwise. An invalid filter matches everything.

use crate::event::AppEvent;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use skein_core::FilterState;

const PROMPT: &str = "Filter";
const CHEVRON: &str = " ❯ ";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FilterBarState {
    /// The filter text as typed.
    pub text: String,
    /// Byte offset of the cursor within `text`.
    pub cursor: usize,
}

impl FilterBarState {
    /// Apply an editing event. Returns `true` when the text changed and the
    /// filter needs recompiling.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            AppEvent::Backspace => match self.prev_boundary() {
                Some(prev) => {
                    self.text.remove(prev);
                    self.cursor = prev;
                    true
                }
                None => false,
            },
            AppEvent::Delete => {
                if self.cursor < self.text.len() {
                    self.text.remove(self.cursor);
                    true
                } else {
                    false
                }
            }
            AppEvent::CursorLeft => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                false
            }
            AppEvent::CursorRight => {
                if let Some(c) = self.text[self.cursor..].chars().next() {
                    self.cursor += c.len_utf8();
                }
                false
            }
            AppEvent::CursorHome => {
                self.cursor = 0;
                false
            }
            AppEvent::CursorEnd => {
                self.cursor = self.text.len();
                false
            }
            AppEvent::ClearFilter => {
                let changed = !self.text.is_empty();
                self.text.clear();
                self.cursor = 0;
                changed
            }
            AppEvent::Quit | AppEvent::Resize(_, _) => false,
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().last().map(|(i, _)| i)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct FilterBar<'a> {
    state: &'a FilterBarState,
    filter: &'a FilterState,
    theme: &'a Theme,
}

impl<'a> FilterBar<'a> {
    pub fn new(state: &'a FilterBarState, filter: &'a FilterState, theme: &'a Theme) -> Self {
        Self {
            state,
            filter,
            theme,
        }
    }

    /// Absolute terminal position of the text cursor when rendered in `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let prefix = (PROMPT.chars().count() + CHEVRON.chars().count()) as u16;
        let col = self.state.text[..self.state.cursor].chars().count() as u16;
        let x = (area.x + prefix + col).min(area.right().saturating_sub(1));
        (x, area.y)
    }

    fn status(&self) -> Span<'static> {
        match self.filter.error() {
            Some(err) => {
                let summary = err.to_string().lines().last().unwrap_or_default().trim().to_string();
                Span::styled(format!("  ✗ {summary}"), self.theme.filter_invalid)
            }
            None if self.filter.active() => Span::styled("  ✓", self.theme.filter_valid),
            None => Span::raw(""),
        }
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(PROMPT, self.theme.filter_prompt),
            Span::styled(CHEVRON, self.theme.filter_chevron),
            Span::styled(self.state.text.as_str(), self.theme.filter_text),
            self.status(),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn typed(text: &str) -> FilterBarState {
        let mut s = FilterBarState::default();
        for c in text.chars() {
            s.handle(&AppEvent::Char(c));
        }
        s
    }

    fn render(state: &FilterBarState, filter: &FilterState) -> String {
        let theme = Theme::load_default();
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        FilterBar::new(state, filter, &theme).render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn typing_and_backspace() {
        let mut s = typed("err");
        assert_eq!(s.cursor, 3);
        assert!(s.handle(&AppEvent::Backspace));
        assert_eq!(s.text, "er");
        assert_eq!(s.cursor, 2);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut s = typed("ac");
        s.handle(&AppEvent::CursorLeft);
        s.handle(&AppEvent::Char('b'));
        assert_eq!(s.text, "abc");
        assert_eq!(s.cursor, 2);
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut s = typed("a≫b");
        s.handle(&AppEvent::CursorLeft);
        s.handle(&AppEvent::CursorLeft);
        assert_eq!(s.cursor, 1);
        s.handle(&AppEvent::CursorRight);
        assert_eq!(s.cursor, 1 + '≫'.len_utf8());
        assert!(s.handle(&AppEvent::Backspace));
        assert_eq!(s.text, "ab");
    }

    #[test]
    fn cursor_moves_do_not_report_changes() {
        let mut s = typed("abc");
        assert!(!s.handle(&AppEvent::CursorHome));
        assert!(!s.handle(&AppEvent::Backspace));
        assert!(s.handle(&AppEvent::Delete));
        assert_eq!(s.text, "bc");
        assert!(!s.handle(&AppEvent::CursorEnd));
        assert!(!s.handle(&AppEvent::Delete));
    }

    #[test]
    fn clear_empties_the_text() {
        let mut s = typed("abc");
        assert!(s.handle(&AppEvent::ClearFilter));
        assert_eq!((s.text.as_str(), s.cursor), ("", 0));
        assert!(!s.handle(&AppEvent::ClearFilter));
    }

    #[test]
    fn renders_prompt_and_text() {
        let s = typed("db");
        let mut filter = FilterState::new();
        filter.set("db");
        assert_eq!(render(&s, &filter), "Filter ❯ db  ✓");
    }

    #[test]
    fn empty_filter_has_no_marker() {
        assert_eq!(
            render(&FilterBarState::default(), &FilterState::new()),
            "Filter ❯"
        );
    }

    #[test]
    fn invalid_filter_is_flagged() {
        let s = typed("(");
        let mut filter = FilterState::new();
        filter.set("(");
        let rendered = render(&s, &filter);
        assert!(rendered.starts_with("Filter ❯ (  ✗"), "{rendered}");
    }

    #[test]
    fn cursor_sits_after_the_prompt() {
        let s = typed("ab");
        let filter = FilterState::new();
        let theme = Theme::load_default();
        let bar = FilterBar::new(&s, &filter, &theme);
        assert_eq!(bar.cursor_position(Rect::new(0, 5, 40, 1)), (11, 5));
    }
}
