//! Log view: the record list filling the screen above the filter bar.
//!
//! Each record renders as
//!
//! ```text
//! 12:00:01.250 app ≫ db ≫ query finished
//! {
//!   "rows": 3
//! }
//! ------------------------------------------
//! ```
//!
//! The timestamp is optional. The ` ≫ ` separators take the logger's shade,
//! the reason takes the level style. When the records need more rows than the
//! area has, the oldest rows are cut so the newest record stays visible.

use crate::theme::Theme;
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use serde_json::Value;
use skein_core::config::UiConfig;
use skein_core::LogRecord;

const LABEL_SEPARATOR: &str = " ≫ ";
const ELLIPSIS: &str = "…";

pub struct LogView<'a> {
    records: &'a [&'a LogRecord],
    ui: &'a UiConfig,
    theme: &'a Theme,
}

impl<'a> LogView<'a> {
    pub fn new(records: &'a [&'a LogRecord], ui: &'a UiConfig, theme: &'a Theme) -> Self {
        Self { records, ui, theme }
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let rule = "-".repeat(width as usize);
        let mut lines = Vec::new();
        for record in self.records {
            lines.push(self.headline(record));
            if let Some(payload) = display_payload(record.payload.as_ref(), self.ui.payload_max_chars) {
                lines.extend(
                    payload
                        .lines()
                        .map(|l| Line::from(Span::styled(l.to_string(), self.theme.payload))),
                );
            }
            lines.push(Line::from(Span::styled(rule.clone(), self.theme.separator)));
        }
        lines
    }

    fn headline(&self, record: &LogRecord) -> Line<'static> {
        let mut spans = Vec::with_capacity(record.label.len() * 2 + 2);
        if self.ui.show_timestamps {
            let ts = record.received_at.with_timezone(&Local);
            spans.push(Span::styled(
                format!("{} ", ts.format(&self.ui.timestamp_format)),
                self.theme.timestamp,
            ));
        }
        let shade = self.theme.shade(record.color_index);
        for segment in &record.label {
            spans.push(Span::styled(segment.clone(), self.theme.label));
            spans.push(Span::styled(LABEL_SEPARATOR, shade));
        }
        spans.push(Span::styled(
            record.reason.clone(),
            self.theme.level_style(record.level),
        ));
        Line::from(spans)
    }
}

impl Widget for LogView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" skein ")
            .border_style(self.theme.border);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = self.lines(inner.width);
        let overflow = lines.len().saturating_sub(inner.height as usize);
        lines.drain(..overflow);
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Text shown under the headline, or `None` when the payload is empty.
///
/// Strings show as-is, everything else as pretty JSON. The result is cut to
/// `max_chars` characters with a trailing ellipsis.
pub fn display_payload(payload: Option<&Value>, max_chars: usize) -> Option<String> {
    let text = match payload? {
        Value::Null => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Some(format!("{}{ELLIPSIS}", &text[..cut])),
        None => Some(text),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
