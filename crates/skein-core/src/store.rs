//! Store — bounded, ordered buffer of ingested [`LogRecord`]s plus the live
//! view filter.
//!
//! The buffer keeps the [`RETENTION`] most recent records. [`LogBuffer::view`]
//! returns at most [`DISPLAY_WINDOW`] of the newest records that pass the
//! filter, oldest first, and never returns an empty view.

use std::collections::VecDeque;

use crate::search::FilterState;
use crate::types::{Level, LogRecord, LoggerRecord};

/// Maximum records retained.
pub const RETENTION: usize = 100;
/// Maximum records returned by [`LogBuffer::view`].
pub const DISPLAY_WINDOW: usize = 10;
/// Reason of the placeholder shown when nothing passes the filter.
pub const NO_MATCH_REASON: &str = "No Logs Match Filter Criteria";

#[derive(Debug)]
pub struct LogBuffer {
    records: VecDeque<LogRecord>,
    filter: FilterState,
    placeholder: LogRecord,
}

impl LogBuffer {
    /// `origin` is the logger the no-match placeholder is attributed to.
    pub fn new(origin: &LoggerRecord) -> Self {
        Self {
            records: VecDeque::with_capacity(RETENTION + 1),
            filter: FilterState::new(),
            placeholder: LogRecord::emitted_by(origin, Level::Log, NO_MATCH_REASON, None),
        }
    }

    /// Append at the tail, evicting from the head beyond [`RETENTION`].
    pub fn append(&mut self, record: LogRecord) {
        self.records.push_back(record);
        while self.records.len() > RETENTION {
            self.records.pop_front();
        }
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter.set(text);
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The newest matching records, oldest first, or the placeholder alone.
    pub fn view(&self) -> Vec<&LogRecord> {
        let mut window: Vec<&LogRecord> = self
            .records
            .iter()
            .rev()
            .filter(|record| self.filter.is_match(&record.testable))
            .take(DISPLAY_WINDOW)
            .collect();
        if window.is_empty() {
            return vec![&self.placeholder];
        }
        window.reverse();
        window
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogMessage;
    use pretty_assertions::assert_eq;

    fn origin() -> LoggerRecord {
        LoggerRecord::root(1000, "viewer")
    }

    fn record(reason: impl Into<String>) -> LogRecord {
        LogRecord::from_message(
            LogMessage {
                logger_id: 1,
                level: Level::Log,
                reason: reason.into(),
                payload: None,
            },
            None,
        )
    }

    fn reasons(view: &[&LogRecord]) -> Vec<String> {
        view.iter().map(|r| r.reason.clone()).collect()
    }

    #[test]
    fn retention_keeps_newest_hundred() {
        let mut buffer = LogBuffer::new(&origin());
        for i in 0..150 {
            buffer.append(record(format!("r{i}")));
        }
        assert_eq!(buffer.len(), RETENTION);
        assert_eq!(buffer.iter().next().unwrap().reason, "r50");
        assert_eq!(buffer.iter().last().unwrap().reason, "r149");
    }

    #[test]
    fn view_returns_last_ten_in_order() {
        let mut buffer = LogBuffer::new(&origin());
        for i in 0..25 {
            buffer.append(record(format!("r{i}")));
        }
        let expected: Vec<String> = (15..25).map(|i| format!("r{i}")).collect();
        assert_eq!(reasons(&buffer.view()), expected);
    }

    #[test]
    fn view_applies_filter_before_windowing() {
        let mut buffer = LogBuffer::new(&origin());
        for i in 0..30 {
            buffer.append(record(if i % 3 == 0 { format!("keep{i}") } else { format!("drop{i}") }));
        }
        buffer.set_filter("keep");
        assert_eq!(
            reasons(&buffer.view()),
            vec!["keep0", "keep3", "keep6", "keep9", "keep12", "keep15", "keep18", "keep21", "keep24", "keep27"]
        );
    }

    #[test]
    fn empty_view_yields_single_placeholder() {
        let mut buffer = LogBuffer::new(&origin());
        let view = buffer.view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].reason, NO_MATCH_REASON);
        assert_eq!(view[0].label, vec!["viewer"]);
        assert_eq!(view[0].payload, None);

        buffer.append(record("hello"));
        buffer.set_filter("^nothing-matches-this$");
        assert_eq!(reasons(&buffer.view()), vec![NO_MATCH_REASON]);
    }

    #[test]
    fn invalid_filter_shows_everything() {
        let mut buffer = LogBuffer::new(&origin());
        buffer.append(record("a"));
        buffer.append(record("b"));
        buffer.set_filter("(");
        assert!(!buffer.filter().valid());
        assert_eq!(reasons(&buffer.view()), vec!["a", "b"]);
    }
}
