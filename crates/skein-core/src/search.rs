//! View filter — a live regular expression over each record's testable text.
//!
//! An empty pattern matches everything. A pattern that fails to compile also
//! matches everything, but the typed text is kept for redisplay and the state
//! reports itself invalid.

use regex::Regex;

/// The operator-entered pattern did not compile.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid filter pattern: {0}")]
pub struct FilterCompileError(#[from] regex::Error);

#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// `None` means match everything.
    pattern: Option<Regex>,
    raw_text: String,
    error: Option<FilterCompileError>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pattern. Never fails; see [`FilterState::error`].
    pub fn set(&mut self, text: impl Into<String>) {
        let text = text.into();
        match compile(&text) {
            Ok(pattern) => {
                self.pattern = pattern;
                self.error = None;
            }
            Err(err) => {
                tracing::debug!(pattern = %text, error = %err, "filter pattern rejected");
                self.pattern = None;
                self.error = Some(err);
            }
        }
        self.raw_text = text;
    }

    /// True when a compiled, non-empty pattern is in force.
    pub fn active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn error(&self) -> Option<&FilterCompileError> {
        self.error.as_ref()
    }

    pub fn is_match(&self, testable: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(testable))
    }
}

/// Compile `text`, mapping the empty string to "match everything".
pub fn compile(text: &str) -> Result<Option<Regex>, FilterCompileError> {
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(text)?))
}
