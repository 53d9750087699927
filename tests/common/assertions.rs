//! Domain-specific assertion macros for skein harnesses.
//!
//! These wrap `pretty_assertions` and add the record context that makes a
//! failure readable.

/// Assert a view record's resolved label chain.
///
/// ```rust
/// assert_label!(record, ["app", "db"]);
/// ```
#[macro_export]
macro_rules! assert_label {
    ($record:expr, [$($label:expr),* $(,)?]) => {{
        let record: &skein_core::LogRecord = &$record;
        let expected: Vec<String> = vec![$($label.to_string()),*];
        pretty_assertions::assert_eq!(
            record.label, expected,
            "label mismatch for record {:?}", record.reason
        );
    }};
}

/// Assert the reasons of an aggregator's view, oldest first.
///
/// ```rust
/// assert_view!(agg, ["added logger [app]", "booting"]);
/// ```
#[macro_export]
macro_rules! assert_view {
    ($agg:expr, [$($reason:expr),* $(,)?]) => {{
        let expected: Vec<String> = vec![$($reason.to_string()),*];
        let actual: Vec<String> = $agg.view().iter().map(|r| r.reason.clone()).collect();
        pretty_assertions::assert_eq!(actual, expected, "view mismatch");
    }};
}
