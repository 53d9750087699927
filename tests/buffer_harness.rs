#![allow(unused)]
//! Log buffer and filter integration harness.
//!
//! # What this covers
//!
//! - **Retention**: the buffer never holds more than `RETENTION` records and
//!   evicts the oldest first.
//! - **View window**: the view is the newest `DISPLAY_WINDOW` matching
//!   records, oldest first, and is exactly the tail of the filtered
//!   buffer. Verified with proptest.
//! - **Placeholder**: when nothing matches, the view is the single
//!   "No Logs Match Filter Criteria" record.
//! - **Filter text**: the pattern runs against labels, reason and raw
//!   payload; invalid patterns match everything and report themselves.
//!
//! # Running
//!
//! ```sh
//! cargo test --test buffer_harness
//! ```

mod common;
use common::*;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use skein_core::store::{DISPLAY_WINDOW, NO_MATCH_REASON, RETENTION};
use skein_core::{Aggregator, Level, LogBuffer, LoggerRecord};

fn numbered(agg: &mut Aggregator, n: usize) {
    for i in 0..n {
        agg.system(Level::Log, format!("line {i}"), None);
    }
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// After more than RETENTION appends only the newest RETENTION remain.
#[test]
fn retention_evicts_oldest() {
    let mut buffer = LogBuffer::new(&LoggerRecord::root(0, "t"));
    let origin = LoggerRecord::root(1, "src");
    for i in 0..RETENTION + 25 {
        buffer.append(skein_core::LogRecord::emitted_by(
            &origin,
            Level::Log,
            format!("line {i}"),
            None,
        ));
    }
    assert_eq!(buffer.len(), RETENTION);
    assert_eq!(buffer.iter().next().map(|r| r.reason.as_str()), Some("line 25"));
}

// ---------------------------------------------------------------------------
// View window
// ---------------------------------------------------------------------------

/// With no filter the view is the last DISPLAY_WINDOW records.
#[test]
fn view_is_the_newest_window() {
    let mut agg = Aggregator::new();
    numbered(&mut agg, 15);
    let reasons = view_reasons(&agg);
    assert_eq!(reasons.len(), DISPLAY_WINDOW);
    assert_eq!(reasons.first().map(String::as_str), Some("line 5"));
    assert_eq!(reasons.last().map(String::as_str), Some("line 14"));
}

proptest! {
    /// The view is always the tail of the filtered buffer, capped at the
    /// window, and never empty.
    #[test]
    fn view_is_suffix_of_filtered_buffer(
        tags in proptest::collection::vec(0u8..4, 0..160),
        wanted in 0u8..4,
    ) {
        let mut agg = Aggregator::new();
        for (i, tag) in tags.iter().enumerate() {
            agg.system(Level::Info, format!("tag{tag} #{i}"), None);
        }
        agg.set_filter(format!("tag{wanted}"));

        let matching: Vec<String> = agg
            .buffer()
            .iter()
            .filter(|r| r.testable.contains(&format!("tag{wanted}")))
            .map(|r| r.reason.clone())
            .collect();
        let view = view_reasons(&agg);

        prop_assert!(!view.is_empty());
        if matching.is_empty() {
            prop_assert_eq!(view, vec![NO_MATCH_REASON.to_string()]);
        } else {
            let start = matching.len().saturating_sub(DISPLAY_WINDOW);
            prop_assert_eq!(view, matching[start..].to_vec());
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Nothing matches: the placeholder comes from the viewer's own logger.
#[test]
fn no_match_shows_placeholder() {
    let mut agg = Aggregator::new();
    numbered(&mut agg, 3);
    agg.set_filter("^nothing-like-this$");
    let view = agg.view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].reason, NO_MATCH_REASON);
    assert_eq!(view[0].label, vec!["skein".to_string()]);
}

/// The filter sees label chains, reason and raw payload text.
#[test]
fn filter_matches_labels_and_payload() {
    let mut agg = aggregator_with(&[
        add_frame(1, &[], "app"),
        add_frame(2, &[1], "db"),
        log_frame(2, Level::Info, "query", json!({"table": "users"})),
        log_frame(1, Level::Info, "tick", json!("heartbeat")),
    ]);

    agg.set_filter("app,db");
    assert_view!(agg, ["query"]);

    agg.set_filter("\"table\":\"users\"");
    assert_view!(agg, ["query"]);

    agg.set_filter("heartbeat");
    assert_view!(agg, ["tick"]);
}

/// An invalid pattern keeps its text, reports itself, and hides nothing.
#[test]
fn invalid_filter_matches_everything() {
    let mut agg = Aggregator::new();
    numbered(&mut agg, 3);
    agg.set_filter("line [");
    let filter = agg.buffer().filter();
    assert!(!filter.valid());
    assert!(!filter.active());
    assert_eq!(filter.raw_text(), "line [");
    assert_eq!(view_reasons(&agg), vec!["line 0", "line 1", "line 2"]);
}

/// Clearing the filter restores the unfiltered view.
#[test]
fn empty_filter_shows_everything() {
    let mut agg = Aggregator::new();
    numbered(&mut agg, 3);
    agg.set_filter("line 1");
    assert_view!(agg, ["line 1"]);
    agg.set_filter("");
    assert_view!(agg, ["line 0", "line 1", "line 2"]);
}
