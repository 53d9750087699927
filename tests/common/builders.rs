//! Test builders — wire frames, byte streams, and populated viewer state.
//!
//! These favour readability over flexibility and panic on invalid input.

use bytes::BytesMut;
use serde_json::{json, Value};
use skein_core::protocol::{decode_stream, Batch};
use skein_core::{Aggregator, Level, LoggerId};

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// An `add` frame, terminator included.
pub fn add_frame(id: LoggerId, parent_path: &[LoggerId], label: &str) -> String {
    let body = json!({
        "cmd": "add",
        "data": { "id": id, "parentPath": parent_path, "label": label },
    });
    format!("{body}\r\n")
}

/// A `log` frame, terminator included. `Value::Null` omits the payload.
pub fn log_frame(logger_id: LoggerId, level: Level, reason: &str, payload: Value) -> String {
    let mut data = json!({ "loggerID": logger_id, "level": level.code(), "reason": reason });
    if !payload.is_null() {
        data["payload"] = payload;
    }
    format!("{}\r\n", json!({ "cmd": "log", "data": data }))
}

/// Concatenate frames into one byte stream.
pub fn stream<S: AsRef<str>>(frames: &[S]) -> Vec<u8> {
    frames
        .iter()
        .flat_map(|f| f.as_ref().as_bytes().iter().copied())
        .collect()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Feed `chunks` through one connection buffer, returning every batch.
pub fn decode_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Vec<Batch> {
    let mut buffer = BytesMut::new();
    chunks
        .into_iter()
        .map(|chunk| decode_stream(&mut buffer, chunk))
        .filter(|batch| !batch.is_empty())
        .collect()
}

/// Split `bytes` at the given cut points (sorted, deduplicated, in range).
pub fn split_at_points(bytes: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (bytes.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();
    let mut out = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for p in points {
        out.push(bytes[start..p].to_vec());
        start = p;
    }
    out.push(bytes[start..].to_vec());
    out
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// An aggregator that has applied `frames` as one arrival.
pub fn aggregator_with<S: AsRef<str>>(frames: &[S]) -> Aggregator {
    let mut agg = Aggregator::new();
    let mut buffer = BytesMut::new();
    agg.dispatch_batch(decode_stream(&mut buffer, &stream(frames)));
    agg
}

/// Reasons of the current view, oldest first.
pub fn view_reasons(agg: &Aggregator) -> Vec<String> {
    agg.view().iter().map(|r| r.reason.clone()).collect()
}
