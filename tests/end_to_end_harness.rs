#![allow(unused)]
//! End-to-end harness: client → TCP → server → aggregator.
//!
//! # What this covers
//!
//! - **Full pipeline**: a `Client` over `TcpTransport` talking to a real
//!   `Server` on `127.0.0.1:0`; the aggregator sees resolved records.
//! - **Raw peers**: a hand-written byte stream, split mid-frame, is
//!   reassembled by the server.
//! - **Lifecycle records**: "log server online", "client connected" and
//!   "client disconnected" appear, and a disconnect keeps earlier records.
//! - **Concurrent clients**: two connections interleave without corrupting
//!   each other's frames.
//!
//! # Running
//!
//! ```sh
//! cargo test --test end_to_end_harness
//! ```

mod common;
use common::*;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use skein_client::{Client, TcpTransport};
use skein_core::{Aggregator, Level};
use skein_server::{DisconnectReason, Server, ServerEvent};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

const DEADLINE: Duration = Duration::from_secs(5);

async fn start_server() -> (SocketAddr, mpsc::UnboundedReceiver<ServerEvent>) {
    let server = Server::bind("127.0.0.1:0").await.expect("bind");
    let addr = server.local_addr().expect("addr");
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(server.run(tx));
    (addr, rx)
}

/// Apply events until `disconnects` connections have closed.
async fn apply_until_disconnects(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    agg: &mut Aggregator,
    disconnects: usize,
) {
    let mut seen = 0;
    while seen < disconnects {
        let event = tokio::time::timeout(DEADLINE, rx.recv())
            .await
            .expect("server event in time")
            .expect("server still running");
        if let ServerEvent::Disconnected { reason, .. } = &event {
            assert_eq!(*reason, DisconnectReason::Closed);
            seen += 1;
        }
        event.apply(agg);
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

/// A → B registered by a real client; B's record shows ["A", "B"] in shade 7.
#[tokio::test]
async fn client_records_reach_the_viewer_resolved() {
    let (addr, mut rx) = start_server().await;
    let mut agg = Aggregator::new();

    let transport = Arc::new(TcpTransport::connect(addr));
    let client = Client::new(transport.clone());
    let options = skein_client::LoggerOptions::default;
    let a = client.create_with("A", options().id(1));
    let b = client.create_with("B", options().id(2).parent_path(vec![a.id()]));
    b.log("hello", json!({"n": 1}));
    client.flush();
    transport.finish().await;

    apply_until_disconnects(&mut rx, &mut agg, 1).await;

    let view = agg.view();
    let hello = view
        .iter()
        .find(|r| r.reason == "hello")
        .copied()
        .expect("hello record");
    assert_label!(*hello, ["A", "B"]);
    assert_eq!(hello.color_index, 7);

    let reasons = view_reasons(&agg);
    assert_eq!(reasons.first().map(String::as_str), Some("log server online"));
    assert!(reasons.contains(&"client connected".to_string()));
    assert!(reasons.contains(&"added logger [B]".to_string()));
    assert_eq!(reasons.last().map(String::as_str), Some("client disconnected"));
}

/// A raw peer writing a frame in two pieces and an unknown logger id.
#[tokio::test]
async fn split_writes_are_reassembled() {
    let (addr, mut rx) = start_server().await;
    let mut agg = Aggregator::new();

    let bytes = stream(&[
        add_frame(1, &[], "raw"),
        log_frame(1, Level::Info, "first", json!(null)),
        log_frame(42, Level::Warn, "stray", json!("?")),
    ]);
    let (head, tail) = bytes.split_at(bytes.len() / 2);

    let mut peer = TcpStream::connect(addr).await.expect("connect");
    peer.write_all(head).await.expect("write head");
    peer.flush().await.expect("flush");
    tokio::time::sleep(Duration::from_millis(20)).await;
    peer.write_all(tail).await.expect("write tail");
    drop(peer);

    apply_until_disconnects(&mut rx, &mut agg, 1).await;

    let view = agg.view();
    let first = view.iter().find(|r| r.reason == "first").copied().expect("first");
    assert_label!(*first, ["raw"]);
    let stray = view.iter().find(|r| r.reason == "stray").copied().expect("stray");
    assert_label!(*stray, ["LOGGER_WITH_ID_42"]);
    assert!(!view.iter().any(|r| r.level == Level::Error));
}

// ---------------------------------------------------------------------------
// Concurrent clients
// ---------------------------------------------------------------------------

/// Two clients with distinct id ranges; every record arrives intact.
#[tokio::test]
async fn concurrent_clients_do_not_corrupt_frames() {
    let (addr, mut rx) = start_server().await;
    let mut agg = Aggregator::new();

    let mut writers = Vec::new();
    for (base, name) in [(100u64, "left"), (200u64, "right")] {
        writers.push(tokio::spawn(async move {
            let transport = Arc::new(TcpTransport::connect(addr));
            let client = Client::new(transport.clone());
            let log = client.create_with(name, skein_client::LoggerOptions::default().id(base));
            for i in 0..3 {
                log.info(format!("{name} {i}"), i);
            }
            transport.finish().await;
        }));
    }
    for writer in writers {
        writer.await.expect("writer task");
    }

    apply_until_disconnects(&mut rx, &mut agg, 2).await;

    let errors: Vec<_> = agg
        .buffer()
        .iter()
        .filter(|r| r.level == Level::Error)
        .map(|r| r.reason.clone())
        .collect();
    assert!(errors.is_empty(), "{errors:?}");
    for name in ["left", "right"] {
        for i in 0..3 {
            let reason = format!("{name} {i}");
            let record = agg
                .buffer()
                .iter()
                .find(|r| r.reason == reason)
                .unwrap_or_else(|| panic!("missing {reason}"));
            assert_eq!(record.label, vec![name.to_string()]);
        }
    }
}
