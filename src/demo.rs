//! `skein demo`: a small program that logs the way a real client would.
//!
//! Builds the hierarchy
//!
//! ```text
//! app ─┬─ db
//!      └─ http ── auth
//! cache
//! ```
//!
//! and emits a round of records per tick, including a burst of REMOTE
//! records on `cache` so the rate limiter is visible in the viewer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use skein_client::{Client, Level, TcpTransport};

/// Connect to the viewer at `addr`, emit `rounds` rounds, then flush.
pub async fn run(addr: SocketAddr, rounds: usize, interval: Duration) -> anyhow::Result<()> {
    let transport = Arc::new(TcpTransport::connect(addr));
    let client = Client::new(transport.clone());

    tracing::info!(%addr, rounds, "emitting demo records");
    emit(&client, rounds, interval).await;

    client.flush();
    transport.finish().await;
    tracing::info!("demo finished");
    Ok(())
}

/// Emit the sample hierarchy and `rounds` rounds of records through `client`.
pub async fn emit(client: &Client, rounds: usize, interval: Duration) {
    let app = client.create("app");
    let db = app.create_child("db");
    let http = app.create_child("http");
    let auth = http.create_child("auth");
    let cache = client.create("cache");

    app.info("starting", json!({ "pid": std::process::id(), "rounds": rounds }));

    for round in 0..rounds {
        let user = format!("user-{}", round % 5);
        let rows = db.debug("query users", json!({ "table": "users", "rows": round * 3 }));
        http.log(format!("GET /users/{user}"), ());
        let allowed = auth.spy("token check", Level::Debug, round % 4 != 3);
        if !allowed {
            auth.warn("token expired", json!({ "user": user }));
        }
        if round % 7 == 6 {
            http.error("upstream timeout", json!({ "after_ms": 3000, "rows": rows }));
        }
        for hit in 0..5 {
            cache.remote("hit ratio", json!({ "round": round, "sample": hit }));
        }
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }

    app.info("shutting down", ());
}
