//! skein-server — the viewer's TCP ingest loop.
//!
//! [`Server::run`] accepts connections and spawns one task per connection.
//! Each task owns its own [`FrameCodec`] buffer and forwards every decoded
//! batch as a [`ServerEvent`] over an unbounded channel. The receiving side
//! (the app loop) owns the [`Aggregator`] and applies events one at a time
//! with [`ServerEvent::apply`], so registry and buffer mutation never needs a
//! lock. Batches from one connection arrive in order; batches from different
//! connections interleave in whatever order the tasks deliver them.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use skein_core::protocol::{Batch, FrameCodec};
use skein_core::{Aggregator, Level};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;

pub use skein_core::protocol::DEFAULT_PORT;

/// Per-server connection counter value.
pub type ConnectionId = u64;

/// Pause after a failed `accept` so a persistent error cannot spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something that happened on the listening socket or a connection.
#[derive(Debug)]
pub enum ServerEvent {
    Listening(SocketAddr),
    Connected {
        conn: ConnectionId,
        peer: SocketAddr,
    },
    /// One flush of a connection's frame buffer.
    Batch {
        conn: ConnectionId,
        frames: Batch,
    },
    Disconnected {
        conn: ConnectionId,
        reason: DisconnectReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed the stream.
    Closed,
    /// No terminated batch arrived within the configured idle timeout.
    /// Bytes of an unfinished frame do not count as activity.
    IdleTimeout,
    /// Reading from the socket failed.
    Error(String),
}

impl ServerEvent {
    /// Apply this event to the viewer state.
    pub fn apply(self, aggregator: &mut Aggregator) {
        match self {
            ServerEvent::Listening(addr) => aggregator.system(
                Level::Log,
                "log server online",
                Some(Value::String(addr.to_string())),
            ),
            ServerEvent::Connected { peer, .. } => aggregator.system(
                Level::Info,
                "client connected",
                Some(Value::String(peer.to_string())),
            ),
            ServerEvent::Batch { frames, .. } => aggregator.dispatch_batch(frames),
            ServerEvent::Disconnected { reason, .. } => match reason {
                DisconnectReason::Closed => {
                    aggregator.system(Level::Info, "client disconnected", None)
                }
                DisconnectReason::IdleTimeout => {
                    aggregator.system(Level::Warn, "idle client disconnected", None)
                }
                DisconnectReason::Error(err) => aggregator.system(
                    Level::Warn,
                    "client connection failed",
                    Some(Value::String(err)),
                ),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct Server {
    listener: TcpListener,
    idle_timeout: Option<Duration>,
}

impl Server {
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            idle_timeout: None,
        })
    }

    /// Drop connections that deliver no complete batch for `idle_timeout`,
    /// even if partial frame bytes keep trickling in. `None` keeps
    /// them open indefinitely.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the event receiver is dropped.
    pub async fn run(self, events: mpsc::UnboundedSender<ServerEvent>) {
        match self.listener.local_addr() {
            Ok(addr) => {
                tracing::info!(%addr, "log server listening");
                let _ = events.send(ServerEvent::Listening(addr));
            }
            Err(err) => tracing::warn!(error = %err, "could not read listener address"),
        }

        let mut next_conn: ConnectionId = 0;
        loop {
            let accepted = tokio::select! {
                _ = events.closed() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    let conn = next_conn;
                    next_conn += 1;
                    tracing::debug!(conn, %peer, "connection accepted");
                    if events.send(ServerEvent::Connected { conn, peer }).is_err() {
                        break;
                    }
                    tokio::spawn(serve_connection(
                        conn,
                        stream,
                        self.idle_timeout,
                        events.clone(),
                    ));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
        tracing::info!("log server stopped");
    }
}

async fn serve_connection(
    conn: ConnectionId,
    stream: TcpStream,
    idle_timeout: Option<Duration>,
    events: mpsc::UnboundedSender<ServerEvent>,
) {
    let mut frames = FramedRead::new(stream, FrameCodec);

    let reason = loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, frames.next()).await {
                Ok(next) => next,
                Err(_) => break DisconnectReason::IdleTimeout,
            },
            None => frames.next().await,
        };

        match next {
            Some(Ok(batch)) => {
                tracing::debug!(conn, frames = batch.len(), "batch decoded");
                if events.send(ServerEvent::Batch { conn, frames: batch }).is_err() {
                    return;
                }
            }
            Some(Err(err)) => break DisconnectReason::Error(err.to_string()),
            None => break DisconnectReason::Closed,
        }
    };

    tracing::debug!(conn, ?reason, "connection finished");
    let _ = events.send(ServerEvent::Disconnected { conn, reason });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
