//! Transports carry encoded frames from a [`Client`](crate::Client) to the
//! viewer.
//!
//! [`TcpTransport`] is the real one. [`MemoryTransport`] keeps frames in
//! memory and can be switched offline to exercise the failure path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::SinkExt;
use parking_lot::Mutex;
use skein_core::protocol::{decode_stream, encode_frame, FrameCodec};
use skein_core::Message;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;

#[derive(Debug, thiserror::Error)]
pub enum TransportWriteError {
    #[error("connection to the viewer is not established")]
    NotConnected,
    #[error("connection to the viewer is closed")]
    Closed,
    #[error("frame could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sends one frame. Implementations must not block on the network.
pub trait Transport: Send + Sync {
    fn send(&self, message: &Message) -> Result<(), TransportWriteError>;
}

// ---------------------------------------------------------------------------
// TCP
// ---------------------------------------------------------------------------

/// Writes frames to the viewer from a background task.
///
/// Frames sent before the connection is up are queued and written once it
/// is. If connecting or writing fails the task ends and every later `send`
/// reports the error.
pub struct TcpTransport {
    tx: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    connected: Arc<AtomicBool>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl TcpTransport {
    /// Start connecting to `addr`. Must be called inside a tokio runtime.
    pub fn connect(addr: SocketAddr) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));
        let writer = tokio::spawn(write_frames(addr, rx, connected.clone()));
        Self {
            tx: Mutex::new(Some(tx)),
            connected,
            writer: Mutex::new(Some(writer)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Stop accepting frames and wait until everything queued is written.
    pub async fn finish(&self) {
        self.tx.lock().take();
        let writer = self.writer.lock().take();
        if let Some(writer) = writer {
            if let Err(err) = writer.await {
                tracing::warn!(target: "skein::client", error = %err, "frame writer task failed");
            }
        }
    }
}

impl Transport for TcpTransport {
    fn send(&self, message: &Message) -> Result<(), TransportWriteError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(TransportWriteError::Closed)?;
        tx.send(message.clone()).map_err(|_| {
            if self.is_connected() {
                TransportWriteError::Closed
            } else {
                TransportWriteError::NotConnected
            }
        })
    }
}

async fn write_frames(
    addr: SocketAddr,
    mut rx: mpsc::UnboundedReceiver<Message>,
    connected: Arc<AtomicBool>,
) {
    let stream = match TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(target: "skein::client", %addr, error = %err, "could not reach viewer");
            return;
        }
    };
    connected.store(true, Ordering::Release);
    tracing::debug!(target: "skein::client", %addr, "connected to viewer");

    let mut sink = FramedWrite::new(stream, FrameCodec);
    while let Some(message) = rx.recv().await {
        if let Err(err) = sink.send(message).await {
            tracing::warn!(target: "skein::client", error = %err, "write to viewer failed");
            break;
        }
    }
    connected.store(false, Ordering::Release);
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Records encoded frames instead of sending them.
#[derive(Debug)]
pub struct MemoryTransport {
    frames: Mutex<Vec<Bytes>>,
    online: AtomicBool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every `send` fails with [`TransportWriteError::NotConnected`].
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    /// Raw frames, terminators included.
    pub fn frames(&self) -> Vec<Bytes> {
        self.frames.lock().clone()
    }

    /// Frames decoded back into messages, in send order.
    pub fn messages(&self) -> Vec<Message> {
        let mut buffer = bytes::BytesMut::new();
        self.frames
            .lock()
            .iter()
            .flat_map(|frame| decode_stream(&mut buffer, frame))
            .filter_map(Result::ok)
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn send(&self, message: &Message) -> Result<(), TransportWriteError> {
        if !self.online.load(Ordering::Acquire) {
            return Err(TransportWriteError::NotConnected);
        }
        let frame = encode_frame(message)?;
        self.frames.lock().push(frame);
        Ok(())
    }
}
