//! Wire protocol — CRLF-terminated JSON frames over a byte stream.
//!
//! ```text
//! {"cmd":"add","data":{"id":1,"parentPath":[0],"label":"net"}}\r\n
//! {"cmd":"log","data":{"loggerID":1,"level":3,"reason":"up","payload":{...}}}\r\n
//! ```
//!
//! There is no handshake, acknowledgement or version field.
//!
//! # Framing
//!
//! A connection accumulates bytes until the buffer *ends* with the
//! terminator. At that point the whole buffer is split on the terminator,
//! empty tokens are dropped, every token is parsed independently and the
//! buffer is cleared. Frames that arrive together are therefore delivered
//! together as one batch, in arrival order. A bad token yields one
//! [`ProtocolError`] in the batch without affecting its siblings.
//!
//! The framing does not escape embedded terminators. JSON string encoding
//! already escapes raw `\r` and `\n`, so this only matters for hand-written
//! frames.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::codec::{Decoder, Encoder};

use crate::types::{LogMessage, LoggerDescriptor};

/// Frame terminator.
pub const TERMINATOR: &[u8] = b"\r\n";

/// Port the viewer listens on.
pub const DEFAULT_PORT: u16 = 3001;

/// Longest token prefix kept in a [`ProtocolError::Malformed`] diagnostic.
const TOKEN_PREVIEW_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd", content = "data", rename_all = "lowercase")]
pub enum Message {
    /// Register (or re-register) a logger.
    Add(LoggerDescriptor),
    /// A log record.
    Log(LogMessage),
}

/// The outer `{cmd, data}` shape, before the command is known.
#[derive(Deserialize)]
struct Envelope {
    cmd: String,
    #[serde(default)]
    data: Value,
}

/// A single frame token failed to decode.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame {token:?}: {source}")]
    Malformed {
        token: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown command {cmd:?}")]
    UnknownCommand { cmd: String },
}

impl Message {
    /// Parse one frame token (without its terminator).
    pub fn parse(token: &str) -> Result<Self, ProtocolError> {
        let malformed = |source| ProtocolError::Malformed {
            token: preview(token),
            source,
        };

        let envelope: Envelope = serde_json::from_str(token).map_err(malformed)?;
        match envelope.cmd.as_str() {
            "add" => serde_json::from_value(envelope.data)
                .map(Message::Add)
                .map_err(malformed),
            "log" => serde_json::from_value(envelope.data)
                .map(Message::Log)
                .map_err(malformed),
            _ => Err(ProtocolError::UnknownCommand { cmd: envelope.cmd }),
        }
    }
}

fn preview(token: &str) -> String {
    token.chars().take(TOKEN_PREVIEW_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize `message` and append the terminator.
pub fn encode_frame(message: &Message) -> Result<Bytes, serde_json::Error> {
    let mut frame = serde_json::to_vec(message)?;
    frame.extend_from_slice(TERMINATOR);
    Ok(Bytes::from(frame))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Everything parsed from one flush of a connection buffer.
pub type Batch = Vec<Result<Message, ProtocolError>>;

/// Append `incoming` to a connection buffer and flush it if it now ends with
/// the terminator. Returns an empty batch while still accumulating.
pub fn decode_stream(buffer: &mut BytesMut, incoming: &[u8]) -> Batch {
    buffer.extend_from_slice(incoming);
    take_batch(buffer).unwrap_or_default()
}

fn take_batch(buffer: &mut BytesMut) -> Option<Batch> {
    if buffer.is_empty() || !buffer.ends_with(TERMINATOR) {
        return None;
    }
    let pending = buffer.split();
    let text = String::from_utf8_lossy(&pending);
    Some(
        text.split("\r\n")
            .filter(|token| !token.is_empty())
            .map(Message::parse)
            .collect(),
    )
}

/// [`Decoder`]/[`Encoder`] pair for the frame format.
///
/// Each successful `decode` yields one whole [`Batch`]. The buffer is owned by
/// the `FramedRead` wrapping a single connection and is never shared.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Batch;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Batch>, Self::Error> {
        Ok(take_batch(src))
    }

    /// A partial frame left at end of stream is dropped, not an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Batch>, Self::Error> {
        if let Some(batch) = take_batch(src) {
            return Ok(Some(batch));
        }
        if !src.is_empty() {
            tracing::warn!(bytes = src.len(), "dropping unterminated frame at end of stream");
            src.clear();
        }
        Ok(None)
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + TERMINATOR.len());
        dst.extend_from_slice(&json);
        dst.extend_from_slice(TERMINATOR);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
