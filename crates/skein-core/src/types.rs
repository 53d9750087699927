//! Core types for skein-core.
//!
//! This module defines the data shared by every layer: the [`Level`] enum,
//! the wire-level [`LoggerDescriptor`] and [`LogMessage`] payloads, the
//! resolved [`LoggerRecord`] held by the registry, and the ingested
//! [`LogRecord`] held by the log buffer.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::{color_index, DEFAULT_COLOR_INDEX};

/// Logger identifier. Unique only within the process that minted it.
pub type LoggerId = u64;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Log severity, encoded on the wire as `1..=6`.
///
/// `Debug < Log < Info < Warn < Error`. [`Level::Remote`] is the rate-limited
/// category and is not ordered against the severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    Debug = 1,
    Log = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Remote = 6,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Log,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Remote,
    ];

    /// Wire code of this level.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Level::Remote, Level::Remote) => Some(Ordering::Equal),
            (Level::Remote, _) | (_, Level::Remote) => None,
            (a, b) => a.code().partial_cmp(&b.code()),
        }
    }
}

/// Wire code outside `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0}")]
pub struct UnknownLevel(pub u8);

impl TryFrom<u8> for Level {
    type Error = UnknownLevel;

    fn try_from(code: u8) -> Result<Self, UnknownLevel> {
        match code {
            1 => Ok(Level::Debug),
            2 => Ok(Level::Log),
            3 => Ok(Level::Info),
            4 => Ok(Level::Warn),
            5 => Ok(Level::Error),
            6 => Ok(Level::Remote),
            other => Err(UnknownLevel(other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.code()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Debug => write!(f, "DEBUG"),
            Level::Log => write!(f, "LOG"),
            Level::Info => write!(f, "INFO"),
            Level::Warn => write!(f, "WARN"),
            Level::Error => write!(f, "ERROR"),
            Level::Remote => write!(f, "REMOTE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// Body of an `add` frame: a logger as announced by its owning process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerDescriptor {
    pub id: LoggerId,
    /// Ancestor ids, root first.
    #[serde(rename = "parentPath", default)]
    pub parent_path: Vec<LoggerId>,
    pub label: String,
    #[serde(default = "enabled_by_default", skip_serializing_if = "is_enabled")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

impl LoggerDescriptor {
    /// A root logger descriptor (empty parent path, enabled).
    pub fn root(id: LoggerId, label: impl Into<String>) -> Self {
        Self {
            id,
            parent_path: Vec::new(),
            label: label.into(),
            enabled: true,
        }
    }

    /// A child descriptor under `parent`.
    pub fn child_of(parent: &LoggerDescriptor, id: LoggerId, label: impl Into<String>) -> Self {
        let mut parent_path = parent.parent_path.clone();
        parent_path.push(parent.id);
        Self {
            id,
            parent_path,
            label: label.into(),
            enabled: true,
        }
    }

    /// Root ancestor id, or the logger's own id when it has no parent.
    pub fn base_logger_id(&self) -> LoggerId {
        self.parent_path.first().copied().unwrap_or(self.id)
    }
}

/// Body of a `log` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    #[serde(rename = "loggerID")]
    pub logger_id: LoggerId,
    pub level: Level,
    pub reason: String,
    /// `None` when the frame carried no payload or an explicit `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

// ---------------------------------------------------------------------------
// Resolved records
// ---------------------------------------------------------------------------

/// A logger as resolved by the [`Registry`](crate::Registry).
///
/// `extended_label.len() == parent_path.len() + 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerRecord {
    pub id: LoggerId,
    pub label: String,
    pub parent_path: Vec<LoggerId>,
    pub base_logger_id: LoggerId,
    /// Ancestor labels root-first, then the logger's own label.
    pub extended_label: Vec<String>,
    pub color_index: usize,
    pub enabled: bool,
}

impl LoggerRecord {
    /// Resolve a root logger, which needs no registry lookups.
    pub fn root(id: LoggerId, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id,
            extended_label: vec![label.clone()],
            label,
            parent_path: Vec::new(),
            base_logger_id: id,
            color_index: color_index(id),
            enabled: true,
        }
    }
}

/// A log record as stored in the [`LogBuffer`](crate::LogBuffer).
///
/// `label`, `color_index` and `testable` are cached at ingestion and never
/// recomputed, even if the logger is later re-registered.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub logger_id: LoggerId,
    pub level: Level,
    pub reason: String,
    pub payload: Option<Value>,
    /// Resolved label chain, or a one-element placeholder for unknown loggers.
    pub label: Vec<String>,
    pub color_index: usize,
    /// Text the view filter is matched against.
    pub testable: String,
    /// Ingestion time on the viewer.
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl LogRecord {
    /// Build a record from a wire message, resolving its logger if known.
    pub fn from_message(message: LogMessage, origin: Option<&LoggerRecord>) -> Self {
        let (label, color_index) = match origin {
            Some(logger) => (logger.extended_label.clone(), logger.color_index),
            None => (
                vec![unresolved_label(message.logger_id)],
                DEFAULT_COLOR_INDEX,
            ),
        };
        let testable = testable_text(&label, &message.reason, message.payload.as_ref());
        Self {
            logger_id: message.logger_id,
            level: message.level,
            reason: message.reason,
            payload: message.payload,
            label,
            color_index,
            testable,
            received_at: chrono::Utc::now(),
        }
    }

    /// Build a record emitted by a logger owned by the viewer itself.
    pub fn emitted_by(
        logger: &LoggerRecord,
        level: Level,
        reason: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self::from_message(
            LogMessage {
                logger_id: logger.id,
                level,
                reason: reason.into(),
                payload,
            },
            Some(logger),
        )
    }
}

/// Placeholder label for a logger id the registry has never seen.
pub fn unresolved_label(id: LoggerId) -> String {
    format!("LOGGER_WITH_ID_{id}")
}

/// `label,chain reason raw-payload`.
fn testable_text(label: &[String], reason: &str, payload: Option<&Value>) -> String {
    format!("{} {} {}", label.join(","), reason, raw_payload_text(payload))
}

/// Payload as raw text: string contents unquoted, empty for no payload,
/// compact JSON otherwise.
pub fn raw_payload_text(payload: Option<&Value>) -> String {
    match payload {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
