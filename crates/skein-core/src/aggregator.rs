//! Aggregator — the viewer's dispatch boundary.
//!
//! Owns the [`Registry`] and [`LogBuffer`] and applies decoded frames to
//! them. Every failure that reaches this point (bad frames, unresolvable
//! `add`s) is turned into a visible ERROR record; nothing here can fail.
//!
//! The aggregator is not `Sync`-shared: the app loop owns it exclusively and
//! applies connection batches in the order they are delivered.

use serde_json::Value;

use crate::protocol::{Message, ProtocolError};
use crate::registry::Registry;
use crate::store::LogBuffer;
use crate::types::{Level, LogMessage, LogRecord, LoggerDescriptor, LoggerId, LoggerRecord};

/// Id of the viewer's own logger. Reserved; a client registering it would
/// replace the viewer's label in the registry.
pub const VIEWER_LOGGER_ID: LoggerId = LoggerId::MAX;
pub const VIEWER_LOGGER_LABEL: &str = "skein";

#[derive(Debug)]
pub struct Aggregator {
    registry: Registry,
    buffer: LogBuffer,
    origin: LoggerRecord,
    revision: u64,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        let mut registry = Registry::new();
        let origin = registry
            .register_root(VIEWER_LOGGER_ID, VIEWER_LOGGER_LABEL)
            .clone();
        let buffer = LogBuffer::new(&origin);
        Self {
            registry,
            buffer,
            origin,
            revision: 0,
        }
    }

    /// Apply one decoded frame.
    pub fn dispatch(&mut self, frame: Result<Message, ProtocolError>) {
        match frame {
            Ok(Message::Add(descriptor)) => self.add_logger(descriptor),
            Ok(Message::Log(message)) => self.ingest(message),
            Err(err) => {
                tracing::debug!(error = %err, "rejected frame");
                self.system(
                    Level::Error,
                    "malformed frame",
                    Some(Value::String(err.to_string())),
                );
            }
        }
    }

    /// Apply a whole batch in order.
    pub fn dispatch_batch<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Result<Message, ProtocolError>>,
    {
        for frame in batch {
            self.dispatch(frame);
        }
    }

    /// Resolve a client log message against the registry and append it.
    pub fn ingest(&mut self, message: LogMessage) {
        let origin = self.registry.lookup(message.logger_id);
        let record = LogRecord::from_message(message, origin);
        self.append(record);
    }

    /// Append a record attributed to the viewer's own logger.
    pub fn system(&mut self, level: Level, reason: impl Into<String>, payload: Option<Value>) {
        let record = LogRecord::emitted_by(&self.origin, level, reason, payload);
        self.append(record);
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.buffer.set_filter(text);
        self.revision += 1;
    }

    pub fn view(&self) -> Vec<&LogRecord> {
        self.buffer.view()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// The viewer's own logger.
    pub fn origin(&self) -> &LoggerRecord {
        &self.origin
    }

    /// Incremented on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn add_logger(&mut self, descriptor: LoggerDescriptor) {
        let label = descriptor.label.clone();
        match self.registry.register(descriptor) {
            Ok(record) => {
                tracing::debug!(id = record.id, label = %record.label, "logger registered");
                self.system(Level::Log, format!("added logger [{label}]"), None);
            }
            Err(err) => {
                tracing::debug!(error = %err, "logger registration failed");
                self.system(
                    Level::Error,
                    "could not add logger:",
                    Some(Value::String(err.to_string())),
                );
            }
        }
    }

    fn append(&mut self, record: LogRecord) {
        self.buffer.append(record);
        self.revision += 1;
    }
}
