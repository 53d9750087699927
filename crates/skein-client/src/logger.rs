//! The logger facade: [`Client`] mints [`Logger`]s, loggers emit records.
//!
//! Emission never fails from the caller's point of view. Every emit method
//! hands back the payload it was given, so a call can wrap a value inline:
//!
//! ```ignore
//! let total = log.info("computed total", items.iter().sum::<u64>());
//! ```
//!
//! Transport failures are reported on the `skein::client` tracing target and
//! otherwise ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use skein_core::{Level, LogMessage, LoggerDescriptor, LoggerId, LoggerRecord, Message, Registry};
use tokio::time::Instant;

use crate::limiter::{Admission, RateLimiter};
use crate::transport::Transport;

type RemoteLimiter = Arc<Mutex<RateLimiter<LogMessage>>>;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Overrides applied when creating a logger. Unset fields keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub id: Option<LoggerId>,
    pub parent_path: Option<Vec<LoggerId>>,
    pub enabled: Option<bool>,
}

impl LoggerOptions {
    pub fn id(mut self, id: LoggerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn parent_path(mut self, parent_path: Vec<LoggerId>) -> Self {
        self.parent_path = Some(parent_path);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

struct Shared {
    transport: Arc<dyn Transport>,
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    limiters: Mutex<Vec<Weak<Mutex<RateLimiter<LogMessage>>>>>,
}

impl Shared {
    fn transmit(&self, message: &Message) {
        if let Err(err) = self.transport.send(message) {
            tracing::warn!(target: "skein::client", error = %err, "ERROR WRITING TO SOCKET");
        }
    }
}

/// Process-wide logging context. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                registry: Mutex::new(Registry::new()),
                next_id: AtomicU64::new(0),
                limiters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a root logger.
    pub fn create(&self, label: impl Into<String>) -> Logger {
        self.create_with(label, LoggerOptions::default())
    }

    /// Create a logger, applying `options` over the defaults (fresh id, no
    /// parent, enabled). The logger is registered locally and announced to
    /// the viewer with an `add` frame.
    pub fn create_with(&self, label: impl Into<String>, options: LoggerOptions) -> Logger {
        let minted = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let descriptor = LoggerDescriptor {
            id: options.id.unwrap_or(minted),
            parent_path: options.parent_path.unwrap_or_default(),
            label: label.into(),
            enabled: options.enabled.unwrap_or(true),
        };

        if let Err(err) = self.shared.registry.lock().register(descriptor.clone()) {
            tracing::warn!(target: "skein::client", error = %err, "logger registered with unknown ancestry");
        }
        self.shared.transmit(&Message::Add(descriptor.clone()));

        let remote: RemoteLimiter = Arc::new(Mutex::new(RateLimiter::default()));
        {
            let mut limiters = self.shared.limiters.lock();
            limiters.retain(|weak| weak.strong_count() > 0);
            limiters.push(Arc::downgrade(&remote));
        }

        Logger {
            shared: self.shared.clone(),
            descriptor,
            remote,
        }
    }

    /// The locally resolved record for `id`, if it was created here.
    pub fn lookup(&self, id: LoggerId) -> Option<LoggerRecord> {
        self.shared.registry.lock().lookup(id).cloned()
    }

    /// Send every pending REMOTE record now. Call before shutting down.
    pub fn flush(&self) {
        let limiters: Vec<RemoteLimiter> = self
            .shared
            .limiters
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for limiter in limiters {
            let pending = limiter.lock().flush();
            if let Some(message) = pending {
                self.shared.transmit(&Message::Log(message));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// A node in the logger hierarchy. Cheap to clone; clones share the REMOTE
/// rate limiter.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    descriptor: LoggerDescriptor,
    remote: RemoteLimiter,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("id", &self.descriptor.id)
            .field("label", &self.descriptor.label)
            .field("parent_path", &self.descriptor.parent_path)
            .finish()
    }
}

impl Logger {
    pub fn id(&self) -> LoggerId {
        self.descriptor.id
    }

    pub fn label(&self) -> &str {
        &self.descriptor.label
    }

    pub fn parent_path(&self) -> &[LoggerId] {
        &self.descriptor.parent_path
    }

    pub fn enabled(&self) -> bool {
        self.descriptor.enabled
    }

    /// Create a child one level below this logger. The child records the
    /// path only; it stays usable after this logger is dropped.
    pub fn create_child(&self, label: impl Into<String>) -> Logger {
        let mut parent_path = self.descriptor.parent_path.clone();
        parent_path.push(self.descriptor.id);
        Client {
            shared: self.shared.clone(),
        }
        .create_with(label, LoggerOptions::default().parent_path(parent_path))
    }

    pub fn debug<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Debug, reason, payload)
    }

    pub fn log<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Log, reason, payload)
    }

    pub fn info<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Info, reason, payload)
    }

    pub fn warn<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Warn, reason, payload)
    }

    pub fn error<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Error, reason, payload)
    }

    /// Rate-limited emission: the first call of a burst is sent at once,
    /// later ones collapse into one trailing send at most 250 ms after the
    /// first suppressed call.
    pub fn remote<T: Serialize>(&self, reason: impl Into<String>, payload: T) -> T {
        self.emit(Level::Remote, reason, payload)
    }

    /// Log `value` under `label` at `level` and return it.
    pub fn spy<T: Serialize>(&self, label: impl Into<String>, level: Level, value: T) -> T {
        self.emit(level, label, value)
    }

    /// Emit at `level` and return `payload`. A payload serializing to
    /// `null` (such as `()`) is sent as no payload.
    pub fn emit<T: Serialize>(&self, level: Level, reason: impl Into<String>, payload: T) -> T {
        if self.descriptor.enabled {
            let message = LogMessage {
                logger_id: self.descriptor.id,
                level,
                reason: reason.into(),
                payload: to_payload(&payload),
            };
            match level {
                Level::Remote => self.emit_remote(message),
                _ => self.shared.transmit(&Message::Log(message)),
            }
        }
        payload
    }

    /// Send this logger's pending REMOTE record now.
    pub fn flush_remote(&self) {
        let pending = self.remote.lock().flush();
        if let Some(message) = pending {
            self.shared.transmit(&Message::Log(message));
        }
    }

    /// Drop this logger's pending REMOTE record.
    pub fn cancel_remote(&self) {
        self.remote.lock().cancel();
    }

    fn emit_remote(&self, message: LogMessage) {
        // Without a timer the pending record is released by the next call.
        let (overdue, admission) = {
            let mut limiter = self.remote.lock();
            let now = Instant::now();
            (limiter.poll(now), limiter.call(now, message))
        };
        if let Some(message) = overdue {
            self.shared.transmit(&Message::Log(message));
        }
        match admission {
            Admission::Fire(message) => self.shared.transmit(&Message::Log(message)),
            Admission::Suppressed {
                deadline,
                arm_timer: true,
            } => self.arm_remote_timer(deadline),
            Admission::Suppressed { .. } => {}
        }
    }

    fn arm_remote_timer(&self, deadline: Instant) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                target: "skein::client",
                "no tokio runtime; suppressed remote record waits for the next call or flush"
            );
            return;
        };
        let limiter = self.remote.clone();
        let shared = self.shared.clone();
        runtime.spawn(async move {
            let mut deadline = deadline;
            loop {
                tokio::time::sleep_until(deadline).await;
                let next = {
                    let mut limiter = limiter.lock();
                    match limiter.poll(Instant::now()) {
                        Some(message) => Ok(message),
                        None => Err(limiter.deadline()),
                    }
                };
                match next {
                    Ok(message) => {
                        shared.transmit(&Message::Log(message));
                        break;
                    }
                    Err(Some(later)) => deadline = later,
                    // flushed or cancelled meanwhile
                    Err(None) => break,
                }
            }
        });
    }
}

fn to_payload<T: Serialize>(payload: &T) -> Option<Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(target: "skein::client", error = %err, "payload is not serializable; sending without it");
            None
        }
    }
}
