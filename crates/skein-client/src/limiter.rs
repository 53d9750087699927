//! Leading-edge rate limiter for the REMOTE emission path.
//!
//! The first call of a burst fires immediately. Later calls inside the quiet
//! window are suppressed; the most recent suppressed value is kept and fires
//! at `min(last_call + quiet, first_suppressed + max_wait)`. With the default
//! windows that bounds the delay of any suppressed call to [`REMOTE_MAX_WAIT`].
//!
//! The limiter holds no timer. Callers arm one when [`Admission::Suppressed`]
//! reports `arm_timer`, and call [`RateLimiter::poll`] once it expires. A
//! caller without a timer polls before each [`RateLimiter::call`] so an
//! overdue value still goes out.

use std::time::Duration;

use tokio::time::Instant;

pub const REMOTE_QUIET: Duration = Duration::from_millis(500);
pub const REMOTE_MAX_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq, Eq)]
pub enum Admission<T> {
    /// Send this value now.
    Fire(T),
    /// Held back until `deadline`. `arm_timer` is set when this call opened
    /// a new pending slot and nothing is waiting on it yet.
    Suppressed { deadline: Instant, arm_timer: bool },
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    first_suppressed: Instant,
}

#[derive(Debug)]
pub struct RateLimiter<T> {
    quiet: Duration,
    max_wait: Duration,
    last_call: Option<Instant>,
    pending: Option<Pending<T>>,
}

impl<T> Default for RateLimiter<T> {
    fn default() -> Self {
        Self::new(REMOTE_QUIET, REMOTE_MAX_WAIT)
    }
}

impl<T> RateLimiter<T> {
    pub fn new(quiet: Duration, max_wait: Duration) -> Self {
        Self {
            quiet,
            max_wait,
            last_call: None,
            pending: None,
        }
    }

    pub fn call(&mut self, now: Instant, value: T) -> Admission<T> {
        let quiet_elapsed = self
            .last_call
            .map_or(true, |last| now.saturating_duration_since(last) >= self.quiet);
        self.last_call = Some(now);

        if quiet_elapsed && self.pending.is_none() {
            return Admission::Fire(value);
        }

        let arm_timer = match self.pending.as_mut() {
            Some(pending) => {
                pending.value = value;
                false
            }
            None => {
                self.pending = Some(Pending {
                    value,
                    first_suppressed: now,
                });
                true
            }
        };

        match self.deadline() {
            Some(deadline) => Admission::Suppressed { deadline, arm_timer },
            // pending was just filled above
            None => Admission::Suppressed {
                deadline: now + self.max_wait,
                arm_timer,
            },
        }
    }

    /// When the pending value is due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        let pending = self.pending.as_ref()?;
        let max = pending.first_suppressed + self.max_wait;
        Some(match self.last_call {
            Some(last) => (last + self.quiet).min(max),
            None => max,
        })
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending value and forget the current burst.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.last_call = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
