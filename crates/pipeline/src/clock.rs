//! Clock - injectable time source
//!
//! Lets tests pin the timestamps a pipeline assigns to batches. The
//! pipeline reads the clock exactly once per batch, at ingress.

use chrono::{DateTime, Utc};

/// A source of wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
