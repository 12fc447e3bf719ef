//! Simulated clock

use chrono::{DateTime, Utc};
use nel_pipeline::Clock;
use parking_lot::Mutex;

/// A [`Clock`] that gives tests full control over which times are
/// reported. Initially reports the Unix epoch.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    current: Mutex<DateTime<Utc>>,
}

impl SimulatedClock {
    /// A clock pinned to the Unix epoch.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(DateTime::UNIX_EPOCH),
        }
    }

    /// A clock pinned to a specific time.
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(time),
        }
    }

    /// Move the clock.
    pub fn set(&self, time: DateTime<Utc>) {
        *self.current.lock() = time;
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
