//! Countdown to the next top-of-hour boundary.
//!
//! Like the rest of the core this is wall-clock based and has no internal
//! thread: the caller samples a [`Clock`] on its own polling interval and
//! builds a [`Countdown`] from the instant it got back. Local time is used
//! so that half-hour time zones see the boundary the game actually uses,
//! and so that system clock changes are picked up on the next sample.
//!
//! ```text
//! 12:54:59.600  ->  05:00  (300_400 ms)
//! 12:59:59.250  ->  00:00  at_top
//! 13:00:00.000  ->  60:00  (3_600_000 ms)
//! ```

use std::cell::Cell;

use chrono::{DateTime, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

pub const MS_PER_HOUR: u64 = 60 * 60 * 1000;

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now
            .set(self.now.get() + chrono::Duration::milliseconds(ms));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Time remaining until the next top of the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    ms_until_next_hour: u64,
}

impl Countdown {
    /// Countdown as seen from `now` in its own time zone.
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        // Leap seconds report nanos >= 1e9; clamp them into the last second.
        let millis = u64::from(now.nanosecond() / 1_000_000).min(999);
        let into_hour = u64::from(now.minute()) * 60_000 + u64::from(now.second()) * 1_000 + millis;
        Self {
            ms_until_next_hour: MS_PER_HOUR - into_hour.min(MS_PER_HOUR - 1),
        }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::at(&clock.now())
    }

    /// Build directly from a remaining-millisecond count, capped at one hour.
    pub fn from_ms(ms_until_next_hour: u64) -> Self {
        Self {
            ms_until_next_hour: ms_until_next_hour.min(MS_PER_HOUR),
        }
    }

    pub fn ms_until_next_hour(&self) -> u64 {
        self.ms_until_next_hour
    }

    pub fn minutes(&self) -> u64 {
        self.ms_until_next_hour / 60_000
    }

    pub fn seconds(&self) -> u64 {
        (self.ms_until_next_hour % 60_000) / 1_000
    }

    /// Zero-padded `mm:ss`.
    pub fn mmss(&self) -> String {
        format!("{:02}:{:02}", self.minutes(), self.seconds())
    }

    /// True while the display reads `00:00`.
    pub fn at_top(&self) -> bool {
        self.minutes() == 0 && self.seconds() == 0
    }
}
