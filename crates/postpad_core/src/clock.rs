//! Clock seam and reference timezone for calendar-day logic.
//!
//! Streak dates are taken in one configured `ReferenceZone` instead of the
//! host locale, so results do not depend on where the process runs.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Largest accepted distance from UTC, in minutes.
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Fixed UTC offset used to turn instants into calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Returns `None` when the offset is outside ±18h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return None;
        }
        FixedOffset::east_opt(minutes * 60).map(|offset| Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Calendar date of `instant` in this zone.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.date_of(clock.now())
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::utc()
    }
}
