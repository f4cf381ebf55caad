//! Clock abstraction and calendar-day helpers.
//!
//! Attendance marking and the roster both bucket records by "today". The day
//! boundary is local midnight in a fixed UTC offset, and every time-dependent
//! operation reads "now" through [`Clock`] so tests can pin it.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

use crate::error::{DomainError, DomainResult};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.write() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Start of the calendar day containing `now`, with midnight taken in `offset`.
pub fn start_of_day(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = calendar_day(now, offset).and_time(NaiveTime::MIN);
    let utc_midnight = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc_midnight)
}

/// Calendar day (in `offset`) that `at` falls on.
pub fn calendar_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// The server's notion of where one attendance day ends and the next begins.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DayBoundary {
    offset: FixedOffset,
}

impl DayBoundary {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Midnight in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// The server's local offset as of startup. DST changes after startup are not
    /// picked up.
    pub fn local() -> Self {
        Self::new(*Local::now().offset())
    }

    pub fn from_offset_minutes(minutes: i32) -> DomainResult<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| DomainError::validation(format!("utc offset out of range: {minutes} minutes")))
    }

    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        start_of_day(now, self.offset)
    }

    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        calendar_day(at, self.offset)
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::local()
    }
}
