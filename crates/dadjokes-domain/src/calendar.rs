//! Calendar-day policy.
//!
//! Streaks, history retention and reminders all depend on what "today" means
//! for the user. The policy is injected so the boundary is explicit and tests
//! can move time around freely.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone,
    Utc,
};
use std::sync::Mutex;

pub trait Calendar: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The user's current calendar day.
    fn today(&self) -> NaiveDate;

    /// Instant at which `time` occurs on `date` in the user's calendar.
    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc>;
}

/// Device-local calendar (follows the OS timezone, including DST changes).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCalendar;

impl Calendar for SystemCalendar {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Skipped by a DST jump: fire an hour later.
            LocalResult::None => Local
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }
}

/// Calendar pinned to a fixed UTC offset, immune to device timezone changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetCalendar {
    offset: FixedOffset,
}

impl FixedOffsetCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day `instant` falls on at this offset.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Calendar for FixedOffsetCalendar {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time) - Duration::seconds(self.offset.local_minus_utc() as i64);
        Utc.from_utc_datetime(&naive)
    }
}

/// Hand-driven calendar for tests and replays. Interprets days in UTC.
#[derive(Debug)]
pub struct ManualCalendar {
    now: Mutex<DateTime<Utc>>,
}

impl ManualCalendar {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Calendar positioned at `time` on `date` (UTC).
    pub fn at(date: NaiveDate, time: NaiveTime) -> Self {
        Self::new(Utc.from_utc_datetime(&date.and_time(time)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Calendar for ManualCalendar {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn today(&self) -> NaiveDate {
        self.lock().date_naive()
    }

    fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(time))
    }
}
