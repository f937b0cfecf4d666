use std::cmp::Ordering;
use std::time::SystemTime;

use num_integer::Integer;
use numcmp::NumCmp;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::Modulo;

/// Julian Day of RD 0, i.e. midnight at the start of 0000-12-31 (proleptic Gregorian).
pub const GREGORIAN_EPOCH: f64 = 1_721_424.5;
/// Julian Day of J2000.0 (2000-01-01T12:00 TT).
pub const J2000: f64 = 2_451_545.0;
/// RD of 1970-01-01.
pub const UNIX_EPOCH: i64 = 719_163;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

// The classic 32-bit time_t range, 1970-01-01 through 2038-01-19T03:14:07Z.
const MAX_UNIX_MILLIS: i64 = i32::MAX as i64 * MS_PER_SECOND;
// The range ECMAScript-style extended time values cover.
const MAX_EXTENDED_UNIX_DAYS: f64 = 100_000_000.0;

pub(crate) fn round_to_millis(days: f64) -> f64 {
    (days * MS_PER_DAY as f64).round() / MS_PER_DAY as f64
}

/// A point in time counted in days (with fraction) since the Gregorian epoch.
///
/// RD 1.0 is 0001-01-01T00:00 UTC in the proleptic Gregorian calendar. Every calendar
/// converts through this value. Days are mean solar days of exactly 86,400 seconds; there
/// are no leap seconds.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RataDie(f64);

impl RataDie {
    pub fn new(days: f64) -> Self {
        RataDie(round_to_millis(days))
    }

    pub fn from_julian_day(jd: f64) -> Self {
        Self::new(jd - GREGORIAN_EPOCH)
    }

    pub fn from_unix_millis(millis: i64) -> Self {
        let (days, ms) = millis.div_mod_floor(&MS_PER_DAY);
        Self::new((UNIX_EPOCH + days) as f64 + ms as f64 / MS_PER_DAY as f64)
    }

    pub fn from_system_time(value: SystemTime) -> Self {
        Self::from_unix_millis(system_time_to_unix_millis(value))
    }

    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The day this instant falls on.
    pub fn floor(self) -> i64 {
        self.0.floor() as i64
    }

    /// Fraction of the day elapsed since midnight, in `[0, 1)`.
    pub fn fraction(self) -> f64 {
        self.0 - self.0.floor()
    }

    pub fn julian_day(self) -> f64 {
        self.0 + GREGORIAN_EPOCH
    }

    /// Milliseconds since the Unix epoch, if the instant is within the range of a 32-bit
    /// `time_t`.
    pub fn unix_millis(self) -> Option<i64> {
        let millis = ((self.0 - UNIX_EPOCH as f64) * MS_PER_DAY as f64).round();
        match (millis.num_cmp(0i64), millis.num_cmp(MAX_UNIX_MILLIS)) {
            (Some(Ordering::Less), _) | (_, Some(Ordering::Greater)) | (None, _) => None,
            _ => Some(millis as i64),
        }
    }

    /// Milliseconds since the Unix epoch, for instants up to 100,000,000 days either side
    /// of it.
    pub fn extended_unix_millis(self) -> Result<i64> {
        let days = self.0 - UNIX_EPOCH as f64;
        if !days.is_finite() || days.abs() > MAX_EXTENDED_UNIX_DAYS {
            return Err(Error::UnrepresentableUnixTime { rata_die: self.0 });
        }
        Ok((days * MS_PER_DAY as f64).round() as i64)
    }

    pub fn add_days(self, days: f64) -> Self {
        Self::new(self.0 + days)
    }

    /// Day of the week, 0 for Sunday through 6 for Saturday. `offset` is the time zone
    /// offset in fractions of a day; the weekday is that of the local date.
    pub fn day_of_week(self, offset: f64) -> u32 {
        local_day(self.0, offset).modulo(7) as u32
    }

    /// The latest instant at or before this one that falls on weekday `dow`, at the same
    /// local time of day.
    pub fn on_or_before(self, dow: u32, offset: f64) -> Self {
        let day = local_day(self.0, offset);
        Self::new(self.0 - (day - dow as i64).modulo(7) as f64)
    }

    pub fn on_or_after(self, dow: u32, offset: f64) -> Self {
        let day = local_day(self.0, offset);
        Self::new(self.0 + 6.0 - (day + 6 - dow as i64).modulo(7) as f64)
    }

    /// Like `on_or_before` but never returns the same day.
    pub fn before(self, dow: u32, offset: f64) -> Self {
        let day = local_day(self.0, offset);
        Self::new(self.0 - 1.0 - (day - 1 - dow as i64).modulo(7) as f64)
    }

    pub fn after(self, dow: u32, offset: f64) -> Self {
        let day = local_day(self.0, offset);
        Self::new(self.0 + 7.0 - (day + 7 - dow as i64).modulo(7) as f64)
    }

    /// Day count relative to a calendar whose own day zero starts at Julian Day `epoch`.
    pub fn to_calendar_epoch(self, epoch: f64) -> f64 {
        self.0 + (GREGORIAN_EPOCH - epoch)
    }

    pub fn from_calendar_epoch(days: f64, epoch: f64) -> Self {
        Self::new(days - (GREGORIAN_EPOCH - epoch))
    }
}

fn local_day(rd: f64, offset: f64) -> i64 {
    (rd + offset).floor() as i64
}

fn system_time_to_unix_millis(value: SystemTime) -> i64 {
    match value.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

/// A Julian Day split into whole days and the fraction since noon.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JulianDay {
    days: i64,
    fraction: f64,
}

impl JulianDay {
    pub fn new(jd: f64) -> Self {
        let days = jd.floor();
        JulianDay {
            days: days as i64,
            fraction: jd - days,
        }
    }

    pub fn value(&self) -> f64 {
        self.days as f64 + self.fraction
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn add_days(&self, days: f64) -> Self {
        Self::new(self.value() + days)
    }
}

impl From<RataDie> for JulianDay {
    fn from(rd: RataDie) -> Self {
        JulianDay::new(rd.julian_day())
    }
}

impl From<JulianDay> for RataDie {
    fn from(jd: JulianDay) -> Self {
        RataDie::from_julian_day(jd.value())
    }
}
