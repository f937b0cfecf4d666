//! Dates with a time of day in any of the supported calendars.

use std::fmt;
use std::sync::{Arc, OnceLock};

use num_integer::Integer;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::han::{cycle_and_year, Han};
use crate::calendar::hebrew::{millis_to_parts, Hebrew, HebrewMonth};
use crate::calendar::Calendar;
use crate::error::{Error, Result};
use crate::rata_die::{
    JulianDay, RataDie, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
};
use crate::timezone::TimeZone;

mod builder;

pub use builder::DateBuilder;

/// The calendar fields of a date, in its local wall-clock time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateFields {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub second: u32,
    #[serde(default)]
    pub millisecond: u32,
}

impl DateFields {
    pub fn new(year: i64, month: u32, day: u32) -> Self {
        DateFields {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
        }
    }

    pub fn with_time(mut self, hour: u32, minute: u32, second: u32, millisecond: u32) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.millisecond = millisecond;
        self
    }

    /// Milliseconds since the start of the day.
    pub fn time_of_day_millis(&self) -> i64 {
        self.hour as i64 * MS_PER_HOUR
            + self.minute as i64 * MS_PER_MINUTE
            + self.second as i64 * MS_PER_SECOND
            + self.millisecond as i64
    }

    fn validate_time(&self) -> Result<()> {
        check_range("hour", self.hour as i64, 24)?;
        check_range("minute", self.minute as i64, 60)?;
        check_range("second", self.second as i64, 60)?;
        check_range("millisecond", self.millisecond as i64, 1000)
    }
}

// Keeps every calendar's fixed-date arithmetic well inside the extended Unix range.
const MAX_YEAR: i64 = 250_000;

pub(crate) fn check_range(field: &'static str, value: i64, end: i64) -> Result<()> {
    if (0..end).contains(&value) {
        Ok(())
    } else {
        debug!(field, value, "date component out of range");
        Err(Error::InvalidDateComponents { field, value })
    }
}

/// A moment in time expressed in a calendar `C`.
///
/// The moment itself is kept as a UTC [`RataDie`]. The calendar fields are those of the
/// local wall-clock time at `offset`, and are computed on first access.
#[derive(Clone, Debug)]
pub struct Date<C: Calendar> {
    calendar: C,
    rd: RataDie,
    // Local time minus UTC, in fractions of a day.
    offset: f64,
    zone: Option<Arc<dyn TimeZone>>,
    fields: OnceLock<DateFields>,
}

impl<C: Calendar> Date<C> {
    fn with_offset(calendar: C, rd: RataDie, offset: f64, zone: Option<Arc<dyn TimeZone>>) -> Self {
        Date {
            calendar,
            rd,
            offset,
            zone,
            fields: OnceLock::new(),
        }
    }

    pub fn from_rata_die(calendar: C, rd: RataDie) -> Self {
        Self::with_offset(calendar, rd, 0.0, None)
    }

    /// A date at UTC moment `rd`, with fields in the local time of `zone`.
    pub fn from_rata_die_in(calendar: C, rd: RataDie, zone: Arc<dyn TimeZone>) -> Self {
        let offset = zone.offset_millis(rd) as f64 / MS_PER_DAY as f64;
        Self::with_offset(calendar, rd, offset, Some(zone))
    }

    pub fn from_julian_day(calendar: C, jd: f64) -> Self {
        Self::from_rata_die(calendar, RataDie::from_julian_day(jd))
    }

    pub fn from_unix_millis(calendar: C, millis: i64) -> Self {
        Self::from_rata_die(calendar, RataDie::from_unix_millis(millis))
    }

    pub fn now(calendar: C) -> Self {
        Self::from_rata_die(calendar, RataDie::now())
    }

    /// A date from UTC fields.
    pub fn from_fields(calendar: C, fields: &DateFields) -> Result<Self> {
        fields.validate_time()?;
        Self::from_components(
            calendar,
            fields.year,
            fields.month,
            fields.day,
            fields.time_of_day_millis(),
            None,
        )
    }

    /// A date from wall-clock fields in `zone`.
    pub fn from_fields_in(
        calendar: C,
        fields: &DateFields,
        zone: Arc<dyn TimeZone>,
    ) -> Result<Self> {
        fields.validate_time()?;
        Self::from_components(
            calendar,
            fields.year,
            fields.month,
            fields.day,
            fields.time_of_day_millis(),
            Some(zone),
        )
    }

    pub(crate) fn from_components(
        calendar: C,
        year: i64,
        month: u32,
        day: u32,
        time_of_day_millis: i64,
        zone: Option<Arc<dyn TimeZone>>,
    ) -> Result<Self> {
        if !(-MAX_YEAR..=MAX_YEAR).contains(&year) {
            debug!(kind = %calendar.kind(), year, "year out of range");
            return Err(Error::InvalidDateComponents {
                field: "year",
                value: year,
            });
        }
        let months = calendar.num_months(year);
        let month_length = calendar.month_length(month, year);
        if month < 1 || month > months || month_length == 0 {
            debug!(kind = %calendar.kind(), year, month, "month out of range");
            return Err(Error::InvalidDateComponents {
                field: "month",
                value: month as i64,
            });
        }
        if day < 1 || day > month_length {
            debug!(kind = %calendar.kind(), year, month, day, "day out of range");
            return Err(Error::InvalidDateComponents {
                field: "day",
                value: day as i64,
            });
        }

        let fixed = calendar.fixed_from_date(year, month, day);
        let millis = time_of_day_millis + C::DAY_START_HOURS * MS_PER_HOUR;
        let local = RataDie::new(fixed as f64 + millis as f64 / MS_PER_DAY as f64);

        let date = match zone {
            Some(zone) => {
                let wall_offset = zone.offset_millis_wall_time(local);
                let rd = local.add_days(-(wall_offset as f64) / MS_PER_DAY as f64);
                // Differs from `wall_offset` when the wall time was skipped by a transition.
                let offset = zone.offset_millis(rd) as f64 / MS_PER_DAY as f64;
                Self::with_offset(calendar, rd, offset, Some(zone))
            }
            None => Self::from_rata_die(calendar, local),
        };
        Ok(date)
    }

    fn decompose(&self) -> DateFields {
        let local = self.rd.value() + self.offset - C::DAY_START_HOURS as f64 / 24.0;
        let total = (local * MS_PER_DAY as f64).round() as i64;
        let (fixed, millis) = total.div_mod_floor(&MS_PER_DAY);
        let (year, month, day) = self.calendar.date_from_fixed(fixed);
        let (hour, millis) = millis.div_rem(&MS_PER_HOUR);
        let (minute, millis) = millis.div_rem(&MS_PER_MINUTE);
        let (second, millisecond) = millis.div_rem(&MS_PER_SECOND);
        DateFields {
            year,
            month,
            day,
            hour: hour as u32,
            minute: minute as u32,
            second: second as u32,
            millisecond: millisecond as u32,
        }
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn time_zone(&self) -> Option<&Arc<dyn TimeZone>> {
        self.zone.as_ref()
    }

    pub fn fields(&self) -> &DateFields {
        self.fields.get_or_init(|| self.decompose())
    }

    pub fn year(&self) -> i64 {
        self.fields().year
    }

    pub fn month(&self) -> u32 {
        self.fields().month
    }

    pub fn day(&self) -> u32 {
        self.fields().day
    }

    pub fn hour(&self) -> u32 {
        self.fields().hour
    }

    pub fn minute(&self) -> u32 {
        self.fields().minute
    }

    pub fn second(&self) -> u32 {
        self.fields().second
    }

    pub fn millisecond(&self) -> u32 {
        self.fields().millisecond
    }

    pub fn rata_die(&self) -> RataDie {
        self.rd
    }

    pub fn julian_day(&self) -> JulianDay {
        self.rd.into()
    }

    pub fn unix_millis(&self) -> Option<i64> {
        self.rd.unix_millis()
    }

    pub fn extended_unix_millis(&self) -> Result<i64> {
        self.rd.extended_unix_millis()
    }

    /// Days since the calendar's own epoch.
    pub fn day_number(&self) -> f64 {
        self.rd.to_calendar_epoch(C::EPOCH)
    }

    /// Local time minus UTC, in fractions of a day.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn offset_millis(&self) -> i64 {
        (self.offset * MS_PER_DAY as f64).round() as i64
    }

    /// Local day of the week, 0 for Sunday.
    pub fn day_of_week(&self) -> u32 {
        self.rd.day_of_week(self.offset)
    }

    /// 1-based day within the calendar year.
    pub fn day_of_year(&self) -> u32 {
        let fields = self.fields();
        let fixed = self
            .calendar
            .fixed_from_date(fields.year, fields.month, fields.day);
        (fixed - self.calendar.new_year(fields.year) + 1) as u32
    }

    pub fn is_leap_year(&self) -> bool {
        self.calendar.is_leap_year(self.year())
    }

    pub fn days_in_month(&self) -> u32 {
        self.calendar.month_length(self.month(), self.year())
    }

    pub fn days_in_year(&self) -> u32 {
        self.calendar.days_in_year(self.year())
    }

    fn moved_to(&self, rd: RataDie) -> Self {
        let offset = match &self.zone {
            Some(zone) => zone.offset_millis(rd) as f64 / MS_PER_DAY as f64,
            None => self.offset,
        };
        Self::with_offset(self.calendar.clone(), rd, offset, self.zone.clone())
    }

    pub fn add_days(&self, days: f64) -> Self {
        self.moved_to(self.rd.add_days(days))
    }

    /// The latest date at or before this one that falls on `dow` in local time.
    pub fn on_or_before(&self, dow: u32) -> Self {
        self.moved_to(self.rd.on_or_before(dow, self.offset))
    }

    pub fn on_or_after(&self, dow: u32) -> Self {
        self.moved_to(self.rd.on_or_after(dow, self.offset))
    }

    pub fn before(&self, dow: u32) -> Self {
        self.moved_to(self.rd.before(dow, self.offset))
    }

    pub fn after(&self, dow: u32) -> Self {
        self.moved_to(self.rd.after(dow, self.offset))
    }

    /// The same moment in another calendar.
    pub fn convert<D: Calendar>(&self, calendar: D) -> Date<D> {
        Date::with_offset(calendar, self.rd, self.offset, self.zone.clone())
    }
}

impl<C: Calendar> PartialEq for Date<C> {
    fn eq(&self, other: &Self) -> bool {
        self.rd == other.rd
    }
}

impl<C: Calendar> fmt::Display for Date<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.fields();
        write!(
            f,
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
            d.year, d.month, d.day, d.hour, d.minute, d.second, d.millisecond
        )
    }
}

impl Date<Hebrew> {
    /// Halaqim elapsed in the current hour, 0 through 1079.
    pub fn parts(&self) -> u32 {
        let fields = self.fields();
        let millis = fields.time_of_day_millis() - fields.hour as i64 * MS_PER_HOUR;
        millis_to_parts(millis) as u32
    }

    pub fn month_name(&self) -> Option<HebrewMonth> {
        HebrewMonth::from_number(self.month(), self.year())
    }
}

impl Date<Han> {
    pub fn cycle(&self) -> i64 {
        cycle_and_year(self.year()).0
    }

    pub fn year_in_cycle(&self) -> i64 {
        cycle_and_year(self.year()).1
    }

    fn month_name(&self) -> (u32, bool) {
        let month_start = self.calendar.month_start(self.year(), self.month());
        self.calendar.month_name(month_start)
    }

    /// Traditional number of the month, 1 through 12. A leap month repeats the number of
    /// the month before it.
    pub fn month_number(&self) -> u32 {
        self.month_name().0
    }

    pub fn is_leap_month(&self) -> bool {
        self.month_name().1
    }
}
