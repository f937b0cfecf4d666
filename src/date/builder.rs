use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{check_range, Date, DateFields};
use crate::calendar::han::{elapsed_year, CYCLE_YEARS};
use crate::calendar::hebrew::{parts_to_millis, PARTS_PER_HOUR};
use crate::calendar::{Calendar, CalendarKind};
use crate::error::{Error, Result};
use crate::rata_die::MS_PER_HOUR;
use crate::timezone::TimeZone;

/// Collects date fields one at a time. Month and day default to 1, the time of day to
/// midnight.
///
/// `cycle` is only meaningful for the Han calendar, where `year` is then the year within
/// the cycle. `parts` is only meaningful for the Hebrew calendar, and replaces the minute,
/// second and millisecond.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBuilder {
    year: Option<i64>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millisecond: Option<u32>,
    cycle: Option<i64>,
    parts: Option<u32>,
}

impl DateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(&mut self, year: i64) -> &mut Self {
        self.year = Some(year);
        self
    }

    pub fn month(&mut self, month: u32) -> &mut Self {
        self.month = Some(month);
        self
    }

    pub fn day(&mut self, day: u32) -> &mut Self {
        self.day = Some(day);
        self
    }

    pub fn hour(&mut self, hour: u32) -> &mut Self {
        self.hour = Some(hour);
        self
    }

    pub fn minute(&mut self, minute: u32) -> &mut Self {
        self.minute = Some(minute);
        self
    }

    pub fn second(&mut self, second: u32) -> &mut Self {
        self.second = Some(second);
        self
    }

    pub fn millisecond(&mut self, millisecond: u32) -> &mut Self {
        self.millisecond = Some(millisecond);
        self
    }

    pub fn cycle(&mut self, cycle: i64) -> &mut Self {
        self.cycle = Some(cycle);
        self
    }

    pub fn parts(&mut self, parts: u32) -> &mut Self {
        self.parts = Some(parts);
        self
    }

    /// A builder preloaded with `fields`.
    pub fn from_fields(fields: &DateFields) -> Self {
        DateBuilder {
            year: Some(fields.year),
            month: Some(fields.month),
            day: Some(fields.day),
            hour: Some(fields.hour),
            minute: Some(fields.minute),
            second: Some(fields.second),
            millisecond: Some(fields.millisecond),
            cycle: None,
            parts: None,
        }
    }

    // Year in the calendar's own count.
    fn resolve_year(&self, kind: CalendarKind) -> Result<i64> {
        let year = self.year.ok_or(Error::MissingField("year"))?;
        match (self.cycle, kind) {
            (None, _) => Ok(year),
            (Some(cycle), CalendarKind::Han) => {
                if !(1..=CYCLE_YEARS).contains(&year) {
                    return Err(Error::InvalidDateComponents {
                        field: "year",
                        value: year,
                    });
                }
                Ok(elapsed_year(cycle, year))
            }
            (Some(cycle), _) => Err(Error::InvalidDateComponents {
                field: "cycle",
                value: cycle,
            }),
        }
    }

    fn resolve_time(&self, kind: CalendarKind) -> Result<i64> {
        let hour = self.hour.unwrap_or(0) as i64;
        check_range("hour", hour, 24)?;
        match (self.parts, kind) {
            (None, _) => {
                let fields = DateFields::new(0, 1, 1).with_time(
                    hour as u32,
                    self.minute.unwrap_or(0),
                    self.second.unwrap_or(0),
                    self.millisecond.unwrap_or(0),
                );
                fields.validate_time()?;
                Ok(fields.time_of_day_millis())
            }
            (Some(parts), CalendarKind::Hebrew) => {
                check_range("parts", parts as i64, PARTS_PER_HOUR)?;
                Ok(hour * MS_PER_HOUR + parts_to_millis(parts as i64))
            }
            (Some(parts), _) => Err(Error::InvalidDateComponents {
                field: "parts",
                value: parts as i64,
            }),
        }
    }

    /// A date from the collected fields, taken as UTC.
    pub fn build<C: Calendar>(&self, calendar: C) -> Result<Date<C>> {
        self.build_with_zone(calendar, None)
    }

    /// A date from the collected fields, taken as wall-clock time in `zone`.
    pub fn build_in<C: Calendar>(&self, calendar: C, zone: Arc<dyn TimeZone>) -> Result<Date<C>> {
        self.build_with_zone(calendar, Some(zone))
    }

    pub(crate) fn build_with_zone<C: Calendar>(
        &self,
        calendar: C,
        zone: Option<Arc<dyn TimeZone>>,
    ) -> Result<Date<C>> {
        let kind = calendar.kind();
        let year = self.resolve_year(kind)?;
        let time = self.resolve_time(kind)?;
        Date::from_components(
            calendar,
            year,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
            time,
            zone,
        )
    }
}
