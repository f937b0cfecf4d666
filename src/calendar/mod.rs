//! Leap-year rules, month lengths and the day-number arithmetic of each calendar.
//!
//! Every calendar converts between its own (year, month, day) and a *fixed* day number,
//! which is the integer part of a [`RataDie`](crate::RataDie): day 1 is 0001-01-01 in the
//! proleptic Gregorian calendar. Time of day is layered on top by
//! [`Date`](crate::Date).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rata_die::GREGORIAN_EPOCH;

pub mod ethiopic;
pub mod gregorian;
pub mod han;
pub mod hebrew;
pub mod islamic;
pub mod julian;
pub mod persian;
pub mod thai_solar;

pub use ethiopic::{Coptic, Ethiopic};
pub use gregorian::Gregorian;
pub use han::Han;
pub use hebrew::Hebrew;
pub use islamic::Islamic;
pub use julian::Julian;
pub use persian::{Persian, PersianAlgorithmic};
pub use thai_solar::ThaiSolar;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalendarKind {
    #[serde(rename = "gregorian")]
    Gregorian,
    #[serde(rename = "julian")]
    Julian,
    #[serde(rename = "coptic")]
    Coptic,
    #[serde(rename = "ethiopic")]
    Ethiopic,
    #[serde(rename = "hebrew")]
    Hebrew,
    #[serde(rename = "islamic")]
    Islamic,
    #[serde(rename = "persian-algo")]
    PersianAlgorithmic,
    #[serde(rename = "persian")]
    Persian,
    #[serde(rename = "han")]
    Han,
    #[serde(rename = "thaisolar")]
    ThaiSolar,
}

impl CalendarKind {
    pub const ALL: [CalendarKind; 10] = [
        CalendarKind::Gregorian,
        CalendarKind::Julian,
        CalendarKind::Coptic,
        CalendarKind::Ethiopic,
        CalendarKind::Hebrew,
        CalendarKind::Islamic,
        CalendarKind::PersianAlgorithmic,
        CalendarKind::Persian,
        CalendarKind::Han,
        CalendarKind::ThaiSolar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalendarKind::Gregorian => "gregorian",
            CalendarKind::Julian => "julian",
            CalendarKind::Coptic => "coptic",
            CalendarKind::Ethiopic => "ethiopic",
            CalendarKind::Hebrew => "hebrew",
            CalendarKind::Islamic => "islamic",
            CalendarKind::PersianAlgorithmic => "persian-algo",
            CalendarKind::Persian => "persian",
            CalendarKind::Han => "han",
            CalendarKind::ThaiSolar => "thaisolar",
        }
    }

    /// Whether dates in this calendar need the astronomical engine.
    pub fn is_astronomical(self) -> bool {
        matches!(self, CalendarKind::Persian | CalendarKind::Han)
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CalendarKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownCalendarType(s.to_string()))
    }
}

/// The shape of a calendar's years: how many months, how long each one is.
pub trait CalendarPolicy: fmt::Debug + Send + Sync {
    fn kind(&self) -> CalendarKind;

    fn num_months(&self, year: i64) -> u32;

    /// Length of `month` in `year`, or 0 if the year has no such month.
    fn month_length(&self, month: u32, year: i64) -> u32;

    fn is_leap_year(&self, year: i64) -> bool;

    fn days_in_year(&self, year: i64) -> u32 {
        (1..=self.num_months(year))
            .map(|month| self.month_length(month, year))
            .sum()
    }
}

/// A calendar that can convert its dates to and from fixed day numbers.
pub trait Calendar: CalendarPolicy + Clone + 'static {
    /// Julian Day at which the calendar's own day count is zero.
    const EPOCH: f64 = GREGORIAN_EPOCH;

    /// Hours from midnight to the start of the calendar day. Negative if the day starts on
    /// the previous evening.
    const DAY_START_HOURS: i64 = 0;

    /// Fixed day number of a date. The components must already be valid.
    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64;

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32);

    /// Fixed day number of the first day of `year`.
    fn new_year(&self, year: i64) -> i64 {
        self.fixed_from_date(year, 1, 1)
    }
}

/// Index of the month whose first day is at or before `ordinal`, given the 0-based day of
/// year each month starts on.
pub(crate) fn month_from_ordinal(ordinal: u32, month_starts: &[u32]) -> u32 {
    let index = crate::search::bsearch(&ordinal, month_starts);
    if index < month_starts.len() && month_starts[index] == ordinal {
        index as u32 + 1
    } else {
        index as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        for kind in CalendarKind::ALL {
            assert_eq!(kind.name().parse::<CalendarKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!(matches!(
            "mayan".parse::<CalendarKind>(),
            Err(Error::UnknownCalendarType(name)) if name == "mayan"
        ));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&CalendarKind::PersianAlgorithmic).unwrap();
        assert_eq!(json, "\"persian-algo\"");
        let kind: CalendarKind = serde_json::from_str("\"thaisolar\"").unwrap();
        assert_eq!(kind, CalendarKind::ThaiSolar);
    }

    #[test]
    fn test_month_from_ordinal() {
        let starts = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
        assert_eq!(month_from_ordinal(0, &starts), 1);
        assert_eq!(month_from_ordinal(30, &starts), 1);
        assert_eq!(month_from_ordinal(31, &starts), 2);
        assert_eq!(month_from_ordinal(58, &starts), 2);
        assert_eq!(month_from_ordinal(59, &starts), 3);
        assert_eq!(month_from_ordinal(333, &starts), 11);
        assert_eq!(month_from_ordinal(334, &starts), 12);
        assert_eq!(month_from_ordinal(364, &starts), 12);
    }
}
