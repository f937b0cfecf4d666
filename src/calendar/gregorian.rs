// The gregorian calendar works in cycles of 400 years. From the start of a cycle every 4th
// year is a leap year, except for every 100th year, and the cycle ends with a leap century.
// So each cycle has 97 leap years and 303 normal years: 97*366 + 303*365 = 146097 days.
//
// Counting from day 1 (0001-01-01), each period ends with its leap day: a quadrennium ends
// with a leap year and a cycle ends with the leap century. That lets a division whose
// quotient is clamped absorb the extra day of the final period, instead of special-casing
// December 31 of leap years.

use num_integer::Integer;

use super::{month_from_ordinal, Calendar, CalendarKind, CalendarPolicy};
use crate::math::{ClampedDivRem, Modulo};
use crate::rata_die::GREGORIAN_EPOCH;

const GREGORIAN_CYCLE_DAYS: i64 = 97 * 366 + 303 * 365;
const GREGORIAN_CENTURY_DAYS: i64 = 24 * 366 + 76 * 365;
#[allow(clippy::identity_op)]
const GREGORIAN_QUADRENNIUM_DAYS: i64 = 3 * 365 + 1 * 366;
const GREGORIAN_YEAR_DAYS: i64 = 365;

// 0-based day of the year each month starts on.
pub(crate) const MONTH_STARTS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
pub(crate) const MONTH_STARTS_LEAP_YEAR: [u32; 12] =
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

const MONTH_LENGTHS_NON_LEAP_YEAR: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub fn is_leap_year(year: i64) -> bool {
    // Get offset into cycle first so negative years behave.
    let year = year.modulo(400);
    year % 4 == 0 && (year % 100 != 0 || year == 0)
}

pub fn month_length(month: u32, year: i64) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => MONTH_LENGTHS_NON_LEAP_YEAR[(month - 1) as usize],
        _ => 0,
    }
}

pub(crate) fn month_starts(year: i64) -> &'static [u32; 12] {
    if is_leap_year(year) {
        &MONTH_STARTS_LEAP_YEAR
    } else {
        &MONTH_STARTS
    }
}

pub fn fixed_from_gregorian(year: i64, month: u32, day: u32) -> i64 {
    let prior_years = year - 1;
    365 * prior_years
        + prior_years.div_floor(&4)
        - prior_years.div_floor(&100)
        + prior_years.div_floor(&400)
        + month_starts(year)[(month - 1) as usize] as i64
        + day as i64
}

/// Gregorian year of a fixed day, and the 0-based day within that year.
pub fn year_and_ordinal_from_fixed(fixed: i64) -> (i64, u32) {
    let (cycle, days_into_cycle) = (fixed - 1).div_mod_floor(&GREGORIAN_CYCLE_DAYS);

    // The first three centuries of each cycle are normal centuries with 24 leap years and 76
    // normal years. The fourth one has a leap year at its end as well.
    let (century, days_into_century) =
        days_into_cycle.clamped_div_rem(GREGORIAN_CENTURY_DAYS, 3_u8);

    // Each quadrennium ends with its leap day. The last quadrennium of the first three
    // centuries lacks it, so it is one day short and a plain division is enough.
    let (quadrennium, days_into_quadrennium) =
        days_into_century.div_rem(&GREGORIAN_QUADRENNIUM_DAYS);

    let (years_into_quadrennium, days_into_year) =
        days_into_quadrennium.clamped_div_rem(GREGORIAN_YEAR_DAYS, 3_u8);

    let year = 400 * cycle
        + 100 * century as i64
        + 4 * quadrennium
        + years_into_quadrennium as i64
        + 1;
    (year, days_into_year as u32)
}

pub fn year_from_fixed(fixed: i64) -> i64 {
    year_and_ordinal_from_fixed(fixed).0
}

pub fn gregorian_from_fixed(fixed: i64) -> (i64, u32, u32) {
    let (year, ordinal) = year_and_ordinal_from_fixed(fixed);
    let starts = month_starts(year);
    let month = month_from_ordinal(ordinal, starts);
    let day = ordinal - starts[(month - 1) as usize] + 1;
    (year, month, day)
}

/// The proleptic Gregorian calendar.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Gregorian;

impl CalendarPolicy for Gregorian {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Gregorian
    }

    fn num_months(&self, _year: i64) -> u32 {
        12
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        month_length(month, year)
    }

    fn is_leap_year(&self, year: i64) -> bool {
        is_leap_year(year)
    }

    fn days_in_year(&self, year: i64) -> u32 {
        if is_leap_year(year) {
            366
        } else {
            365
        }
    }
}

impl Calendar for Gregorian {
    const EPOCH: f64 = GREGORIAN_EPOCH;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_gregorian(year, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        gregorian_from_fixed(fixed)
    }
}
