//! The arithmetic (civil) Islamic calendar: a 30-year cycle with 11 leap years, alternating
//! months of 30 and 29 days and a leap day at the end of the twelfth month.

use num_integer::Integer;

use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::math::Modulo;

/// Days between the Gregorian epoch and the Islamic one. 1 Muharram 1 is 0622-07-16 Julian.
pub const GREGORIAN_DIFF: i64 = 227_015;

pub fn is_leap_year(year: i64) -> bool {
    (14 + 11 * year).modulo(30) < 11
}

pub fn month_length(month: u32, year: i64) -> u32 {
    match month {
        12 if is_leap_year(year) => 30,
        1..=12 if month % 2 == 1 => 30,
        1..=12 => 29,
        _ => 0,
    }
}

pub fn fixed_from_islamic(year: i64, month: u32, day: u32) -> i64 {
    let month = month as i64;
    GREGORIAN_DIFF - 1
        + (year - 1) * 354
        + (3 + 11 * year).div_floor(&30)
        + 29 * (month - 1)
        + month.div_floor(&2)
        + day as i64
}

pub fn islamic_from_fixed(fixed: i64) -> (i64, u32, u32) {
    let year = (30 * (fixed - GREGORIAN_DIFF) + 10646).div_floor(&10631);
    let prior_days = fixed - fixed_from_islamic(year, 1, 1);
    let month = (11 * prior_days + 330).div_floor(&325) as u32;
    let day = (fixed - fixed_from_islamic(year, month, 1) + 1) as u32;
    (year, month, day)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Islamic;

impl CalendarPolicy for Islamic {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Islamic
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
            355
        } else {
            354
        }
    }
}

impl Calendar for Islamic {
    const EPOCH: f64 = 1_948_439.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_islamic(year, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        islamic_from_fixed(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::{fixed_from_gregorian, gregorian_from_fixed};
    use crate::calendar::julian::julian_from_fixed;
    use crate::rata_die::GREGORIAN_EPOCH;
    use proptest::prelude::*;

    #[test]
    fn test_epoch() {
        assert_eq!(fixed_from_islamic(1, 1, 1), GREGORIAN_DIFF);
        assert_eq!(julian_from_fixed(GREGORIAN_DIFF), (622, 7, 16));
        assert_eq!(gregorian_from_fixed(GREGORIAN_DIFF), (622, 7, 19));
        assert_eq!(Islamic::EPOCH - GREGORIAN_EPOCH, GREGORIAN_DIFF as f64);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(gregorian_from_fixed(fixed_from_islamic(1445, 1, 1)), (2023, 7, 19));
        assert_eq!(gregorian_from_fixed(fixed_from_islamic(1446, 1, 1)), (2024, 7, 8));
        assert_eq!(gregorian_from_fixed(fixed_from_islamic(1445, 9, 1)), (2024, 3, 11));
        assert_eq!(islamic_from_fixed(fixed_from_gregorian(2024, 1, 1)), (1445, 6, 19));
    }

    #[test]
    fn test_month_length() {
        assert_eq!(month_length(1, 1445), 30);
        assert_eq!(month_length(2, 1445), 29);
        assert!(is_leap_year(1445));
        assert_eq!(month_length(12, 1445), 30);
        assert!(!is_leap_year(1446));
        assert_eq!(month_length(12, 1446), 29);
        assert_eq!(month_length(13, 1446), 0);
        // 11 leap years in every 30.
        assert_eq!((1..=30).filter(|&y| is_leap_year(y)).count(), 11);
    }

    proptest! {
        #[test]
        fn round_trip(fixed in -1_000_000i64..1_500_000) {
            let (year, month, day) = islamic_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= month_length(month, year));
            prop_assert_eq!(fixed_from_islamic(year, month, day), fixed);
        }

        #[test]
        fn leap_years_have_355_days(year in -3000i64..3000) {
            let length = fixed_from_islamic(year + 1, 1, 1) - fixed_from_islamic(year, 1, 1);
            prop_assert_eq!(length == 355, is_leap_year(year));
            prop_assert_eq!(length as u32, Islamic.days_in_year(year));
        }
    }
}
