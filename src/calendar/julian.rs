use num_integer::Integer;

use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::math::Modulo;

/// Fixed day of 0001-01-01 in the Julian calendar, which is 0000-12-30 Gregorian.
pub const JULIAN_EPOCH: i64 = -1;

const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Years before the common era count -1, -2, ... with no year 0. Year -1 is a leap year.
pub fn is_leap_year(year: i64) -> bool {
    year.modulo(4) == if year > 0 { 0 } else { 3 }
}

pub fn month_length(month: u32, year: i64) -> u32 {
    match (month, year) {
        (_, 0) => 0,
        (2, _) if is_leap_year(year) => 29,
        (1..=12, _) => MONTH_LENGTHS[(month - 1) as usize],
        _ => 0,
    }
}

pub fn fixed_from_julian(year: i64, month: u32, day: u32) -> i64 {
    let y = if year < 0 { year + 1 } else { year };
    let month = month as i64;
    let leap_correction = if month <= 2 {
        0
    } else if is_leap_year(year) {
        -1
    } else {
        -2
    };
    JULIAN_EPOCH - 1
        + 365 * (y - 1)
        + (y - 1).div_floor(&4)
        + (367 * month - 362).div_floor(&12)
        + leap_correction
        + day as i64
}

pub fn julian_from_fixed(fixed: i64) -> (i64, u32, u32) {
    let approx = (4 * (fixed - JULIAN_EPOCH) + 1464).div_floor(&1461);
    let year = if approx <= 0 { approx - 1 } else { approx };
    let prior_days = fixed - fixed_from_julian(year, 1, 1);
    let correction = if fixed < fixed_from_julian(year, 3, 1) {
        0
    } else if is_leap_year(year) {
        1
    } else {
        2
    };
    let month = (12 * (prior_days + correction) + 373).div_floor(&367) as u32;
    let day = (fixed - fixed_from_julian(year, month, 1) + 1) as u32;
    (year, month, day)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Julian;

impl CalendarPolicy for Julian {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Julian
    }

    fn num_months(&self, year: i64) -> u32 {
        if year == 0 {
            0
        } else {
            12
        }
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        month_length(month, year)
    }

    fn is_leap_year(&self, year: i64) -> bool {
        is_leap_year(year)
    }
}

impl Calendar for Julian {
    const EPOCH: f64 = 1_721_422.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_julian(year, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        julian_from_fixed(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::fixed_from_gregorian;
    use proptest::prelude::*;

    #[test]
    fn test_is_leap_year() {
        assert!(is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(-1));
        assert!(is_leap_year(-5));
        assert!(!is_leap_year(-4));
    }

    #[test]
    fn test_gregorian_reform() {
        // The day after Julian 1582-10-04 was Gregorian 1582-10-15.
        assert_eq!(
            fixed_from_julian(1582, 10, 5),
            fixed_from_gregorian(1582, 10, 15)
        );
        assert_eq!(fixed_from_julian(1582, 10, 5), 577_736);
        assert_eq!(julian_from_fixed(738_886), (2023, 12, 19));
    }

    #[test]
    fn test_no_year_zero() {
        assert_eq!(fixed_from_julian(1, 1, 1), JULIAN_EPOCH);
        assert_eq!(julian_from_fixed(JULIAN_EPOCH - 1), (-1, 12, 31));
        assert_eq!(fixed_from_julian(-1, 1, 1), -367);
        assert_eq!(month_length(1, 0), 0);
        assert_eq!(Julian.num_months(0), 0);
        assert_eq!(Julian.days_in_year(-1), 366);
    }

    proptest! {
        #[test]
        fn round_trip(fixed in -1_000_000i64..1_500_000) {
            let (year, month, day) = julian_from_fixed(fixed);
            prop_assert_ne!(year, 0);
            prop_assert!(day >= 1 && day <= month_length(month, year));
            prop_assert_eq!(fixed_from_julian(year, month, day), fixed);
        }

        #[test]
        fn leap_years_have_366_days(year in 1i64..5000) {
            let length = fixed_from_julian(year + 1, 1, 1) - fixed_from_julian(year, 1, 1);
            prop_assert_eq!(length == 366, is_leap_year(year));
            prop_assert_eq!(length as u32, Julian.days_in_year(year));
        }
    }
}
