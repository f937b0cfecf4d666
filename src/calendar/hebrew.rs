//! The Hebrew calendar. Months follow the Metonic cycle of 19 years with 7 leap years, and
//! the new year is postponed by up to two days so that it doesn't fall on a forbidden day of
//! the week.
//!
//! Months are numbered from Nisan, so the year starts with Tishri, month 7. In leap years
//! Adar I is month 12 and Adar II is month 13.

use std::fmt;

use num_integer::Integer;
use serde::{Deserialize, Serialize};

use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::math::Modulo;
use crate::rata_die::MS_PER_HOUR;

/// Fixed day of 1 Tishri 1, 3761-10-07 Julian.
pub const HEBREW_EPOCH: i64 = -1_373_427;

pub const NISAN: u32 = 1;
pub const TISHRI: u32 = 7;
pub const ADAR: u32 = 12;
pub const ADAR_II: u32 = 13;

/// Halaqim ("parts") in an hour.
pub const PARTS_PER_HOUR: i64 = 1080;

// Mean length of a year, 35975351/98496 days.
const MEAN_YEAR: f64 = 35_975_351.0 / 98_496.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HebrewMonth {
    Nisan,
    Iyyar,
    Sivan,
    Tammuz,
    Av,
    Elul,
    Tishri,
    Heshvan,
    Kislev,
    Tevet,
    Shevat,
    Adar,
    AdarI,
    AdarII,
}

impl HebrewMonth {
    /// Name of a month number in `year`. Month 12 is Adar I in a leap year.
    pub fn from_number(month: u32, year: i64) -> Option<Self> {
        use HebrewMonth::*;
        let leap = is_leap_year(year);
        Some(match month {
            1 => Nisan,
            2 => Iyyar,
            3 => Sivan,
            4 => Tammuz,
            5 => Av,
            6 => Elul,
            7 => Tishri,
            8 => Heshvan,
            9 => Kislev,
            10 => Tevet,
            11 => Shevat,
            12 if leap => AdarI,
            12 => Adar,
            13 if leap => AdarII,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use HebrewMonth::*;
        match self {
            Nisan => "Nisan",
            Iyyar => "Iyyar",
            Sivan => "Sivan",
            Tammuz => "Tammuz",
            Av => "Av",
            Elul => "Elul",
            Tishri => "Tishri",
            Heshvan => "Heshvan",
            Kislev => "Kislev",
            Tevet => "Tevet",
            Shevat => "Shevat",
            Adar => "Adar",
            AdarI => "Adar I",
            AdarII => "Adar II",
        }
    }
}

impl fmt::Display for HebrewMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_leap_year(year: i64) -> bool {
    (7 * year + 1).modulo(19) < 7
}

pub fn last_month_of_year(year: i64) -> u32 {
    if is_leap_year(year) {
        ADAR_II
    } else {
        ADAR
    }
}

/// Days from the epoch to the molad of Tishri of `year`, moved a day later when the molad
/// would put the new year on a Sunday, Wednesday or Friday.
fn elapsed_days(year: i64) -> i64 {
    let months_elapsed = (235 * year - 234).div_floor(&19);
    let parts_elapsed = 12084 + 13753 * months_elapsed;
    let days = 29 * months_elapsed + parts_elapsed.div_floor(&25920);
    if (3 * (days + 1)).modulo(7) < 3 {
        days + 1
    } else {
        days
    }
}

// Further postponement keeping year lengths within 353..=355 or 383..=385 days.
fn new_year_delay(year: i64) -> i64 {
    let ny0 = elapsed_days(year - 1);
    let ny1 = elapsed_days(year);
    let ny2 = elapsed_days(year + 1);
    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

/// Fixed day of 1 Tishri of `year`.
pub fn new_year(year: i64) -> i64 {
    HEBREW_EPOCH + elapsed_days(year) + new_year_delay(year)
}

pub fn days_in_year(year: i64) -> u32 {
    (new_year(year + 1) - new_year(year)) as u32
}

fn month_length_in(month: u32, year: i64, year_length: u32) -> u32 {
    match month {
        13 if !is_leap_year(year) => 0,
        2 | 4 | 6 | 10 | 13 => 29,
        12 if !is_leap_year(year) => 29,
        // Heshvan is long in complete years, Kislev short in deficient ones.
        8 if year_length % 10 != 5 => 29,
        9 if year_length % 10 == 3 => 29,
        1..=12 => 30,
        _ => 0,
    }
}

pub fn month_length(month: u32, year: i64) -> u32 {
    month_length_in(month, year, days_in_year(year))
}

pub fn fixed_from_hebrew(year: i64, month: u32, day: u32) -> i64 {
    let year_length = days_in_year(year);
    let length = |m: u32| month_length_in(m, year, year_length) as i64;
    let months_before: i64 = if month < TISHRI {
        (TISHRI..=last_month_of_year(year)).map(length).sum::<i64>()
            + (NISAN..month).map(length).sum::<i64>()
    } else {
        (TISHRI..month).map(length).sum()
    };
    new_year(year) + months_before + day as i64 - 1
}

pub fn hebrew_from_fixed(fixed: i64) -> (i64, u32, u32) {
    let approx = ((fixed - HEBREW_EPOCH) as f64 / MEAN_YEAR).floor() as i64 + 1;
    let mut year = approx - 1;
    while new_year(year + 1) <= fixed {
        year += 1;
    }
    let year_length = days_in_year(year);
    let mut month = if fixed < fixed_from_hebrew(year, NISAN, 1) {
        TISHRI
    } else {
        NISAN
    };
    while fixed > fixed_from_hebrew(year, month, month_length_in(month, year, year_length)) {
        month += 1;
    }
    let day = (fixed - fixed_from_hebrew(year, month, 1) + 1) as u32;
    (year, month, day)
}

/// Milliseconds in `parts` halaqim, rounded up to a whole millisecond.
pub fn parts_to_millis(parts: i64) -> i64 {
    (parts * MS_PER_HOUR).div_ceil(&PARTS_PER_HOUR)
}

/// Whole halaqim in `millis` milliseconds.
pub fn millis_to_parts(millis: i64) -> i64 {
    (millis * PARTS_PER_HOUR).div_floor(&MS_PER_HOUR)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Hebrew;

impl CalendarPolicy for Hebrew {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Hebrew
    }

    fn num_months(&self, year: i64) -> u32 {
        last_month_of_year(year)
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        month_length(month, year)
    }

    fn is_leap_year(&self, year: i64) -> bool {
        is_leap_year(year)
    }

    fn days_in_year(&self, year: i64) -> u32 {
        days_in_year(year)
    }
}

impl Calendar for Hebrew {
    // Sunset (18:00) before 1 Tishri 1.
    const EPOCH: f64 = 347_997.25;
    const DAY_START_HOURS: i64 = -6;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_hebrew(year, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        hebrew_from_fixed(fixed)
    }

    fn new_year(&self, year: i64) -> i64 {
        new_year(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::{fixed_from_gregorian, gregorian_from_fixed};
    use proptest::prelude::*;

    #[test]
    fn test_is_leap_year() {
        assert!(is_leap_year(5784));
        assert_eq!(Hebrew.num_months(5784), 13);
        assert!(!is_leap_year(5785));
        assert_eq!(Hebrew.num_months(5785), 12);
        assert_eq!((1..=19).filter(|&y| is_leap_year(y)).count(), 7);
        for year in 5700..5800 {
            assert_eq!(is_leap_year(year), (1 + 7 * year).modulo(19) < 7);
        }
    }

    #[test]
    fn test_new_year() {
        assert_eq!(new_year(1), HEBREW_EPOCH);
        assert_eq!(gregorian_from_fixed(new_year(5784)), (2023, 9, 16));
        assert_eq!(gregorian_from_fixed(new_year(5785)), (2024, 10, 3));
        assert_eq!(days_in_year(5784), 383);
        assert_eq!(days_in_year(5785), 355);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(
            gregorian_from_fixed(fixed_from_hebrew(5784, NISAN, 15)),
            (2024, 4, 23)
        );
        assert_eq!(
            hebrew_from_fixed(fixed_from_gregorian(2024, 1, 1)),
            (5784, 10, 20)
        );
        assert_eq!(
            hebrew_from_fixed(fixed_from_gregorian(2000, 1, 1)),
            (5760, 10, 23)
        );
        assert_eq!(hebrew_from_fixed(new_year(5785) - 1), (5784, 6, 29));
    }

    #[test]
    fn test_month_length() {
        // 5784 is a deficient leap year: Heshvan and Kislev are both short.
        assert_eq!(month_length(8, 5784), 29);
        assert_eq!(month_length(9, 5784), 29);
        assert_eq!(month_length(12, 5784), 30);
        assert_eq!(month_length(13, 5784), 29);
        // 5785 is a complete common year.
        assert_eq!(month_length(8, 5785), 30);
        assert_eq!(month_length(9, 5785), 30);
        assert_eq!(month_length(12, 5785), 29);
        assert_eq!(month_length(13, 5785), 0);
        assert_eq!(month_length(14, 5785), 0);
        assert_eq!(Hebrew.days_in_year(5784), 383);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(HebrewMonth::from_number(12, 5784), Some(HebrewMonth::AdarI));
        assert_eq!(HebrewMonth::from_number(12, 5785), Some(HebrewMonth::Adar));
        assert_eq!(HebrewMonth::from_number(13, 5785), None);
        assert_eq!(HebrewMonth::AdarII.to_string(), "Adar II");
    }

    #[test]
    fn test_parts() {
        assert_eq!(parts_to_millis(0), 0);
        assert_eq!(parts_to_millis(1), 3334);
        assert_eq!(parts_to_millis(1080), MS_PER_HOUR);
        assert_eq!(millis_to_parts(3334), 1);
        assert_eq!(millis_to_parts(3333), 0);
        assert_eq!(millis_to_parts(MS_PER_HOUR - 1), 1079);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn round_trip(fixed in -500_000i64..1_000_000) {
            let (year, month, day) = hebrew_from_fixed(fixed);
            prop_assert!(month >= 1 && month <= last_month_of_year(year));
            prop_assert!(day >= 1 && day <= month_length(month, year));
            prop_assert_eq!(fixed_from_hebrew(year, month, day), fixed);
        }

        #[test]
        fn year_lengths_are_valid(year in 1i64..10_000) {
            let length = days_in_year(year);
            let allowed = if is_leap_year(year) { [383, 384, 385] } else { [353, 354, 355] };
            prop_assert!(allowed.contains(&length));
            let months: u32 = (1..=last_month_of_year(year)).map(|m| month_length(m, year)).sum();
            prop_assert_eq!(months, length);
        }
    }

    #[test]
    fn parts_round_trip() {
        for parts in 0..PARTS_PER_HOUR {
            assert_eq!(millis_to_parts(parts_to_millis(parts)), parts);
        }
    }
}
