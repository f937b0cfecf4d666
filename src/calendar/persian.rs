//! The Persian (Solar Hijri) calendar, in its arithmetic 2820-year cycle form and in the
//! astronomical form where each year starts on the day of the March equinox in Tehran.

use num_integer::Integer;

use super::gregorian;
use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::astro::{Astro, Season};
use crate::math::Modulo;
use crate::rata_die::GREGORIAN_EPOCH;

/// Fixed day of 1 Farvardin 1, 0622-03-19 Julian.
pub const PERSIAN_EPOCH: i64 = 226_896;

const CYCLE_YEARS: i64 = 2820;
const CYCLE_DAYS: i64 = 1_029_983;
// The arithmetic form counts years from this one inside each grand cycle.
const CYCLE_BASE_YEAR: i64 = 474;

// Tehran's meridian, 52.5 degrees east, as a fraction of a day.
const TEHRAN_LONGITUDE: f64 = 52.5 / 360.0;

fn month_length_for(month: u32, leap: bool) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        12 if leap => 30,
        12 => 29,
        _ => 0,
    }
}

// Days from the first of the year to the first of `month`.
fn days_before_month(month: u32) -> i64 {
    let month = month as i64;
    if month <= 7 {
        31 * (month - 1)
    } else {
        30 * (month - 1) + 6
    }
}

// Month and day of a 1-based day of the year.
fn month_and_day(day_of_year: i64) -> (u32, u32) {
    let month = if day_of_year <= 186 {
        day_of_year.div_ceil(&31)
    } else {
        (day_of_year - 6).div_ceil(&30)
    } as u32;
    let day = (day_of_year - days_before_month(month)) as u32;
    (month, day)
}

// There is no year 0 in the arithmetic form; years before it count -1, -2, ...
fn cycle_offset(year: i64) -> i64 {
    if year > 0 {
        year - CYCLE_BASE_YEAR
    } else {
        year - CYCLE_BASE_YEAR + 1
    }
}

fn equivalent_cycle_year(year: i64) -> i64 {
    cycle_offset(year).modulo(CYCLE_YEARS) + CYCLE_BASE_YEAR
}

pub fn is_leap_year(year: i64) -> bool {
    ((equivalent_cycle_year(year) + 38) * 682).modulo(2816) < 682
}

pub fn fixed_from_persian(year: i64, month: u32, day: u32) -> i64 {
    let y = equivalent_cycle_year(year);
    PERSIAN_EPOCH - 1
        + CYCLE_DAYS * cycle_offset(year).div_floor(&CYCLE_YEARS)
        + 365 * (y - 1)
        + (31 * y - 5).div_floor(&128)
        + days_before_month(month)
        + day as i64
}

pub fn year_from_fixed(fixed: i64) -> i64 {
    let days = fixed - fixed_from_persian(CYCLE_BASE_YEAR + 1, 1, 1);
    let (cycle, day_of_cycle) = days.div_mod_floor(&CYCLE_DAYS);
    let year_of_cycle = if day_of_cycle == CYCLE_DAYS - 1 {
        CYCLE_YEARS
    } else {
        (128 * day_of_cycle + 46878).div_floor(&46751)
    };
    let year = CYCLE_BASE_YEAR + CYCLE_YEARS * cycle + year_of_cycle;
    if year > 0 {
        year
    } else {
        year - 1
    }
}

pub fn persian_from_fixed(fixed: i64) -> (i64, u32, u32) {
    let year = year_from_fixed(fixed);
    let (month, day) = month_and_day(fixed - fixed_from_persian(year, 1, 1) + 1);
    (year, month, day)
}

/// The arithmetic Persian calendar, with leap years placed by a 2820-year cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PersianAlgorithmic;

impl CalendarPolicy for PersianAlgorithmic {
    fn kind(&self) -> CalendarKind {
        CalendarKind::PersianAlgorithmic
    }

    fn num_months(&self, year: i64) -> u32 {
        if year == 0 {
            0
        } else {
            12
        }
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        if year == 0 {
            return 0;
        }
        month_length_for(month, is_leap_year(year))
    }

    fn is_leap_year(&self, year: i64) -> bool {
        is_leap_year(year)
    }
}

impl Calendar for PersianAlgorithmic {
    const EPOCH: f64 = 1_948_319.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_persian(year, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        persian_from_fixed(fixed)
    }
}

/// The Persian calendar as observed in Iran: the year starts on the day whose noon in
/// Tehran follows the March equinox.
#[derive(Clone, Debug)]
pub struct Persian {
    astro: Astro,
}

impl Persian {
    pub fn new(astro: Astro) -> Self {
        Persian { astro }
    }

    pub fn astro(&self) -> &Astro {
        &self.astro
    }

    /// Julian Day of the March equinox of a Gregorian year, in Tehran apparent solar time.
    pub fn tehran_equinox(&self, gregorian_year: i64) -> f64 {
        let jde = self.astro.equinox(gregorian_year, Season::MarchEquinox);
        let universal = jde - self.astro.delta_t(gregorian_year as f64) / 86_400.0;
        universal + self.astro.equation_of_time(jde) + TEHRAN_LONGITUDE
    }

    /// Fixed day of Nowruz, the first day of `year`.
    pub fn new_year(&self, year: i64) -> i64 {
        // Julian Days start at noon, so flooring the equinox finds the noon before it and
        // the following midnight starts the year.
        self.tehran_equinox(year + 621).floor() as i64 - (GREGORIAN_EPOCH - 0.5) as i64
    }
}

impl CalendarPolicy for Persian {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Persian
    }

    fn num_months(&self, _year: i64) -> u32 {
        12
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        if month == 12 {
            month_length_for(month, self.is_leap_year(year))
        } else {
            month_length_for(month, false)
        }
    }

    fn is_leap_year(&self, year: i64) -> bool {
        self.new_year(year + 1) - self.new_year(year) > 365
    }

    fn days_in_year(&self, year: i64) -> u32 {
        (self.new_year(year + 1) - self.new_year(year)) as u32
    }
}

impl Calendar for Persian {
    const EPOCH: f64 = 1_948_319.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        self.new_year(year) + days_before_month(month) + day as i64 - 1
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        let mut year = gregorian::year_from_fixed(fixed) - 621;
        let mut new_year = self.new_year(year);
        if fixed < new_year {
            year -= 1;
            new_year = self.new_year(year);
        }
        let (month, day) = month_and_day(fixed - new_year + 1);
        (year, month, day)
    }

    fn new_year(&self, year: i64) -> i64 {
        Persian::new_year(self, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::{fixed_from_gregorian, gregorian_from_fixed};
    use proptest::prelude::*;

    fn persian() -> Persian {
        Persian::new(Astro::shared().unwrap())
    }

    #[test]
    fn test_algorithmic() {
        assert_eq!(fixed_from_persian(1, 1, 1), PERSIAN_EPOCH);
        assert_eq!(gregorian_from_fixed(fixed_from_persian(1402, 1, 1)), (2023, 3, 21));
        assert_eq!(gregorian_from_fixed(fixed_from_persian(1403, 1, 1)), (2024, 3, 20));
        assert_eq!(gregorian_from_fixed(fixed_from_persian(1404, 1, 1)), (2025, 3, 20));
        assert_eq!(persian_from_fixed(fixed_from_gregorian(2024, 1, 1)), (1402, 10, 11));
        assert_eq!(persian_from_fixed(PERSIAN_EPOCH - 1), (-1, 12, 30));
    }

    #[test]
    fn test_algorithmic_leap_years() {
        let leap: Vec<i64> = (1393..1410).filter(|&y| is_leap_year(y)).collect();
        assert_eq!(leap, vec![1395, 1399, 1404, 1408]);
        assert_eq!(PersianAlgorithmic.month_length(12, 1404), 30);
        assert_eq!(PersianAlgorithmic.month_length(12, 1403), 29);
        assert_eq!(PersianAlgorithmic.month_length(1, 0), 0);
        assert_eq!(PersianAlgorithmic.days_in_year(1404), 366);
    }

    #[test]
    fn test_month_and_day() {
        assert_eq!(month_and_day(1), (1, 1));
        assert_eq!(month_and_day(31), (1, 31));
        assert_eq!(month_and_day(186), (6, 31));
        assert_eq!(month_and_day(187), (7, 1));
        assert_eq!(month_and_day(336), (11, 30));
        assert_eq!(month_and_day(337), (12, 1));
        assert_eq!(month_and_day(366), (12, 30));
    }

    #[test]
    fn test_astronomical_new_year() {
        let persian = persian();
        assert_eq!(gregorian_from_fixed(persian.new_year(1402)), (2023, 3, 21));
        assert_eq!(gregorian_from_fixed(persian.new_year(1403)), (2024, 3, 20));
        // The equinox of 2025 fell after noon in Tehran.
        assert_eq!(gregorian_from_fixed(persian.new_year(1404)), (2025, 3, 21));
        assert_eq!(persian.new_year(1), PERSIAN_EPOCH);
    }

    #[test]
    fn test_astronomical_leap_years() {
        let persian = persian();
        // 1403 is a leap year by observation but not by the 2820-year cycle.
        assert!(persian.is_leap_year(1403));
        assert!(!is_leap_year(1403));
        assert!(persian.is_leap_year(1399));
        assert!(!persian.is_leap_year(1402));
        assert_eq!(persian.month_length(12, 1403), 30);
        assert_eq!(persian.days_in_year(1402), 365);
    }

    #[test]
    fn test_astronomical_conversions() {
        let persian = persian();
        assert_eq!(
            persian.date_from_fixed(fixed_from_gregorian(2024, 1, 1)),
            (1402, 10, 11)
        );
        assert_eq!(
            persian.date_from_fixed(fixed_from_gregorian(2024, 3, 20)),
            (1403, 1, 1)
        );
        assert_eq!(
            persian.date_from_fixed(fixed_from_gregorian(2024, 3, 19)),
            (1402, 12, 29)
        );
        assert_eq!(
            persian.fixed_from_date(1403, 12, 30),
            fixed_from_gregorian(2025, 3, 20)
        );
    }

    proptest! {
        #[test]
        fn algorithmic_round_trip(fixed in -1_000_000i64..1_500_000) {
            let (year, month, day) = persian_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= PersianAlgorithmic.month_length(month, year));
            prop_assert_eq!(fixed_from_persian(year, month, day), fixed);
        }

        #[test]
        fn algorithmic_leap_years_have_366_days(year in 1i64..5000) {
            let length = fixed_from_persian(year + 1, 1, 1) - fixed_from_persian(year, 1, 1);
            prop_assert_eq!(length == 366, is_leap_year(year));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn astronomical_round_trip(fixed in 600_000i64..800_000) {
            let persian = persian();
            let (year, month, day) = persian.date_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= persian.month_length(month, year));
            prop_assert_eq!(persian.fixed_from_date(year, month, day), fixed);
        }
    }
}
