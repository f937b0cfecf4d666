//! The Chinese (Han) lunisolar calendar.
//!
//! Months start on the day of a new moon in China, and years on the second (rarely the
//! third) new moon after the winter solstice. A year that spans 13 new moons gets a leap
//! month: the first month of the solstice-to-solstice period (the sui) that contains no
//! major solar term.
//!
//! Years are counted as elapsed years, `60 * cycle + year_in_cycle`; 2024 is year 41 of
//! cycle 78, elapsed year 4721. Months are ordinal within the year, 1 through 12 or 13. The
//! traditional month number and leap flag come from [`Han::month_name`].

use tracing::trace;

use super::gregorian;
use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::astro::{Astro, MEAN_SYNODIC_MONTH, MEAN_TROPICAL_YEAR};
use crate::math::Modulo;
use crate::rata_die::GREGORIAN_EPOCH;

/// Fixed day of the legendary start of the calendar, -2636-02-15 Gregorian.
pub const CHINESE_EPOCH: i64 = -963_099;

/// Years in a sexagenary cycle.
pub const CYCLE_YEARS: i64 = 60;

// Difference between the elapsed year and the Gregorian year it mostly overlaps.
const ELAPSED_YEAR_OFFSET: i64 = 2697;

// The epoch falls on the first year of the second cycle of the elapsed year count.
const EPOCH_ELAPSED_YEAR: i64 = CYCLE_YEARS + 1;

const WINTER: f64 = 270.0;

/// Split an elapsed year into its sexagenary cycle and the 1-based year within it.
pub fn cycle_and_year(elapsed_year: i64) -> (i64, i64) {
    (
        (elapsed_year - 1).div_euclid(CYCLE_YEARS),
        elapsed_year.amod(CYCLE_YEARS),
    )
}

pub fn elapsed_year(cycle: i64, year_in_cycle: i64) -> i64 {
    CYCLE_YEARS * cycle + year_in_cycle
}

/// The elapsed year that starts in the given Gregorian year.
pub fn elapsed_year_from_gregorian(gregorian_year: i64) -> i64 {
    gregorian_year + ELAPSED_YEAR_OFFSET
}

#[derive(Clone, Debug)]
pub struct Han {
    astro: Astro,
}

impl Han {
    pub fn new(astro: Astro) -> Self {
        Han { astro }
    }

    pub fn astro(&self) -> &Astro {
        &self.astro
    }

    // Offset of Chinese standard time from UT, in days. Before 1929 the calendar used the
    // local mean time of Beijing.
    fn zone(jd: f64) -> f64 {
        let fixed = (jd - GREGORIAN_EPOCH).floor() as i64;
        if gregorian::year_from_fixed(fixed) >= 1929 {
            8.0 / 24.0
        } else {
            1397.0 / 180.0 / 24.0
        }
    }

    // Julian Day of the midnight that starts a fixed day in China.
    fn midnight_in_china(fixed: i64) -> f64 {
        let jd = fixed as f64 + GREGORIAN_EPOCH;
        jd - Self::zone(jd)
    }

    // The fixed day in China a moment falls on.
    fn chinese_day(jd: f64) -> i64 {
        (jd - GREGORIAN_EPOCH + Self::zone(jd)).floor() as i64
    }

    fn solstice_day(&self, gregorian_year: i64) -> i64 {
        let december =
            Self::midnight_in_china(gregorian::fixed_from_gregorian(gregorian_year, 12, 1));
        Self::chinese_day(self.astro.next_solar_longitude(december, WINTER))
    }

    /// Fixed day in China of the last winter solstice at or before `fixed`.
    pub fn winter_solstice_on_or_before(&self, fixed: i64) -> i64 {
        let year = gregorian::year_from_fixed(fixed);
        let solstice = self.solstice_day(year);
        if solstice <= fixed {
            solstice
        } else {
            self.solstice_day(year - 1)
        }
    }

    /// First day of a lunar month at or after `fixed`.
    pub fn new_moon_on_or_after(&self, fixed: i64) -> i64 {
        Self::chinese_day(self.astro.new_moon_at_or_after(Self::midnight_in_china(fixed)))
    }

    /// First day of the lunar month before the one that starts at or after `fixed`.
    pub fn new_moon_before(&self, fixed: i64) -> i64 {
        Self::chinese_day(self.astro.new_moon_before(Self::midnight_in_china(fixed)))
    }

    /// The major solar term in effect at the start of `fixed`, 1 through 12.
    pub fn current_major_solar_term(&self, fixed: i64) -> u32 {
        let longitude = self.astro.solar_longitude(Self::midnight_in_china(fixed));
        (2 + (longitude / 30.0).floor() as i64).amod(12) as u32
    }

    /// Whether the lunar month starting on `month_start` passes no major solar term.
    fn has_no_major_solar_term(&self, month_start: i64) -> bool {
        self.current_major_solar_term(month_start)
            == self.current_major_solar_term(self.new_moon_on_or_after(month_start + 1))
    }

    // Whether there is a leap month between the months starting on `start` and `month`,
    // both included.
    fn has_prior_leap_month(&self, start: i64, mut month: i64) -> bool {
        loop {
            if month < start {
                return false;
            }
            if self.has_no_major_solar_term(month) {
                return true;
            }
            month = self.new_moon_before(month);
        }
    }

    // New year of the sui containing `fixed`.
    fn new_year_in_sui(&self, fixed: i64) -> i64 {
        let s1 = self.winter_solstice_on_or_before(fixed);
        let s2 = self.winter_solstice_on_or_before(s1 + 370);
        let m12 = self.new_moon_on_or_after(s1 + 1);
        let m13 = self.new_moon_on_or_after(m12 + 1);
        let next_m11 = self.new_moon_before(s2 + 1);
        let leap_sui = lunations(m12, next_m11) == 12;
        if leap_sui && (self.has_no_major_solar_term(m12) || self.has_no_major_solar_term(m13)) {
            self.new_moon_on_or_after(m13 + 1)
        } else {
            m13
        }
    }

    /// Fixed day of the last Chinese new year at or before `fixed`.
    pub fn new_year_on_or_before(&self, fixed: i64) -> i64 {
        let new_year = self.new_year_in_sui(fixed);
        if fixed >= new_year {
            new_year
        } else {
            self.new_year_in_sui(fixed - 180)
        }
    }

    /// Fixed day of the first day of an elapsed year.
    pub fn new_year(&self, elapsed_year: i64) -> i64 {
        let years = (elapsed_year - EPOCH_ELAPSED_YEAR) as f64 + 0.5;
        let mid_year = (CHINESE_EPOCH as f64 + years * MEAN_TROPICAL_YEAR).floor() as i64;
        self.new_year_on_or_before(mid_year)
    }

    fn elapsed_year_of_new_year(new_year: i64) -> i64 {
        ((new_year - CHINESE_EPOCH) as f64 / MEAN_TROPICAL_YEAR).round() as i64
            + EPOCH_ELAPSED_YEAR
    }

    /// First day of ordinal month `month` of an elapsed year.
    pub fn month_start(&self, elapsed_year: i64, month: u32) -> i64 {
        let new_year = self.new_year(elapsed_year);
        self.new_moon_on_or_after(new_year + (month as i64 - 1) * 29)
    }

    /// Traditional month number (1 through 12) of the month starting on `month_start`, and
    /// whether it is a leap month.
    pub fn month_name(&self, month_start: i64) -> (u32, bool) {
        let s1 = self.winter_solstice_on_or_before(month_start);
        let s2 = self.winter_solstice_on_or_before(s1 + 370);
        let m12 = self.new_moon_on_or_after(s1 + 1);
        let next_m11 = self.new_moon_before(s2 + 1);
        let leap_sui = lunations(m12, next_m11) == 12;
        let adjustment = if leap_sui && self.has_prior_leap_month(m12, month_start) {
            1
        } else {
            0
        };
        let month = (lunations(m12, month_start) - adjustment).amod(12) as u32;
        let leap = leap_sui
            && self.has_no_major_solar_term(month_start)
            && !self.has_prior_leap_month(m12, self.new_moon_before(month_start));
        (month, leap)
    }

    /// Ordinal of the leap month of an elapsed year, if it has one.
    pub fn leap_month(&self, elapsed_year: i64) -> Option<u32> {
        if !self.is_leap_year(elapsed_year) {
            return None;
        }
        let leap = (1..=13).find(|&month| self.month_name(self.month_start(elapsed_year, month)).1);
        trace!(elapsed_year, ?leap, "leap month");
        leap
    }
}

// Whole lunations between two new moons.
fn lunations(from: i64, to: i64) -> i64 {
    ((to - from) as f64 / MEAN_SYNODIC_MONTH).round() as i64
}

impl CalendarPolicy for Han {
    fn kind(&self) -> CalendarKind {
        CalendarKind::Han
    }

    fn num_months(&self, year: i64) -> u32 {
        lunations(self.new_year(year), self.new_year(year + 1)) as u32
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        let months = self.num_months(year);
        if month < 1 || month > months {
            return 0;
        }
        let end = if month == months {
            self.new_year(year + 1)
        } else {
            self.month_start(year, month + 1)
        };
        (end - self.month_start(year, month)) as u32
    }

    fn is_leap_year(&self, year: i64) -> bool {
        self.num_months(year) == 13
    }

    fn days_in_year(&self, year: i64) -> u32 {
        (self.new_year(year + 1) - self.new_year(year)) as u32
    }
}

impl Calendar for Han {
    const EPOCH: f64 = 758_325.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        self.month_start(year, month) + day as i64 - 1
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        let new_year = self.new_year_on_or_before(fixed);
        let year = Self::elapsed_year_of_new_year(new_year);
        let month_start = self.new_moon_before(fixed + 1);
        let month = lunations(new_year, month_start) as u32 + 1;
        (year, month, (fixed - month_start + 1) as u32)
    }

    fn new_year(&self, year: i64) -> i64 {
        Han::new_year(self, year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::{fixed_from_gregorian, gregorian_from_fixed};
    use proptest::prelude::*;

    fn han() -> Han {
        Han::new(Astro::shared().unwrap())
    }

    #[test]
    fn test_cycles() {
        assert_eq!(cycle_and_year(4721), (78, 41));
        assert_eq!(elapsed_year(78, 41), 4721);
        assert_eq!(cycle_and_year(4740), (78, 60));
        assert_eq!(cycle_and_year(4741), (79, 1));
        assert_eq!(elapsed_year_from_gregorian(2024), 4721);
    }

    #[test]
    fn test_new_year() {
        let han = han();
        assert_eq!(gregorian_from_fixed(han.new_year(4697)), (2000, 2, 5));
        assert_eq!(gregorian_from_fixed(han.new_year(4714)), (2017, 1, 28));
        assert_eq!(gregorian_from_fixed(han.new_year(4720)), (2023, 1, 22));
        assert_eq!(gregorian_from_fixed(han.new_year(4721)), (2024, 2, 10));
        assert_eq!(Han::elapsed_year_of_new_year(han.new_year(4721)), 4721);
    }

    #[test]
    fn test_solstice_and_new_moons() {
        let han = han();
        let jan1 = fixed_from_gregorian(2024, 1, 1);
        assert_eq!(
            gregorian_from_fixed(han.winter_solstice_on_or_before(jan1)),
            (2023, 12, 22)
        );
        assert_eq!(gregorian_from_fixed(han.new_moon_on_or_after(jan1)), (2024, 1, 11));
        assert_eq!(gregorian_from_fixed(han.new_moon_before(jan1)), (2023, 12, 13));
    }

    #[test]
    fn test_leap_months() {
        let han = han();
        // 2017 had a leap sixth month, 2020 a leap fourth, 2023 a leap second.
        assert_eq!(han.leap_month(4714), Some(7));
        assert_eq!(han.leap_month(4717), Some(5));
        assert_eq!(han.leap_month(4720), Some(3));
        assert_eq!(han.month_name(han.month_start(4714, 7)), (6, true));
        assert_eq!(han.month_name(han.month_start(4714, 8)), (7, false));
        assert_eq!(gregorian_from_fixed(han.month_start(4714, 7)), (2017, 7, 23));
    }

    #[test]
    fn test_leap_month_consistent_with_leap_year() {
        let han = han();
        for year in [4697, 4714, 4721] {
            assert_eq!(han.is_leap_year(year), han.leap_month(year).is_some());
            assert_eq!(han.num_months(year), if han.is_leap_year(year) { 13 } else { 12 });
        }
    }

    #[test]
    fn test_conversions() {
        let han = han();
        assert_eq!(han.date_from_fixed(fixed_from_gregorian(2017, 7, 23)), (4714, 7, 1));
        // The eleventh month of 2023, which had a leap month earlier in the year.
        let (year, month, day) = han.date_from_fixed(fixed_from_gregorian(2024, 1, 1));
        assert_eq!((year, month, day), (4720, 12, 20));
        assert_eq!(han.month_name(han.month_start(year, month)), (11, false));
        assert_eq!(han.fixed_from_date(4720, 12, 20), fixed_from_gregorian(2024, 1, 1));
        assert_eq!(han.date_from_fixed(fixed_from_gregorian(2024, 2, 10)), (4721, 1, 1));
    }

    #[test]
    fn test_month_lengths() {
        let han = han();
        let total: u32 = (1..=13).map(|m| han.month_length(m, 4714)).sum();
        assert_eq!(total, han.days_in_year(4714));
        assert_eq!(han.month_length(13, 4721), 0);
        for month in 1..=12 {
            assert!((29..=30).contains(&han.month_length(month, 4721)));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn round_trip(fixed in 700_000i64..760_000) {
            let han = han();
            let (year, month, day) = han.date_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= 30);
            prop_assert_eq!(han.fixed_from_date(year, month, day), fixed);
        }
    }
}
