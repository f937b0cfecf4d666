//! The Coptic and Ethiopic calendars. Both have twelve months of 30 days followed by an
//! epagomenal month of 5 or 6 days, and differ only in their epoch.

use num_integer::Integer;

use super::{Calendar, CalendarKind, CalendarPolicy};
use crate::math::Modulo;

/// Fixed day of 1 Thout 1, 0284-08-29 Julian.
pub const COPTIC_EPOCH: i64 = 103_605;
/// Fixed day of 1 Maskaram 1, 0008-08-29 Julian.
pub const ETHIOPIC_EPOCH: i64 = 2_796;

pub fn is_leap_year(year: i64) -> bool {
    year.modulo(4) == 3
}

pub fn month_length(month: u32, year: i64) -> u32 {
    match month {
        1..=12 => 30,
        13 if is_leap_year(year) => 6,
        13 => 5,
        _ => 0,
    }
}

fn fixed_from_date(epoch: i64, year: i64, month: u32, day: u32) -> i64 {
    epoch - 1 + 365 * (year - 1) + year.div_floor(&4) + 30 * (month as i64 - 1) + day as i64
}

fn date_from_fixed(epoch: i64, fixed: i64) -> (i64, u32, u32) {
    let year = (4 * (fixed - epoch) + 1463).div_floor(&1461);
    let month = (fixed - fixed_from_date(epoch, year, 1, 1)).div_floor(&30) as u32 + 1;
    let day = (fixed + 1 - fixed_from_date(epoch, year, month, 1)) as u32;
    (year, month, day)
}

macro_rules! alexandrian_calendar {
    ($(#[$meta:meta])* $Name:ident, $kind:expr, $epoch:expr, $jd_epoch:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
        pub struct $Name;

        impl CalendarPolicy for $Name {
            fn kind(&self) -> CalendarKind {
                $kind
            }

            fn num_months(&self, _year: i64) -> u32 {
                13
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

        impl Calendar for $Name {
            const EPOCH: f64 = $jd_epoch;

            fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
                fixed_from_date($epoch, year, month, day)
            }

            fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
                date_from_fixed($epoch, fixed)
            }
        }
    };
}

alexandrian_calendar!(
    /// The calendar of the Coptic church, counting from the Era of Martyrs.
    Coptic,
    CalendarKind::Coptic,
    COPTIC_EPOCH,
    1_825_028.5
);

alexandrian_calendar!(
    /// The Ethiopian calendar, counting from the Incarnation Era.
    Ethiopic,
    CalendarKind::Ethiopic,
    ETHIOPIC_EPOCH,
    1_724_219.5
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::{fixed_from_gregorian, gregorian_from_fixed};
    use proptest::prelude::*;

    #[test]
    fn test_coptic() {
        assert_eq!(Coptic.fixed_from_date(1, 1, 1), COPTIC_EPOCH);
        assert_eq!(
            gregorian_from_fixed(Coptic.fixed_from_date(1740, 1, 1)),
            (2023, 9, 12)
        );
        assert_eq!(
            Coptic.date_from_fixed(fixed_from_gregorian(2024, 1, 1)),
            (1740, 4, 22)
        );
        assert!(Coptic.is_leap_year(1739));
        assert_eq!(Coptic.month_length(13, 1739), 6);
        assert_eq!(Coptic.month_length(13, 1740), 5);
        assert_eq!(Coptic.month_length(14, 1740), 0);
    }

    #[test]
    fn test_ethiopic() {
        assert_eq!(Ethiopic.fixed_from_date(1, 1, 1), ETHIOPIC_EPOCH);
        assert_eq!(
            gregorian_from_fixed(Ethiopic.fixed_from_date(2016, 1, 1)),
            (2023, 9, 12)
        );
        assert_eq!(
            gregorian_from_fixed(Ethiopic.fixed_from_date(2015, 13, 6)),
            (2023, 9, 11)
        );
        assert_eq!(
            Ethiopic.date_from_fixed(fixed_from_gregorian(2023, 9, 11)),
            (2015, 13, 6)
        );
        assert_eq!(
            Ethiopic.date_from_fixed(fixed_from_gregorian(2024, 1, 1)),
            (2016, 4, 22)
        );
    }

    #[test]
    fn test_same_months_different_epoch() {
        let fixed = fixed_from_gregorian(2024, 6, 1);
        let (cy, cm, cd) = Coptic.date_from_fixed(fixed);
        let (ey, em, ed) = Ethiopic.date_from_fixed(fixed);
        assert_eq!(ey - cy, 276);
        assert_eq!((cm, cd), (em, ed));
    }

    proptest! {
        #[test]
        fn round_trip(fixed in -1_000_000i64..1_500_000) {
            let (year, month, day) = Coptic.date_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= month_length(month, year));
            prop_assert_eq!(Coptic.fixed_from_date(year, month, day), fixed);
            let (year, month, day) = Ethiopic.date_from_fixed(fixed);
            prop_assert!(day >= 1 && day <= month_length(month, year));
            prop_assert_eq!(Ethiopic.fixed_from_date(year, month, day), fixed);
        }

        #[test]
        fn leap_years_have_366_days(year in -3000i64..3000) {
            let length =
                Coptic.fixed_from_date(year + 1, 1, 1) - Coptic.fixed_from_date(year, 1, 1);
            prop_assert_eq!(length == 366, is_leap_year(year));
            prop_assert_eq!(length as u32, Coptic.days_in_year(year));
        }
    }
}
