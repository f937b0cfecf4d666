use super::gregorian::{self, fixed_from_gregorian, gregorian_from_fixed};
use super::{Calendar, CalendarKind, CalendarPolicy};

/// Buddhist Era year 1 is 543 BCE.
pub const YEAR_OFFSET: i64 = 543;

/// The Thai solar calendar: Gregorian months and leap years, with years counted in the
/// Buddhist Era.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ThaiSolar;

impl CalendarPolicy for ThaiSolar {
    fn kind(&self) -> CalendarKind {
        CalendarKind::ThaiSolar
    }

    fn num_months(&self, _year: i64) -> u32 {
        12
    }

    fn month_length(&self, month: u32, year: i64) -> u32 {
        gregorian::month_length(month, year - YEAR_OFFSET)
    }

    fn is_leap_year(&self, year: i64) -> bool {
        gregorian::is_leap_year(year - YEAR_OFFSET)
    }

    fn days_in_year(&self, year: i64) -> u32 {
        if self.is_leap_year(year) {
            366
        } else {
            365
        }
    }
}

impl Calendar for ThaiSolar {
    const EPOCH: f64 = 1_523_097.5;

    fn fixed_from_date(&self, year: i64, month: u32, day: u32) -> i64 {
        fixed_from_gregorian(year - YEAR_OFFSET, month, day)
    }

    fn date_from_fixed(&self, fixed: i64) -> (i64, u32, u32) {
        let (year, month, day) = gregorian_from_fixed(fixed);
        (year + YEAR_OFFSET, month, day)
    }
}
