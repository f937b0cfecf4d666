//! Conversions between calendars.
//!
//! Every date is a moment on a single continuous day count, the [`RataDie`], and each
//! calendar knows how to map that count to and from its own year, month and day. The
//! Gregorian, Julian, Coptic, Ethiopic, Hebrew, Islamic civil, Persian and Thai solar
//! calendars are arithmetic; the astronomical Persian and Han calendars compute the sun
//! and moon with an [`Astro`] engine built from a table of coefficients.
//!
//! ```no_run
//! use calendrical::{CalendarKind, CalendarRegistry, DateBuilder, DateParams};
//!
//! let registry = CalendarRegistry::with_builtin(calendrical::Astro::shared().ok());
//! let mut fields = DateBuilder::new();
//! fields.year(2024).month(2).day(10);
//! let date = registry.create("gregorian", &DateParams::fields(fields))?;
//! let han = date.convert(CalendarKind::Han, None)?;
//! println!("{}", han);
//! # Ok::<(), calendrical::Error>(())
//! ```

pub use astro::{Astro, CoefficientTable};
pub use calendar::{
    Calendar, CalendarKind, CalendarPolicy, Coptic, Ethiopic, Gregorian, Han, Hebrew, Islamic,
    Julian, Persian, PersianAlgorithmic, ThaiSolar,
};
pub use date::{Date, DateBuilder, DateFields};
pub use error::{Error, Result};
pub use math::RoundingMode;
pub use rata_die::{JulianDay, RataDie};
pub use registry::{CalendarDate, CalendarRegistry, DateParams, DateSource};
#[cfg(unix)]
pub use timezone::SystemLocal;
pub use timezone::{FixedOffset, TimeZone, ZoneInfo};

pub mod astro;
pub mod calendar;
mod date;
mod error;
pub mod math;
pub mod rata_die;
mod registry;
pub mod search;
pub mod timezone;
