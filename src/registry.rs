//! Looking calendars up by name, and dates whose calendar is only known at run time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::astro::{Astro, ASTRO_TABLE};
use crate::calendar::{
    Calendar, CalendarKind, CalendarPolicy, Coptic, Ethiopic, Gregorian, Han, Hebrew, Islamic,
    Julian, Persian, PersianAlgorithmic, ThaiSolar,
};
use crate::date::{Date, DateBuilder, DateFields};
use crate::error::{Error, Result};
use crate::rata_die::{JulianDay, RataDie};
use crate::timezone::TimeZone;

/// Where the moment of a new date comes from.
#[derive(Clone, Debug)]
pub enum DateSource {
    RataDie(RataDie),
    JulianDay(f64),
    UnixMillis(i64),
    Fields(DateBuilder),
    /// The moment of another date, in any calendar.
    Wrap(Box<CalendarDate>),
}

/// Everything needed to construct a date in some calendar.
#[derive(Clone, Debug)]
pub struct DateParams {
    pub source: DateSource,
    /// Zone for the wall-clock fields. When wrapping a date, defaults to that date's zone.
    pub zone: Option<Arc<dyn TimeZone>>,
}

impl DateParams {
    pub fn new(source: DateSource) -> Self {
        DateParams { source, zone: None }
    }

    pub fn rata_die(rd: RataDie) -> Self {
        Self::new(DateSource::RataDie(rd))
    }

    pub fn julian_day(jd: f64) -> Self {
        Self::new(DateSource::JulianDay(jd))
    }

    pub fn unix_millis(millis: i64) -> Self {
        Self::new(DateSource::UnixMillis(millis))
    }

    pub fn fields(builder: DateBuilder) -> Self {
        Self::new(DateSource::Fields(builder))
    }

    pub fn wrap(date: CalendarDate) -> Self {
        Self::new(DateSource::Wrap(Box::new(date)))
    }

    pub fn now() -> Self {
        Self::rata_die(RataDie::now())
    }

    pub fn in_zone(mut self, zone: Arc<dyn TimeZone>) -> Self {
        self.zone = Some(zone);
        self
    }
}

impl<C: Calendar> Date<C> {
    pub fn from_params(calendar: C, params: &DateParams) -> Result<Self> {
        let moment = |rd: RataDie, zone: Option<Arc<dyn TimeZone>>| match zone {
            Some(zone) => Date::from_rata_die_in(calendar.clone(), rd, zone),
            None => Date::from_rata_die(calendar.clone(), rd),
        };
        let zone = params.zone.clone();
        Ok(match &params.source {
            DateSource::RataDie(rd) => moment(*rd, zone),
            DateSource::JulianDay(jd) => moment(RataDie::from_julian_day(*jd), zone),
            DateSource::UnixMillis(millis) => moment(RataDie::from_unix_millis(*millis), zone),
            DateSource::Fields(builder) => return builder.build_with_zone(calendar, zone),
            DateSource::Wrap(date) => {
                moment(date.rata_die(), zone.or_else(|| date.time_zone().cloned()))
            }
        })
    }
}

/// A date in any of the built-in calendars.
#[derive(Clone, Debug)]
pub enum CalendarDate {
    Gregorian(Date<Gregorian>),
    Julian(Date<Julian>),
    Coptic(Date<Coptic>),
    Ethiopic(Date<Ethiopic>),
    Hebrew(Date<Hebrew>),
    Islamic(Date<Islamic>),
    PersianAlgorithmic(Date<PersianAlgorithmic>),
    Persian(Date<Persian>),
    Han(Date<Han>),
    ThaiSolar(Date<ThaiSolar>),
}

macro_rules! dispatch {
    ($value:expr, $date:ident => $body:expr) => {
        match $value {
            CalendarDate::Gregorian($date) => $body,
            CalendarDate::Julian($date) => $body,
            CalendarDate::Coptic($date) => $body,
            CalendarDate::Ethiopic($date) => $body,
            CalendarDate::Hebrew($date) => $body,
            CalendarDate::Islamic($date) => $body,
            CalendarDate::PersianAlgorithmic($date) => $body,
            CalendarDate::Persian($date) => $body,
            CalendarDate::Han($date) => $body,
            CalendarDate::ThaiSolar($date) => $body,
        }
    };
}

// Like dispatch, but wraps the resulting date back into the same variant.
macro_rules! map_date {
    ($value:expr, $date:ident => $body:expr) => {
        match $value {
            CalendarDate::Gregorian($date) => CalendarDate::Gregorian($body),
            CalendarDate::Julian($date) => CalendarDate::Julian($body),
            CalendarDate::Coptic($date) => CalendarDate::Coptic($body),
            CalendarDate::Ethiopic($date) => CalendarDate::Ethiopic($body),
            CalendarDate::Hebrew($date) => CalendarDate::Hebrew($body),
            CalendarDate::Islamic($date) => CalendarDate::Islamic($body),
            CalendarDate::PersianAlgorithmic($date) => CalendarDate::PersianAlgorithmic($body),
            CalendarDate::Persian($date) => CalendarDate::Persian($body),
            CalendarDate::Han($date) => CalendarDate::Han($body),
            CalendarDate::ThaiSolar($date) => CalendarDate::ThaiSolar($body),
        }
    };
}

fn require_astro(astro: Option<&Astro>) -> Result<Astro> {
    astro.cloned().ok_or_else(|| Error::DataNotLoaded {
        name: ASTRO_TABLE.to_string(),
    })
}

impl CalendarDate {
    /// A date in the calendar `kind`. The astronomical calendars need `astro`.
    pub fn create(kind: CalendarKind, astro: Option<&Astro>, params: &DateParams) -> Result<Self> {
        Ok(match kind {
            CalendarKind::Gregorian => {
                CalendarDate::Gregorian(Date::from_params(Gregorian, params)?)
            }
            CalendarKind::Julian => CalendarDate::Julian(Date::from_params(Julian, params)?),
            CalendarKind::Coptic => CalendarDate::Coptic(Date::from_params(Coptic, params)?),
            CalendarKind::Ethiopic => CalendarDate::Ethiopic(Date::from_params(Ethiopic, params)?),
            CalendarKind::Hebrew => CalendarDate::Hebrew(Date::from_params(Hebrew, params)?),
            CalendarKind::Islamic => CalendarDate::Islamic(Date::from_params(Islamic, params)?),
            CalendarKind::PersianAlgorithmic => CalendarDate::PersianAlgorithmic(
                Date::from_params(PersianAlgorithmic, params)?,
            ),
            CalendarKind::Persian => CalendarDate::Persian(Date::from_params(
                Persian::new(require_astro(astro)?),
                params,
            )?),
            CalendarKind::Han => {
                CalendarDate::Han(Date::from_params(Han::new(require_astro(astro)?), params)?)
            }
            CalendarKind::ThaiSolar => {
                CalendarDate::ThaiSolar(Date::from_params(ThaiSolar, params)?)
            }
        })
    }

    pub fn kind(&self) -> CalendarKind {
        dispatch!(self, date => date.calendar().kind())
    }

    pub fn policy(&self) -> &dyn CalendarPolicy {
        dispatch!(self, date => date.calendar() as &dyn CalendarPolicy)
    }

    /// The astronomical engine of an astronomical calendar.
    pub fn astro(&self) -> Option<&Astro> {
        match self {
            CalendarDate::Persian(date) => Some(date.calendar().astro()),
            CalendarDate::Han(date) => Some(date.calendar().astro()),
            _ => None,
        }
    }

    pub fn fields(&self) -> DateFields {
        dispatch!(self, date => *date.fields())
    }

    pub fn year(&self) -> i64 {
        dispatch!(self, date => date.year())
    }

    pub fn month(&self) -> u32 {
        dispatch!(self, date => date.month())
    }

    pub fn day(&self) -> u32 {
        dispatch!(self, date => date.day())
    }

    pub fn hour(&self) -> u32 {
        dispatch!(self, date => date.hour())
    }

    pub fn minute(&self) -> u32 {
        dispatch!(self, date => date.minute())
    }

    pub fn second(&self) -> u32 {
        dispatch!(self, date => date.second())
    }

    pub fn millisecond(&self) -> u32 {
        dispatch!(self, date => date.millisecond())
    }

    pub fn rata_die(&self) -> RataDie {
        dispatch!(self, date => date.rata_die())
    }

    pub fn julian_day(&self) -> JulianDay {
        dispatch!(self, date => date.julian_day())
    }

    pub fn unix_millis(&self) -> Option<i64> {
        dispatch!(self, date => date.unix_millis())
    }

    pub fn extended_unix_millis(&self) -> Result<i64> {
        dispatch!(self, date => date.extended_unix_millis())
    }

    pub fn day_number(&self) -> f64 {
        dispatch!(self, date => date.day_number())
    }

    pub fn offset(&self) -> f64 {
        dispatch!(self, date => date.offset())
    }

    pub fn time_zone(&self) -> Option<&Arc<dyn TimeZone>> {
        dispatch!(self, date => date.time_zone())
    }

    pub fn day_of_week(&self) -> u32 {
        dispatch!(self, date => date.day_of_week())
    }

    pub fn day_of_year(&self) -> u32 {
        dispatch!(self, date => date.day_of_year())
    }

    pub fn is_leap_year(&self) -> bool {
        dispatch!(self, date => date.is_leap_year())
    }

    pub fn days_in_month(&self) -> u32 {
        dispatch!(self, date => date.days_in_month())
    }

    pub fn add_days(&self, days: f64) -> Self {
        map_date!(self, date => date.add_days(days))
    }

    pub fn on_or_before(&self, dow: u32) -> Self {
        map_date!(self, date => date.on_or_before(dow))
    }

    pub fn on_or_after(&self, dow: u32) -> Self {
        map_date!(self, date => date.on_or_after(dow))
    }

    pub fn before(&self, dow: u32) -> Self {
        map_date!(self, date => date.before(dow))
    }

    pub fn after(&self, dow: u32) -> Self {
        map_date!(self, date => date.after(dow))
    }

    /// The same moment in calendar `kind`. Converting to an astronomical calendar uses
    /// `astro`, or failing that the engine of this date's own calendar.
    pub fn convert(&self, kind: CalendarKind, astro: Option<&Astro>) -> Result<Self> {
        let astro = astro.or_else(|| self.astro());
        CalendarDate::create(kind, astro, &DateParams::wrap(self.clone()))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, date => write!(f, "{} ({})", date, date.calendar().kind()))
    }
}

impl PartialEq for CalendarDate {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.rata_die() == other.rata_die()
    }
}

type DateConstructor = Arc<dyn Fn(&DateParams) -> Result<CalendarDate> + Send + Sync>;

struct Entry {
    // None for an astronomical calendar registered without its engine.
    policy: Option<Arc<dyn CalendarPolicy>>,
    constructor: DateConstructor,
}

/// Calendars by name. Build one at startup and pass it to whatever needs to resolve
/// calendar names.
#[derive(Default)]
pub struct CalendarRegistry {
    entries: HashMap<String, Entry>,
}

impl CalendarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry of the built-in calendars under their [`CalendarKind`] names. Without
    /// `astro`, the astronomical calendars are registered but creating their dates fails
    /// with [`Error::DataNotLoaded`].
    pub fn with_builtin(astro: Option<Astro>) -> Self {
        let mut registry = Self::new();
        for kind in CalendarKind::ALL {
            let policy: Option<Arc<dyn CalendarPolicy>> = match kind {
                CalendarKind::Gregorian => Some(Arc::new(Gregorian)),
                CalendarKind::Julian => Some(Arc::new(Julian)),
                CalendarKind::Coptic => Some(Arc::new(Coptic)),
                CalendarKind::Ethiopic => Some(Arc::new(Ethiopic)),
                CalendarKind::Hebrew => Some(Arc::new(Hebrew)),
                CalendarKind::Islamic => Some(Arc::new(Islamic)),
                CalendarKind::PersianAlgorithmic => Some(Arc::new(PersianAlgorithmic)),
                CalendarKind::ThaiSolar => Some(Arc::new(ThaiSolar)),
                CalendarKind::Persian => astro
                    .clone()
                    .map(|astro| Arc::new(Persian::new(astro)) as Arc<dyn CalendarPolicy>),
                CalendarKind::Han => astro
                    .clone()
                    .map(|astro| Arc::new(Han::new(astro)) as Arc<dyn CalendarPolicy>),
            };
            let astro = astro.clone();
            let constructor: DateConstructor =
                Arc::new(move |params: &DateParams| {
                    CalendarDate::create(kind, astro.as_ref(), params)
                });
            registry.insert(kind.name(), policy, constructor);
        }
        registry
    }

    fn insert(
        &mut self,
        name: &str,
        policy: Option<Arc<dyn CalendarPolicy>>,
        constructor: DateConstructor,
    ) {
        debug!(name, "registering calendar");
        self.entries.insert(
            name.to_string(),
            Entry {
                policy,
                constructor,
            },
        );
    }

    /// Add or replace a calendar.
    pub fn register<F>(&mut self, name: &str, policy: Arc<dyn CalendarPolicy>, constructor: F)
    where
        F: Fn(&DateParams) -> Result<CalendarDate> + Send + Sync + 'static,
    {
        self.insert(name, Some(policy), Arc::new(constructor));
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownCalendarType(name.to_string()))
    }

    pub fn create(&self, name: &str, params: &DateParams) -> Result<CalendarDate> {
        (self.entry(name)?.constructor)(params)
    }

    pub fn policy(&self, name: &str) -> Result<Arc<dyn CalendarPolicy>> {
        self.entry(name)?
            .policy
            .clone()
            .ok_or_else(|| Error::DataNotLoaded {
                name: ASTRO_TABLE.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CalendarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarRegistry")
            .field("names", &self.names())
            .finish()
    }
}
