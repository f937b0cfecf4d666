//! Time zones, used to move between UTC and local wall-clock time.

use std::fmt;
use std::path::PathBuf;

use num_integer::Integer;
use tracing::{debug, instrument};
use zoneinfo_compiled::parse;

use crate::error::{Error, Result};
use crate::rata_die::{RataDie, MS_PER_DAY, MS_PER_SECOND, UNIX_EPOCH};

pub trait TimeZone: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Local time minus UTC at UTC moment `utc`, in milliseconds.
    fn offset_millis(&self, utc: RataDie) -> i64;

    fn in_daylight_time(&self, utc: RataDie) -> bool;

    /// Offset that applies to a local wall-clock time. A time that occurs twice gets the
    /// offset in effect first; a time skipped by a transition gets the offset from before
    /// the transition.
    fn offset_millis_wall_time(&self, local: RataDie) -> i64 {
        let to_utc = |offset: i64| local.add_days(-(offset as f64) / MS_PER_DAY as f64);
        // No zone has two transitions within a day of each other.
        let before = self.offset_millis(local.add_days(-1.0));
        if self.offset_millis(to_utc(before)) == before {
            return before;
        }
        let after = self.offset_millis(to_utc(before));
        if self.offset_millis(to_utc(after)) == after {
            after
        } else {
            before
        }
    }
}

/// A zone with a constant offset and no daylight saving time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedOffset {
    name: String,
    offset_millis: i64,
}

impl FixedOffset {
    pub fn new(name: impl Into<String>, offset_millis: i64) -> Self {
        FixedOffset {
            name: name.into(),
            offset_millis,
        }
    }

    pub fn utc() -> Self {
        Self::new("UTC", 0)
    }
}

impl TimeZone for FixedOffset {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset_millis(&self, _utc: RataDie) -> i64 {
        self.offset_millis
    }

    fn in_daylight_time(&self, _utc: RataDie) -> bool {
        false
    }

    fn offset_millis_wall_time(&self, _local: RataDie) -> i64 {
        self.offset_millis
    }
}

pub const TZDIR_VAR: &str = "TZDIR";

/// Directory holding the compiled IANA zone files. Like the C library, this is `$TZDIR`
/// if set and `/usr/share/zoneinfo` otherwise.
pub fn tzdir() -> PathBuf {
    std::env::var(TZDIR_VAR)
        .unwrap_or_else(|_| "/usr/share/zoneinfo".to_string())
        .into()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct LocalTimeType {
    offset_millis: i64,
    is_dst: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Transition {
    // Unix milliseconds at which `local_time_type` takes effect.
    at: i64,
    local_time_type: LocalTimeType,
}

/// A zone from the IANA time zone database.
#[derive(Clone, Debug)]
pub struct ZoneInfo {
    name: String,
    initial: LocalTimeType,
    transitions: Vec<Transition>,
}

impl ZoneInfo {
    /// Load a zone such as `Europe/Stockholm` from [`tzdir`].
    #[instrument]
    pub fn load(name: &str) -> Result<Self> {
        let path = tzdir().join(name);
        let data = std::fs::read(&path).map_err(|source| Error::TimeZoneNotFound {
            name: name.to_string(),
            source,
        })?;
        let zone = Self::parse(name, data)?;
        debug!(?path, transitions = zone.transitions.len(), "loaded time zone");
        Ok(zone)
    }

    /// Parse the contents of a compiled zone (TZif) file.
    pub fn parse(name: &str, data: Vec<u8>) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidTimeZone {
            name: name.to_string(),
            reason,
        };
        let tz = parse(data).map_err(|e| invalid(format!("{:?}", e)))?;
        let timespans = &tz.time_zone.fixed_timespans;

        let initial = LocalTimeType {
            offset_millis: timespans.first.offset * MS_PER_SECOND,
            is_dst: timespans.first.is_dst,
        };
        let mut transitions: Vec<Transition> = timespans
            .rest
            .iter()
            .map(|(at, span)| Transition {
                at: at * MS_PER_SECOND,
                local_time_type: LocalTimeType {
                    offset_millis: span.offset * MS_PER_SECOND,
                    is_dst: span.is_dst,
                },
            })
            .collect();
        transitions.sort_by_key(|t| t.at);

        Ok(ZoneInfo {
            name: name.to_string(),
            initial,
            transitions,
        })
    }

    fn local_time_type(&self, utc: RataDie) -> LocalTimeType {
        let millis = ((utc.value() - UNIX_EPOCH as f64) * MS_PER_DAY as f64).round() as i64;
        let index = self.transitions.partition_point(|t| t.at <= millis);
        if index == 0 {
            self.initial
        } else {
            self.transitions[index - 1].local_time_type
        }
    }
}

impl TimeZone for ZoneInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset_millis(&self, utc: RataDie) -> i64 {
        self.local_time_type(utc).offset_millis
    }

    fn in_daylight_time(&self, utc: RataDie) -> bool {
        self.local_time_type(utc).is_dst
    }
}

/// The zone the C library is configured with, through `TZ` or `/etc/localtime`.
#[cfg(unix)]
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemLocal;

#[cfg(unix)]
impl SystemLocal {
    fn local_tm(utc: RataDie) -> libc::tm {
        let millis = ((utc.value() - UNIX_EPOCH as f64) * MS_PER_DAY as f64).round() as i64;
        let seconds = millis.div_floor(&MS_PER_SECOND) as libc::time_t;
        let mut local = libc::tm {
            tm_sec: 0,
            tm_min: 0,
            tm_hour: 0,
            tm_mday: 1,
            tm_mon: 0,
            tm_year: 0,
            tm_wday: 0,
            tm_yday: 0,
            tm_isdst: 0,
            tm_gmtoff: 0,
            tm_zone: std::ptr::null_mut(),
        };
        unsafe {
            libc::localtime_r(&seconds, &mut local);
        }
        local
    }
}

#[cfg(unix)]
impl TimeZone for SystemLocal {
    fn name(&self) -> &str {
        "local"
    }

    fn offset_millis(&self, utc: RataDie) -> i64 {
        Self::local_tm(utc).tm_gmtoff as i64 * MS_PER_SECOND
    }

    fn in_daylight_time(&self, utc: RataDie) -> bool {
        Self::local_tm(utc).tm_isdst > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::gregorian::fixed_from_gregorian;
    use crate::rata_die::MS_PER_HOUR;

    fn rd(y: i64, m: u32, d: u32, hour: f64) -> RataDie {
        RataDie::new(fixed_from_gregorian(y, m, d) as f64 + hour / 24.0)
    }

    // Zone files are not available everywhere; skip the test when they are missing.
    fn load(name: &str) -> Option<ZoneInfo> {
        match ZoneInfo::load(name) {
            Ok(zone) => Some(zone),
            Err(Error::TimeZoneNotFound { .. }) => None,
            Err(e) => panic!("failed to load {}: {}", name, e),
        }
    }

    #[test]
    fn test_fixed_offset() {
        let zone = FixedOffset::new("UTC+5:30", 5 * MS_PER_HOUR + 30 * 60_000);
        assert_eq!(zone.offset_millis(rd(2024, 1, 1, 0.0)), 19_800_000);
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 1, 1, 0.0)), 19_800_000);
        assert!(!zone.in_daylight_time(rd(2024, 7, 1, 0.0)));
        assert_eq!(FixedOffset::utc().name(), "UTC");
    }

    // A version 1 TZif file: CET, CEST from 2024-03-31T01:00Z, CET from 2024-10-27T01:00Z.
    fn central_europe_2024() -> Vec<u8> {
        let mut data = b"TZif".to_vec();
        data.extend_from_slice(&[0; 16]);
        for count in [0u32, 0, 0, 2, 2, 9] {
            data.extend_from_slice(&count.to_be_bytes());
        }
        data.extend_from_slice(&1_711_846_800i32.to_be_bytes());
        data.extend_from_slice(&1_729_990_800i32.to_be_bytes());
        data.extend_from_slice(&[1, 0]);
        data.extend_from_slice(&3600i32.to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&7200i32.to_be_bytes());
        data.extend_from_slice(&[1, 4]);
        data.extend_from_slice(b"CET\0CEST\0");
        data
    }

    #[test]
    fn test_parse_zone_data() {
        let zone = ZoneInfo::parse("Test/Central", central_europe_2024()).unwrap();
        assert_eq!(zone.name(), "Test/Central");
        assert_eq!(zone.transitions.len(), 2);
        // Before the first transition.
        assert_eq!(zone.offset_millis(rd(2024, 1, 15, 12.0)), MS_PER_HOUR);
        assert!(!zone.in_daylight_time(rd(1900, 1, 1, 0.0)));
        assert_eq!(zone.offset_millis(rd(2024, 3, 31, 0.99)), MS_PER_HOUR);
        assert_eq!(zone.offset_millis(rd(2024, 3, 31, 1.0)), 2 * MS_PER_HOUR);
        assert!(zone.in_daylight_time(rd(2024, 7, 15, 12.0)));
        assert_eq!(zone.offset_millis(rd(2024, 12, 1, 0.0)), MS_PER_HOUR);
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 3, 31, 2.5)), MS_PER_HOUR);
    }

    #[test]
    fn test_zone_info() {
        let Some(zone) = load("Europe/Stockholm") else {
            return;
        };
        assert_eq!(zone.name(), "Europe/Stockholm");
        assert_eq!(zone.offset_millis(rd(2024, 1, 15, 12.0)), MS_PER_HOUR);
        assert!(!zone.in_daylight_time(rd(2024, 1, 15, 12.0)));
        assert_eq!(zone.offset_millis(rd(2024, 7, 15, 12.0)), 2 * MS_PER_HOUR);
        assert!(zone.in_daylight_time(rd(2024, 7, 15, 12.0)));
        // Summer time started at 01:00 UTC on 2024-03-31.
        assert_eq!(zone.offset_millis(rd(2024, 3, 31, 0.99)), MS_PER_HOUR);
        assert_eq!(zone.offset_millis(rd(2024, 3, 31, 1.0)), 2 * MS_PER_HOUR);
    }

    #[test]
    fn test_wall_time_resolution() {
        let Some(zone) = load("Europe/Stockholm") else {
            return;
        };
        // 02:30 on 2024-03-31 never happened; it gets the winter offset.
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 3, 31, 2.5)), MS_PER_HOUR);
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 3, 31, 3.5)), 2 * MS_PER_HOUR);
        // 02:30 on 2024-10-27 happened twice; the summer offset came first.
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 10, 27, 2.5)), 2 * MS_PER_HOUR);
        assert_eq!(zone.offset_millis_wall_time(rd(2024, 10, 27, 3.5)), MS_PER_HOUR);
    }

    #[test]
    fn test_zone_without_transitions() {
        let Some(zone) = load("Etc/GMT+5") else {
            return;
        };
        assert_eq!(zone.offset_millis(rd(2024, 7, 1, 0.0)), -5 * MS_PER_HOUR);
        assert_eq!(zone.offset_millis(rd(1900, 1, 1, 0.0)), -5 * MS_PER_HOUR);
        assert!(!zone.in_daylight_time(rd(2024, 7, 1, 0.0)));
    }

    #[test]
    fn test_unknown_zone() {
        assert!(matches!(
            ZoneInfo::load("Nowhere/Atlantis"),
            Err(Error::TimeZoneNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_zone_file() {
        let result = ZoneInfo::parse("garbage", b"not a zone file".to_vec());
        assert!(matches!(result, Err(Error::InvalidTimeZone { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_local_is_consistent() {
        let utc = rd(2024, 6, 1, 12.0);
        let offset = SystemLocal.offset_millis(utc);
        assert!(offset.abs() <= 14 * MS_PER_HOUR);
        let local = utc.add_days(offset as f64 / MS_PER_DAY as f64);
        assert_eq!(SystemLocal.offset_millis_wall_time(local), offset);
    }
}
