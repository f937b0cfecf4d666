use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown calendar type \"{0}\"")]
    UnknownCalendarType(String),

    /// A field is outside the range the calendar allows for the given year/month.
    #[error("invalid date components: {field} = {value}")]
    InvalidDateComponents { field: &'static str, value: i64 },

    #[error("unknown rounding mode \"{0}\"")]
    UnknownRoundingMode(String),

    #[error("missing date component: {0}")]
    MissingField(&'static str),

    /// The astronomical coefficient table has not been (or could not be) loaded.
    #[error("astronomical data \"{name}\" is not loaded")]
    DataNotLoaded { name: String },

    #[error("astronomical data \"{name}\" not found at {path:?}")]
    DataNotFound {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("astronomical data \"{name}\" is malformed")]
    InvalidData {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("astronomical data \"{name}\" is inconsistent: {reason}")]
    InconsistentData { name: String, reason: String },

    #[error("rata die {rata_die} cannot be represented as unix time")]
    UnrepresentableUnixTime { rata_die: f64 },

    #[error("time zone \"{name}\" not found")]
    TimeZoneNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("time zone \"{name}\" is invalid: {reason}")]
    InvalidTimeZone { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Error::UnknownCalendarType("mayan".to_string());
        assert_eq!(e.to_string(), "unknown calendar type \"mayan\"");

        let e = Error::InvalidDateComponents {
            field: "month",
            value: 14,
        };
        assert_eq!(e.to_string(), "invalid date components: month = 14");

        let e = Error::DataNotLoaded {
            name: "astro".to_string(),
        };
        assert_eq!(e.to_string(), "astronomical data \"astro\" is not loaded");

        let e = Error::UnrepresentableUnixTime { rata_die: 1.5 };
        assert_eq!(e.to_string(), "rata die 1.5 cannot be represented as unix time");
    }

    #[test]
    fn test_source_is_chained() {
        use std::error::Error as _;
        let e = Error::TimeZoneNotFound {
            name: "Mars/Olympus_Mons".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: std::error::Error + Send + Sync + 'static>() {}
        assert_impl::<Error>();
    }
}
