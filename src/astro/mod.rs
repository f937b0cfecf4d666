//! Solar and lunar positions, equinoxes and new moons.
//!
//! Everything here works on Julian Days in universal time unless a name says otherwise
//! (`jde` is a Julian Ephemeris Day in dynamical time). Angles are in degrees.

use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{instrument, warn};

use crate::error::{Error, Result};

mod lunar;
mod solar;
mod table;
mod time;

pub use solar::{Nutation, SunPosition};
pub use table::{
    CoefficientTable, DeltaTTable, DirectoryLoader, EmbeddedLoader, EquinoxTerms,
    LunarLongitudeTerm, NewMoonAdditionalTerm, NewMoonTerm, NutationTerm, SolarLongitudeTerms,
    TableLoader, ASTRO_TABLE, DATA_DIR_VAR,
};
pub use time::Season;

pub const MEAN_SYNODIC_MONTH: f64 = 29.530588853;
pub const MEAN_TROPICAL_YEAR: f64 = 365.242189;
pub const JULIAN_CENTURY: f64 = 36_525.0;

lazy_static! {
    static ref SHARED: Option<Arc<CoefficientTable>> =
        match table::load_table(&EmbeddedLoader, ASTRO_TABLE) {
            Ok(table) => Some(Arc::new(table)),
            Err(e) => {
                warn!(error = %e, "embedded coefficient table could not be loaded");
                None
            }
        };
}

/// Handle to a loaded coefficient table. Cloning is cheap; the table is shared.
#[derive(Debug, Clone)]
pub struct Astro {
    table: Arc<CoefficientTable>,
}

impl Astro {
    /// Load the coefficient table through `loader`.
    #[instrument(skip(loader))]
    pub fn load<L: TableLoader + ?Sized>(loader: &L) -> Result<Self> {
        let table = table::load_table(loader, ASTRO_TABLE)?;
        Ok(Astro {
            table: Arc::new(table),
        })
    }

    pub fn from_table(table: CoefficientTable) -> Result<Self> {
        table.validate(ASTRO_TABLE)?;
        Ok(Astro {
            table: Arc::new(table),
        })
    }

    /// The table compiled into the library, parsed on first use and shared by every
    /// handle in the process.
    pub fn shared() -> Result<Self> {
        match SHARED.as_ref() {
            Some(table) => Ok(Astro {
                table: table.clone(),
            }),
            None => Err(Error::DataNotLoaded {
                name: ASTRO_TABLE.to_string(),
            }),
        }
    }

    pub fn table(&self) -> &CoefficientTable {
        &self.table
    }
}

pub(crate) fn dtr(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub(crate) fn rtd(radians: f64) -> f64 {
    radians.to_degrees()
}

pub fn dsin(degrees: f64) -> f64 {
    dtr(degrees).sin()
}

pub fn dcos(degrees: f64) -> f64 {
    dtr(degrees).cos()
}

pub fn dtan(degrees: f64) -> f64 {
    dtr(degrees).tan()
}

/// Reduce an angle in degrees to `[0, 360)`.
pub fn fix_angle(degrees: f64) -> f64 {
    let a = degrees - 360.0 * (degrees / 360.0).floor();
    // -1e-20 would otherwise come out as 360.0
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Reduce an angle in radians to `[0, 2π)`.
pub fn fix_angle_radians(radians: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let a = radians - tau * (radians / tau).floor();
    if a >= tau {
        0.0
    } else {
        a
    }
}

/// Evaluate `coefficients[0] + coefficients[1] * x + ...` by Horner's rule.
pub fn poly(x: f64, coefficients: &[f64]) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}
