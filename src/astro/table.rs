use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Name of the table holding every series the engine evaluates.
pub const ASTRO_TABLE: &str = "astro";

const EMBEDDED_ASTRO: &str = include_str!("../../data/astro.json");

/// Periodic terms of the solar longitude series: `x * sin(y + z * c)` with `c` in Julian
/// centuries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarLongitudeTerms {
    pub coefficients: Vec<f64>,
    pub addends: Vec<f64>,
    pub multipliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LunarLongitudeTerm {
    pub elongation: f64,
    pub solar_anomaly: f64,
    pub lunar_anomaly: f64,
    pub moon_node: f64,
    /// Amplitude in millionths of a degree.
    pub sine: f64,
}

/// One row of the IAU 1980 nutation series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutationTerm {
    /// Multipliers of D, M, M', F and the longitude of the ascending node.
    pub arguments: [f64; 5],
    /// Longitude amplitude and its rate per decade, then obliquity amplitude and its rate,
    /// in units of 0.0001 arcseconds.
    pub coefficients: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquinoxTerms {
    /// Polynomials in millennia from year 0, one row per season.
    pub before1000: Vec<[f64; 5]>,
    /// Polynomials in millennia from year 2000, one row per season.
    pub after1000: Vec<[f64; 5]>,
    /// Amplitude, phase and rate of the periodic correction.
    pub periodic: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaTTable {
    pub start_year: f64,
    pub step: f64,
    /// Seconds of TT - UT at `start_year + i * step`.
    pub values: Vec<f64>,
}

impl DeltaTTable {
    pub fn end_year(&self) -> f64 {
        self.start_year + self.step * (self.values.len().saturating_sub(1)) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoonTerm {
    /// Power of the eccentricity factor E.
    pub e_factor: f64,
    pub solar_anomaly: f64,
    pub lunar_anomaly: f64,
    pub moon_argument: f64,
    pub sine: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoonAdditionalTerm {
    pub constant: f64,
    pub coefficient: f64,
    pub factor: f64,
}

/// Every numeric series the astronomical engine needs. Loaded once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientTable {
    pub solar_longitude: SolarLongitudeTerms,
    pub lunar_longitude: Vec<LunarLongitudeTerm>,
    pub nutation: Vec<NutationTerm>,
    /// Laskar's obliquity polynomial, arcseconds per power of `u` (10,000 Julian years).
    pub obliquity: Vec<f64>,
    pub equinox: EquinoxTerms,
    pub delta_t: DeltaTTable,
    pub new_moon: Vec<NewMoonTerm>,
    pub new_moon_additional: Vec<NewMoonAdditionalTerm>,
}

impl CoefficientTable {
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let table: CoefficientTable =
            serde_json::from_str(text).map_err(|source| Error::InvalidData {
                name: name.to_string(),
                source,
            })?;
        table.validate(name)?;
        Ok(table)
    }

    /// Check that the series line up with each other. The evaluation code indexes the
    /// parallel arrays together and picks equinox rows by season.
    pub fn validate(&self, name: &str) -> Result<()> {
        let inconsistent = |reason: String| Error::InconsistentData {
            name: name.to_string(),
            reason,
        };
        let solar = &self.solar_longitude;
        if solar.coefficients.len() != solar.addends.len()
            || solar.coefficients.len() != solar.multipliers.len()
        {
            return Err(inconsistent(format!(
                "solar longitude series have {}, {} and {} terms",
                solar.coefficients.len(),
                solar.addends.len(),
                solar.multipliers.len()
            )));
        }
        if self.equinox.before1000.len() != 4 || self.equinox.after1000.len() != 4 {
            return Err(inconsistent(
                "equinox polynomials need one row per season".to_string(),
            ));
        }
        if self.delta_t.values.len() < 2 || self.delta_t.step <= 0.0 {
            return Err(inconsistent(
                "delta T table needs at least two entries and a positive step".to_string(),
            ));
        }
        Ok(())
    }
}

/// A source of coefficient tables by name.
pub trait TableLoader {
    /// Return the raw JSON text of the table called `name`.
    fn load(&self, name: &str) -> Result<String>;
}

/// Serves the tables compiled into the library.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedLoader;

impl TableLoader for EmbeddedLoader {
    fn load(&self, name: &str) -> Result<String> {
        match name {
            ASTRO_TABLE => Ok(EMBEDDED_ASTRO.to_string()),
            _ => Err(Error::DataNotFound {
                name: name.to_string(),
                path: PathBuf::from(name),
                source: io::Error::new(io::ErrorKind::NotFound, "no embedded table"),
            }),
        }
    }
}

/// Reads `<name>.json` from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

/// Environment variable naming the directory `DirectoryLoader::from_env` reads from.
pub const DATA_DIR_VAR: &str = "CALENDRICAL_DATA_DIR";

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryLoader { dir: dir.into() }
    }

    /// A loader for the directory in `CALENDRICAL_DATA_DIR`, if the variable is set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(DATA_DIR_VAR).map(Self::new)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TableLoader for DirectoryLoader {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(format!("{}.json", name));
        debug!(path = %path.display(), "reading coefficient table");
        std::fs::read_to_string(&path).map_err(|source| Error::DataNotFound {
            name: name.to_string(),
            path,
            source,
        })
    }
}

pub(crate) fn load_table<L: TableLoader + ?Sized>(
    loader: &L,
    name: &str,
) -> Result<CoefficientTable> {
    let text = loader.load(name)?;
    let table = CoefficientTable::parse(name, &text)?;
    debug!(
        name,
        solar_terms = table.solar_longitude.coefficients.len(),
        lunar_terms = table.lunar_longitude.len(),
        nutation_terms = table.nutation.len(),
        "loaded coefficient table"
    );
    Ok(table)
}
