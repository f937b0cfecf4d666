use serde::{Deserialize, Serialize};

use super::{dcos, poly, Astro, JULIAN_CENTURY};
use crate::rata_die::J2000;

/// The four points of the tropical year.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    MarchEquinox,
    JuneSolstice,
    SeptemberEquinox,
    DecemberSolstice,
}

impl Season {
    pub fn index(self) -> usize {
        match self {
            Season::MarchEquinox => 0,
            Season::JuneSolstice => 1,
            Season::SeptemberEquinox => 2,
            Season::DecemberSolstice => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Season::MarchEquinox),
            1 => Some(Season::JuneSolstice),
            2 => Some(Season::SeptemberEquinox),
            3 => Some(Season::DecemberSolstice),
            _ => None,
        }
    }
}

/// Fractional Gregorian year of a Julian Day, close enough for delta T.
pub(crate) fn fractional_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000) / 365.25
}

impl Astro {
    /// TT - UT in seconds for a (fractional) year.
    ///
    /// Between 1620 and 2014 this interpolates the tabulated observations; outside that
    /// range it falls back to the Morrison and Stephenson style parabolas.
    pub fn delta_t(&self, year: f64) -> f64 {
        let table = &self.table().delta_t;
        if year >= table.start_year && year <= table.end_year() {
            let position = (year - table.start_year) / table.step;
            let index = (position.floor() as usize).min(table.values.len() - 2);
            let fraction = position - index as f64;
            let low = table.values[index];
            let high = table.values[index + 1];
            return low + (high - low) * fraction;
        }

        let t = (year - 2000.0) / 100.0;
        if year < 948.0 {
            2177.0 + 497.0 * t + 44.1 * t * t
        } else {
            let mut dt = 102.0 + 102.0 * t + 25.3 * t * t;
            if year > 2000.0 && year < 2100.0 {
                dt += 0.37 * (year - 2100.0);
            }
            dt
        }
    }

    pub fn dynamical_from_universal(&self, jd: f64) -> f64 {
        jd + self.delta_t(fractional_year(jd)) / 86_400.0
    }

    pub fn universal_from_dynamical(&self, jde: f64) -> f64 {
        jde - self.delta_t(fractional_year(jde)) / 86_400.0
    }

    /// Julian centuries of dynamical time since J2000.
    pub fn julian_centuries(&self, jd: f64) -> f64 {
        (self.dynamical_from_universal(jd) - J2000) / JULIAN_CENTURY
    }

    /// Julian Ephemeris Day of an equinox or solstice, after Meeus chapter 27.
    pub fn equinox(&self, year: i64, season: Season) -> f64 {
        let terms = &self.table().equinox;
        let (rows, y) = if year < 1000 {
            (&terms.before1000, year as f64 / 1000.0)
        } else {
            (&terms.after1000, (year - 2000) as f64 / 1000.0)
        };
        let jde0 = poly(y, &rows[season.index()]);

        let t = (jde0 - J2000) / JULIAN_CENTURY;
        let w = 35999.373 * t - 2.47;
        let delta_lambda = 1.0 + 0.0334 * dcos(w) + 0.0007 * dcos(2.0 * w);
        let s: f64 = terms
            .periodic
            .iter()
            .map(|[a, b, c]| a * dcos(b + c * t))
            .sum();

        jde0 + (0.00001 * s) / delta_lambda
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn astro() -> Astro {
        Astro::shared().unwrap()
    }

    #[test]
    fn test_delta_t() {
        let astro = astro();
        assert_abs_diff_eq!(astro.delta_t(1620.0), 121.0, epsilon = 1e-9);
        assert_abs_diff_eq!(astro.delta_t(2014.0), 67.3, epsilon = 1e-9);
        // Halfway between two tabulated years.
        let low = astro.table().delta_t.values[190];
        let high = astro.table().delta_t.values[191];
        assert_abs_diff_eq!(astro.delta_t(2001.0), (low + high) / 2.0, epsilon = 1e-9);
        // Around 64 seconds at the turn of the millennium.
        assert!((astro.delta_t(2000.0) - 63.8).abs() < 1.0);

        // Extrapolations.
        let t: f64 = (500.0 - 2000.0) / 100.0;
        assert_abs_diff_eq!(astro.delta_t(500.0), 2177.0 + 497.0 * t + 44.1 * t * t);
        let t: f64 = 0.5;
        assert_abs_diff_eq!(
            astro.delta_t(2050.0),
            102.0 + 102.0 * t + 25.3 * t * t + 0.37 * (2050.0 - 2100.0)
        );
        let t: f64 = 2.0;
        assert_abs_diff_eq!(astro.delta_t(2200.0), 102.0 + 102.0 * t + 25.3 * t * t);
    }

    #[test]
    fn test_time_scales() {
        let astro = astro();
        let jd = 2_460_000.5;
        let jde = astro.dynamical_from_universal(jd);
        assert!(jde > jd);
        assert_abs_diff_eq!(astro.universal_from_dynamical(jde), jd, epsilon = 1e-8);
    }

    #[test]
    fn test_equinox() {
        let astro = astro();
        // June solstice 1962, Meeus example 27.a.
        assert_abs_diff_eq!(
            astro.equinox(1962, Season::JuneSolstice),
            2_437_837.392_45,
            epsilon = 1e-4
        );
        // 2024-03-20T03:06Z.
        let jde = astro.equinox(2024, Season::MarchEquinox);
        assert_abs_diff_eq!(astro.universal_from_dynamical(jde), 2_460_389.629, epsilon = 0.005);
        // 2023-12-22T03:27Z.
        let jde = astro.equinox(2023, Season::DecemberSolstice);
        assert_abs_diff_eq!(astro.universal_from_dynamical(jde), 2_460_300.644, epsilon = 0.005);
    }

    #[test]
    fn test_season_index() {
        for i in 0..4 {
            assert_eq!(Season::from_index(i).unwrap().index(), i);
        }
        assert_eq!(Season::from_index(4), None);
    }
}
