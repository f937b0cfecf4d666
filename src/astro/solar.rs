use serde::{Deserialize, Serialize};

use super::{
    dcos, dsin, dtr, fix_angle, fix_angle_radians, poly, rtd, Astro, JULIAN_CENTURY,
    MEAN_TROPICAL_YEAR,
};
use crate::rata_die::J2000;
use crate::search::bisection_search;

/// Nutation in longitude and in obliquity, in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nutation {
    pub delta_psi: f64,
    pub delta_epsilon: f64,
}

/// Low-precision position of the Sun, after Meeus chapter 25. Angles in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub mean_longitude: f64,
    pub mean_anomaly: f64,
    pub eccentricity: f64,
    pub equation_of_center: f64,
    pub true_longitude: f64,
    pub true_anomaly: f64,
    /// Distance in astronomical units.
    pub radius_vector: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub apparent_longitude: f64,
    /// Obliquity corrected for nutation, as used for the apparent coordinates.
    pub inclination: f64,
    pub apparent_right_ascension: f64,
    pub apparent_declination: f64,
}

// 23°26'21.448"
const J2000_OBLIQUITY: f64 = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0;

const NUTATION_UNITS: f64 = 3600.0 * 10_000.0;

// The solar longitude amplitudes are in units of 1e-7 radians.
const SOLAR_SERIES_SCALE: f64 = 0.000005729577951308232;

impl Astro {
    /// Mean obliquity of the ecliptic (Laskar). The polynomial only holds within
    /// 10,000 years of J2000; further out the J2000 value is returned.
    pub fn obliquity(&self, jd: f64) -> f64 {
        let u = (jd - J2000) / 3_652_500.0;
        let mut eps = J2000_OBLIQUITY;
        if u.abs() < 1.0 {
            let mut v = u;
            for term in &self.table().obliquity {
                eps += term / 3600.0 * v;
                v *= u;
            }
        }
        eps
    }

    pub fn nutation(&self, jd: f64) -> Nutation {
        let t = (jd - J2000) / JULIAN_CENTURY;
        let t2 = t * t;
        let t3 = t2 * t;

        let fundamentals = [
            // Mean elongation of the Moon from the Sun.
            297.850363 + 445267.11148 * t - 0.0019142 * t2 + t3 / 189474.0,
            // Mean anomaly of the Sun.
            357.52772 + 35999.05034 * t - 0.0001603 * t2 - t3 / 300000.0,
            // Mean anomaly of the Moon.
            134.96298 + 477198.867398 * t + 0.0086972 * t2 + t3 / 56250.0,
            // Moon's argument of latitude.
            93.27191 + 483202.017538 * t - 0.0036825 * t2 + t3 / 327270.0,
            // Longitude of the Moon's ascending node.
            125.04452 - 1934.136261 * t + 0.0020708 * t2 + t3 / 450000.0,
        ]
        .map(|degrees| fix_angle_radians(dtr(degrees)));

        let decades = t / 10.0;
        let mut delta_psi = 0.0;
        let mut delta_epsilon = 0.0;
        for term in &self.table().nutation {
            let angle: f64 = term
                .arguments
                .iter()
                .zip(fundamentals.iter())
                .map(|(multiplier, fundamental)| multiplier * fundamental)
                .sum();
            let [psi, psi_rate, eps, eps_rate] = term.coefficients;
            delta_psi += (psi + psi_rate * decades) * angle.sin();
            delta_epsilon += (eps + eps_rate * decades) * angle.cos();
        }

        Nutation {
            delta_psi: delta_psi / NUTATION_UNITS,
            delta_epsilon: delta_epsilon / NUTATION_UNITS,
        }
    }

    pub fn sun_position(&self, jd: f64) -> SunPosition {
        let t = (jd - J2000) / JULIAN_CENTURY;
        let t2 = t * t;

        let mean_longitude = fix_angle(280.46646 + 36000.76983 * t + 0.0003032 * t2);
        let mean_anomaly = fix_angle(357.52911 + 35999.05029 * t - 0.0001537 * t2);
        let eccentricity = 0.016708634 - 0.000042037 * t - 0.0000001267 * t2;
        let equation_of_center = (1.914602 - 0.004817 * t - 0.000014 * t2) * dsin(mean_anomaly)
            + (0.019993 - 0.000101 * t) * dsin(2.0 * mean_anomaly)
            + 0.000289 * dsin(3.0 * mean_anomaly);
        let true_longitude = mean_longitude + equation_of_center;
        let true_anomaly = mean_anomaly + equation_of_center;
        let radius_vector = (1.000001018 * (1.0 - eccentricity * eccentricity))
            / (1.0 + eccentricity * dcos(true_anomaly));

        let omega = 125.04 - 1934.136 * t;
        let apparent_longitude = true_longitude - 0.00569 - 0.00478 * dsin(omega);
        let epsilon0 = self.obliquity(jd);
        let inclination = epsilon0 + 0.00256 * dcos(omega);

        let right_ascension = fix_angle(rtd(
            (dcos(epsilon0) * dsin(true_longitude)).atan2(dcos(true_longitude)),
        ));
        let declination = rtd((dsin(epsilon0) * dsin(true_longitude)).asin());
        let apparent_right_ascension = fix_angle(rtd(
            (dcos(inclination) * dsin(apparent_longitude)).atan2(dcos(apparent_longitude)),
        ));
        let apparent_declination = rtd((dsin(inclination) * dsin(apparent_longitude)).asin());

        SunPosition {
            mean_longitude,
            mean_anomaly,
            eccentricity,
            equation_of_center,
            true_longitude,
            true_anomaly,
            radius_vector,
            right_ascension,
            declination,
            apparent_longitude,
            inclination,
            apparent_right_ascension,
            apparent_declination,
        }
    }

    /// Apparent minus mean solar time, as a fraction of a day.
    pub fn equation_of_time(&self, jd: f64) -> f64 {
        let tau = (jd - J2000) / 365_250.0;
        let mean_longitude = fix_angle(poly(
            tau,
            &[
                280.4664567,
                360007.6982779,
                0.03032028,
                1.0 / 49931.0,
                -1.0 / 15300.0,
                -1.0 / 2_000_000.0,
            ],
        ));
        let alpha = self.sun_position(jd).apparent_right_ascension;
        let nutation = self.nutation(jd);
        let epsilon = self.obliquity(jd) + nutation.delta_epsilon;

        let mut e = mean_longitude - 0.0057183 - alpha + nutation.delta_psi * dcos(epsilon);
        // The two longitudes may sit on either side of 0°.
        if e > 180.0 {
            e -= 360.0;
        } else if e < -180.0 {
            e += 360.0;
        }
        // Four minutes of time per degree.
        e * 4.0 / 1440.0
    }

    /// Apparent geocentric longitude of the Sun, in `[0, 360)`.
    pub fn solar_longitude(&self, jd: f64) -> f64 {
        let c = self.julian_centuries(jd);
        let terms = &self.table().solar_longitude;
        let series: f64 = terms
            .coefficients
            .iter()
            .zip(terms.addends.iter())
            .zip(terms.multipliers.iter())
            .map(|((x, y), z)| x * dsin(y + z * c))
            .sum();
        let lambda = 282.7771834 + 36000.76953744 * c + SOLAR_SERIES_SCALE * series;
        fix_angle(lambda + aberration(c) + short_nutation(c))
    }

    /// First moment at or after `jd` when the Sun's longitude reaches `target` degrees.
    pub fn next_solar_longitude(&self, jd: f64, target: f64) -> f64 {
        let rate = MEAN_TROPICAL_YEAR / 360.0;
        let tau = jd + rate * fix_angle(target - self.solar_longitude(jd));
        let low = jd.max(tau - 5.0);
        let high = tau + 5.0;
        bisection_search(0.0, low, high, 1e-6, |l| {
            180.0 - fix_angle(self.solar_longitude(l) - target)
        })
    }
}

/// Aberration of light, in degrees, for `c` Julian centuries.
pub(crate) fn aberration(c: f64) -> f64 {
    0.0000974 * dcos(177.63 + 35999.01848 * c) - 0.005575
}

/// The two largest nutation terms, enough for calendar work.
pub(crate) fn short_nutation(c: f64) -> f64 {
    let a = 124.90 - 1934.134 * c + 0.002063 * c * c;
    let b = 201.11 + 72001.5377 * c + 0.00057 * c * c;
    -0.004778 * dsin(a) - 0.0003667 * dsin(b)
}
