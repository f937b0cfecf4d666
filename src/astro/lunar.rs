use tracing::trace;

use super::solar::short_nutation;
use super::{dsin, fix_angle, poly, Astro, MEAN_SYNODIC_MONTH};
use crate::rata_die::J2000;

// Index of the new moon of 2000-01-06 when counting from the first new moon of RD 1.
const NEW_MOON_OFFSET: i64 = 24_724;
// Mean lunations per Julian century.
const LUNATIONS_PER_CENTURY: f64 = 1236.85;

impl Astro {
    /// Apparent geocentric longitude of the Moon, in `[0, 360)`.
    pub fn lunar_longitude(&self, jd: f64) -> f64 {
        let c = self.julian_centuries(jd);
        let mean_longitude = poly(
            c,
            &[
                218.3164477,
                481267.88123421,
                -0.0015786,
                1.0 / 538841.0,
                -1.0 / 65194000.0,
            ],
        );
        let elongation = poly(
            c,
            &[
                297.8501921,
                445267.1114034,
                -0.0018819,
                1.0 / 545868.0,
                -1.0 / 113065000.0,
            ],
        );
        let solar_anomaly = poly(c, &[357.5291092, 35999.0502909, -0.0001536, 1.0 / 24490000.0]);
        let lunar_anomaly = poly(
            c,
            &[
                134.9633964,
                477198.8675055,
                0.0087414,
                1.0 / 69699.0,
                -1.0 / 14712000.0,
            ],
        );
        let moon_node = poly(
            c,
            &[
                93.2720950,
                483202.0175233,
                -0.0036539,
                -1.0 / 3526000.0,
                1.0 / 863310000.0,
            ],
        );
        let e = poly(c, &[1.0, -0.002516, -0.0000074]);

        let correction: f64 = self
            .table()
            .lunar_longitude
            .iter()
            .map(|term| {
                term.sine
                    * e.powi(term.solar_anomaly.abs() as i32)
                    * dsin(
                        term.elongation * elongation
                            + term.solar_anomaly * solar_anomaly
                            + term.lunar_anomaly * lunar_anomaly
                            + term.moon_node * moon_node,
                    )
            })
            .sum::<f64>()
            / 1_000_000.0;

        let venus = 0.003958 * dsin(119.75 + c * 131.849);
        let jupiter = 0.000318 * dsin(53.09 + c * 479264.29);
        let flat_earth = 0.001962 * dsin(mean_longitude - moon_node);

        fix_angle(
            mean_longitude + correction + venus + jupiter + flat_earth + short_nutation(c),
        )
    }

    /// Angle between the Moon and the Sun as seen from Earth: 0 at new moon, 180 at full.
    pub fn lunar_phase(&self, jd: f64) -> f64 {
        fix_angle(self.lunar_longitude(jd) - self.solar_longitude(jd))
    }

    /// Universal time of new moon number `n`, counted so that new moon 0 is the first one
    /// after RD 0.
    pub fn new_moon_time(&self, n: i64) -> f64 {
        let k = (n - NEW_MOON_OFFSET) as f64;
        let c = k / LUNATIONS_PER_CENTURY;

        let approx = J2000
            + poly(
                c,
                &[
                    5.09766,
                    MEAN_SYNODIC_MONTH * LUNATIONS_PER_CENTURY,
                    0.00015437,
                    -0.000000150,
                    0.00000000073,
                ],
            );
        let e = poly(c, &[1.0, -0.002516, -0.0000074]);
        let solar_anomaly = poly(
            c,
            &[
                2.5534,
                LUNATIONS_PER_CENTURY * 29.10535670,
                -0.0000014,
                -0.00000011,
            ],
        );
        let lunar_anomaly = poly(
            c,
            &[
                201.5643,
                385.81693528 * LUNATIONS_PER_CENTURY,
                0.0107582,
                0.00001238,
                -0.000000058,
            ],
        );
        let moon_argument = poly(
            c,
            &[
                160.7108,
                390.67050284 * LUNATIONS_PER_CENTURY,
                -0.0016118,
                -0.00000227,
                0.000000011,
            ],
        );
        let omega = poly(
            c,
            &[
                124.7746,
                -1.56375588 * LUNATIONS_PER_CENTURY,
                0.0020672,
                0.00000215,
            ],
        );

        let correction = -0.00017 * dsin(omega)
            + self
                .table()
                .new_moon
                .iter()
                .map(|term| {
                    term.sine
                        * e.powi(term.e_factor as i32)
                        * dsin(
                            term.solar_anomaly * solar_anomaly
                                + term.lunar_anomaly * lunar_anomaly
                                + term.moon_argument * moon_argument,
                        )
                })
                .sum::<f64>();
        let extra = 0.000325 * dsin(poly(c, &[299.77, 132.8475848, -0.009173]));
        let additional: f64 = self
            .table()
            .new_moon_additional
            .iter()
            .map(|term| term.factor * dsin(term.constant + term.coefficient * k))
            .sum();

        self.universal_from_dynamical(approx + correction + extra + additional)
    }

    // Index of the new moon closest to being the last one before jd.
    fn estimate_new_moon_index(&self, jd: f64) -> i64 {
        let t0 = self.new_moon_time(0);
        let phase = self.lunar_phase(jd);
        ((jd - t0) / MEAN_SYNODIC_MONTH - phase / 360.0).round() as i64
    }

    /// Moment of the last new moon strictly before `jd`.
    pub fn new_moon_before(&self, jd: f64) -> f64 {
        let mut n = self.estimate_new_moon_index(jd);
        let mut steps = 0;
        while self.new_moon_time(n) >= jd {
            n -= 1;
            steps += 1;
        }
        while self.new_moon_time(n + 1) < jd {
            n += 1;
            steps += 1;
        }
        trace!(n, steps, "found new moon before");
        self.new_moon_time(n)
    }

    /// Moment of the first new moon at or after `jd`.
    pub fn new_moon_at_or_after(&self, jd: f64) -> f64 {
        let mut n = self.estimate_new_moon_index(jd);
        let mut steps = 0;
        while self.new_moon_time(n - 1) >= jd {
            n -= 1;
            steps += 1;
        }
        while self.new_moon_time(n) < jd {
            n += 1;
            steps += 1;
        }
        trace!(n, steps, "found new moon at or after");
        self.new_moon_time(n)
    }
}
