use std::cmp::min;
use std::str::FromStr;

use num_traits::{Num, PrimInt};

use crate::error::Error;

/// Floored modulo and its "adjusted" variant. Unlike `%`, the result has the sign of the
/// modulus, so for a positive modulus it is never negative regardless of the sign of the
/// dividend.
pub trait Modulo: Sized {
    /// `x.modulo(0)` is 0. Otherwise the result lies in `[0, m)` for positive `m`.
    fn modulo(self, modulus: Self) -> Self;
    /// Like `modulo`, but returns `modulus` instead of 0, so the result lies in `(0, m]`.
    fn amod(self, modulus: Self) -> Self;
}

impl<T: Num + PartialOrd + Copy> Modulo for T {
    fn modulo(self, modulus: Self) -> Self {
        let zero = Self::zero();
        if modulus == zero {
            return zero;
        }
        let x = self % modulus;
        if (x < zero && modulus > zero) || (x > zero && modulus < zero) {
            x + modulus
        } else {
            x
        }
    }

    fn amod(self, modulus: Self) -> Self {
        let x = self.modulo(modulus);
        if x == Self::zero() {
            modulus
        } else {
            x
        }
    }
}

pub(crate) trait ClampedDivRem<Q: Ord>: Sized {
    type Quotient;
    fn clamped_div_rem(self, divisor: Self, max_quotient: Q) -> (Q, Self);
}

impl<T, Q> ClampedDivRem<Q> for T
where
    T: PrimInt + TryInto<Q>,
    Q: Ord + Into<T> + Copy,
{
    type Quotient = Q;
    // The quotient is capped so that the last period of a cycle, which is one day longer
    // than the others, absorbs the extra day instead of spilling into a period that
    // doesn't exist. Callers only pass non-negative dividends.
    fn clamped_div_rem(self, divisor: T, max_quotient: Self::Quotient) -> (Self::Quotient, Self) {
        let quotient = min(self / divisor, max_quotient.into());
        let remainder = self - quotient * divisor;
        // quotient <= max_quotient, and max_quotient came from Q.
        let quotient: Self::Quotient = match quotient.try_into() {
            Ok(x) => x,
            Err(_) => max_quotient,
        };
        (quotient, remainder)
    }
}

pub fn signum(n: f64) -> f64 {
    if n > 0.0 {
        1.0
    } else if n < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn log10(n: f64) -> f64 {
    n.log10()
}

/// How to round a value to an integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero.
    Down,
    Ceiling,
    Floor,
    /// Nearest, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest, ties towards zero.
    HalfDown,
    /// Nearest, ties to the even neighbour.
    HalfEven,
    /// Nearest, ties to the odd neighbour.
    HalfOdd,
}

impl RoundingMode {
    pub fn round(self, n: f64) -> f64 {
        match self {
            RoundingMode::Up => signum(n) * n.abs().ceil(),
            RoundingMode::Down => n.trunc(),
            RoundingMode::Ceiling => n.ceil(),
            RoundingMode::Floor => n.floor(),
            RoundingMode::HalfUp => {
                if n < 0.0 {
                    (n - 0.5).ceil()
                } else {
                    (n + 0.5).floor()
                }
            }
            RoundingMode::HalfDown => {
                if n < 0.0 {
                    (n + 0.5).floor()
                } else {
                    (n - 0.5).ceil()
                }
            }
            RoundingMode::HalfEven => round_tie(n, true),
            RoundingMode::HalfOdd => round_tie(n, false),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "halfup",
            RoundingMode::HalfDown => "halfdown",
            RoundingMode::HalfEven => "halfeven",
            RoundingMode::HalfOdd => "halfodd",
        }
    }
}

fn round_tie(n: f64, to_even: bool) -> f64 {
    let floor = n.floor();
    if n - floor == 0.5 {
        let floor_is_even = floor % 2.0 == 0.0;
        if floor_is_even == to_even {
            floor
        } else {
            floor + 1.0
        }
    } else {
        n.round()
    }
}

impl FromStr for RoundingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(RoundingMode::Up),
            "down" => Ok(RoundingMode::Down),
            "ceiling" => Ok(RoundingMode::Ceiling),
            "floor" => Ok(RoundingMode::Floor),
            "halfup" => Ok(RoundingMode::HalfUp),
            "halfdown" => Ok(RoundingMode::HalfDown),
            "halfeven" => Ok(RoundingMode::HalfEven),
            "halfodd" => Ok(RoundingMode::HalfOdd),
            _ => Err(Error::UnknownRoundingMode(s.to_string())),
        }
    }
}

/// Multiply `n` by `10^places`.
///
/// Works on the decimal representation, so `shift_decimal(1.005, 2)` is 100.5 and not
/// the 100.49999999999999 that `1.005 * 100.0` gives.
pub fn shift_decimal(n: f64, places: i32) -> f64 {
    if !n.is_finite() || n == 0.0 || places == 0 {
        return n;
    }
    let repr = format!("{:e}", n);
    let (mantissa, exponent) = match repr.split_once('e') {
        Some(parts) => parts,
        None => return n * 10f64.powi(places),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return n * 10f64.powi(places),
    };
    format!("{}e{}", mantissa, exponent + places)
        .parse()
        .unwrap_or(n * 10f64.powi(places))
}

/// Round `n` to `digits` significant digits.
pub fn significant(n: f64, digits: u32, mode: RoundingMode) -> f64 {
    if digits < 1 || n == 0.0 || !n.is_finite() {
        return n;
    }
    let factor = -(log10(n.abs()).floor() as i32) + digits as i32 - 1;
    shift_decimal(mode.round(shift_decimal(n, factor)), -factor)
}
