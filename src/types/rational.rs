use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An exact fraction.
///
/// Used wherever floating rounding is unacceptable, most prominently GPS
/// coordinates stored as degree/minute/second triples. The fraction is kept
/// exactly as stored — `Rational::new(4, 1)` stays `4/1` — but equality is
/// value-based, so `2/4 == 1/2`.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

#[derive(Debug, Error)]
pub enum RationalParseError {
    #[error("not a rational: {0:?}")]
    Invalid(String),
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Rational { num, den }
    }

    /// Reduce to lowest terms with a non-negative denominator.
    pub fn reduced(self) -> Self {
        if self.den == 0 {
            return self;
        }
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs()) as i64;
        let sign = if self.den < 0 { -1 } else { 1 };
        Rational {
            num: sign * self.num / g,
            den: sign * self.den / g,
        }
    }

    /// Lossy conversion for display and sorting purposes only.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        // Cross-multiplied in i128 so i64 extremes cannot overflow.
        (self.num as i128) * (other.den as i128) == (other.num as i128) * (self.den as i128)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = RationalParseError;

    /// Accepts `"n/d"` and bare integers (`"62"` parses as `62/1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| RationalParseError::Invalid(s.to_string()))
        };
        match s.split_once('/') {
            Some((n, d)) => Ok(Rational::new(parse(n)?, parse(d)?)),
            None => Ok(Rational::new(parse(s)?, 1)),
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::new(n, 1)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.max(1)
}
