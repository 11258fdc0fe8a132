//! Numeric carriers for path probabilities and accumulated damage.
//!
//! The engine is written once against [`Weight`]. [`Exact`] keeps every value
//! as a reduced big-integer fraction; `f64` and `f32` trade exactness for
//! speed and accumulate rounding error in the order the engine sums branches.

use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;
use num_rational::{BigRational, ParseRatioError};
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub trait Weight: Clone + fmt::Debug + PartialOrd {
    fn zero() -> Self;

    fn one() -> Self;

    /// `numer / denom`; `denom` must be positive.
    fn from_ratio(numer: u32, denom: u32) -> Self;

    fn from_damage(damage: u32) -> Self;

    fn accumulate(&mut self, other: Self);

    fn mul(&self, other: &Self) -> Self;

    /// `1 - self`.
    fn complement(&self) -> Self;

    fn is_zero(&self) -> bool;

    fn to_f64(&self) -> f64;
}

/// Arbitrary-precision rational, always in lowest terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Exact(BigRational);

impl Exact {
    pub fn new(numer: u64, denom: u64) -> Self {
        assert!(denom > 0, "rational denominator must be positive");
        Self(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }
}

impl Weight for Exact {
    fn zero() -> Self {
        Self(BigRational::zero())
    }

    fn one() -> Self {
        Self(BigRational::one())
    }

    fn from_ratio(numer: u32, denom: u32) -> Self {
        Self::new(u64::from(numer), u64::from(denom))
    }

    fn from_damage(damage: u32) -> Self {
        Self(BigRational::from_integer(BigInt::from(damage)))
    }

    fn accumulate(&mut self, other: Self) {
        self.0 += other.0;
    }

    fn mul(&self, other: &Self) -> Self {
        Self(&self.0 * &other.0)
    }

    fn complement(&self) -> Self {
        Self(&BigRational::one() - &self.0)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

/// Renders `n/d`, or just `n` for integers.
impl fmt::Display for Exact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Exact {
    type Err = ParseRatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigRational::from_str(s.trim()).map(Self)
    }
}

impl Serialize for Exact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Exact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

macro_rules! float_weight {
    ($float:ty) => {
        impl Weight for $float {
            fn zero() -> Self {
                0.0
            }

            fn one() -> Self {
                1.0
            }

            fn from_ratio(numer: u32, denom: u32) -> Self {
                numer as $float / denom as $float
            }

            fn from_damage(damage: u32) -> Self {
                damage as $float
            }

            fn accumulate(&mut self, other: Self) {
                *self += other;
            }

            fn mul(&self, other: &Self) -> Self {
                *self * *other
            }

            fn complement(&self) -> Self {
                1.0 - *self
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }

            fn to_f64(&self) -> f64 {
                f64::from(*self)
            }
        }
    };
}

float_weight!(f64);
float_weight!(f32);
