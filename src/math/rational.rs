//! Arbitrary-precision rational arithmetic and the 2D vector types built on
//! it.
//!
//! `Rat` wraps [`num_rational::BigRational`] rather than re-implementing
//! bignum arithmetic, the same "exact with `BigRational`, approximate
//! otherwise" tradeoff `rgeometry`'s kernel makes. Fast-path integer cross
//! products (the common case, operating directly on the `i32` edge
//! endpoints within an `i128` budget) live in [`crate::cag::integer_edge`];
//! by the time a value becomes a `Rat` it is already an exact intersection
//! coordinate and arithmetic no longer needs to be cheap, only correct.

use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

/// An arbitrary-precision signed rational. Invariant: the denominator is
/// always positive (enforced by `num_rational::BigRational`); `0/1` is the
/// unique representation of zero.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rat(BigRational);

impl Rat {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn from_integer(n: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self(BigRational::new(BigInt::from(numerator), BigInt::from(denominator)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn signum(&self) -> i32 {
        if self.0.is_zero() {
            0
        } else if self.0.is_positive() {
            1
        } else {
            -1
        }
    }

    pub fn to_f64(&self) -> f64 {
        // `BigRational` has no infallible `to_f64`; fall back to the ratio
        // of the (lossy) f64 conversions of numerator and denominator,
        // which is exact enough for rendering output.
        let numer: f64 = self.0.numer().to_string().parse().unwrap_or(0.0);
        let denom: f64 = self.0.denom().to_string().parse().unwrap_or(1.0);
        numer / denom
    }

    pub fn inner(&self) -> &BigRational {
        &self.0
    }
}

impl From<BigRational> for Rat {
    fn from(r: BigRational) -> Self {
        Self(r)
    }
}

impl Add for Rat {
    type Output = Rat;
    fn add(self, rhs: Rat) -> Rat {
        Rat(self.0 + rhs.0)
    }
}

impl Sub for Rat {
    type Output = Rat;
    fn sub(self, rhs: Rat) -> Rat {
        Rat(self.0 - rhs.0)
    }
}

impl Mul for Rat {
    type Output = Rat;
    fn mul(self, rhs: Rat) -> Rat {
        Rat(self.0 * rhs.0)
    }
}

impl Neg for Rat {
    type Output = Rat;
    fn neg(self) -> Rat {
        Rat(-self.0)
    }
}

impl Div for Rat {
    type Output = Rat;
    fn div(self, rhs: Rat) -> Rat {
        Rat(self.0 / rhs.0)
    }
}

/// A point in the exact rational plane.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RationalPoint {
    pub x: Rat,
    pub y: Rat,
}

impl RationalPoint {
    pub fn new(x: Rat, y: Rat) -> Self {
        Self { x, y }
    }

    pub fn to_f64(&self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }
}

/// A free vector in the exact rational plane (the difference of two
/// `RationalPoint`s).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RationalVector {
    pub x: Rat,
    pub y: Rat,
}

impl RationalVector {
    pub fn new(x: Rat, y: Rat) -> Self {
        Self { x, y }
    }

    pub fn between(from: &RationalPoint, to: &RationalPoint) -> Self {
        Self::new(to.x.clone() - from.x.clone(), to.y.clone() - from.y.clone())
    }

    /// Exact sign of the 2D cross product `self × other`. Positive means
    /// `other` is counter-clockwise from `self`; this is the primitive the
    /// CAG engine's angular vertex ordering and orientation tests build on.
    pub fn cross_sign(&self, other: &RationalVector) -> Ordering {
        let lhs = self.x.clone() * other.y.clone();
        let rhs = self.y.clone() * other.x.clone();
        (lhs - rhs).signum().cmp(&0)
    }

    /// Which of the four quadrants this vector falls in, used as the
    /// primary (atan2-free) key when sorting half-edges around a shared
    /// vertex; `cross_sign` breaks ties within a quadrant.
    pub fn direction_class(&self) -> u8 {
        let x_sign = self.x.signum();
        let y_sign = self.y.signum();
        match y_sign {
            1 => {
                if x_sign >= 0 {
                    0
                } else {
                    1
                }
            }
            -1 => {
                if x_sign <= 0 {
                    2
                } else {
                    3
                }
            }
            _ => {
                if x_sign < 0 {
                    2
                } else {
                    0
                }
            }
        }
    }
}

/// Compact `(i64 numerator, u64 denominator)` packing of a `Rat`, used when
/// exact rationals need to cross into a fixed-size buffer for a parallel
/// kernel. Lossy only when the reduced numerator/denominator do not fit in
/// the target widths, in which case `Err(())` is returned — callers needing
/// kernel transit are expected to keep values within the configured integer
/// snapping range, where this always succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Q128 {
    pub numerator: i64,
    pub denominator: u64,
}

impl TryFrom<&Rat> for Q128 {
    type Error = ();

    fn try_from(value: &Rat) -> Result<Self, Self::Error> {
        use num_traits::ToPrimitive;
        let numerator = value.0.numer().to_i64().ok_or(())?;
        let denominator = value.0.denom().to_u64().ok_or(())?;
        Ok(Q128 { numerator, denominator })
    }
}
