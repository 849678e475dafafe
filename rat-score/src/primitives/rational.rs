//! Exact fraction, used for every time point and duration of the score.
//!
//! Rational wraps `Ratio<i64>`, always reduced, with positive denominator, so `0/1`
//! is the only zero and derived `Eq` and `Hash` agree with `Ord`.
//!
//! # Example
//!
//! ```
//! use rat_score::primitives::Rational;
//! let a = Rational::new(6, 8).unwrap();
//! assert_eq!(a, Rational::new(3, 4).unwrap());
//! assert_eq!(a.to_string(), "3/4");
//! assert_eq!(a + Rational::FOURTH, Rational::ONE);
//! assert_eq!(Rational::new(7, 2).unwrap().to_mixed_string(), "3 1/2");
//! ```

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use fraction::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Fraction, Ratio, Signed};
use serde::{Deserialize, Serialize};

use crate::errors::{RationalError, RationalResult};

/// Default relative error of [Rational::nearest], around 1/256.
pub const NEAREST_EPSILON: f64 = 0.0039;

/// `nearest` works only with values, whose parts fit into 32 bits.
const NEAREST_LIMIT: f64 = i32::MAX as f64;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rational(Ratio<i64>);

impl Rational {
    pub const ZERO: Self = Self::raw(0, 1);
    pub const ONE: Self = Self::raw(1, 1);
    pub const TWO: Self = Self::raw(2, 1);
    pub const HALF: Self = Self::raw(1, 2);
    pub const FOURTH: Self = Self::raw(1, 4);
    pub const EIGHTH: Self = Self::raw(1, 8);
    pub const SIXTEENTH: Self = Self::raw(1, 16);
    pub const THIRTY_SECOND: Self = Self::raw(1, 32);
    pub const SIXTY_FOURTH: Self = Self::raw(1, 64);
    pub const ONE_AND_HALF: Self = Self::raw(3, 2);

    /// Only for already reduced pairs.
    const fn raw(num: i64, den: i64) -> Self {
        Self(Ratio::new_raw(num, den))
    }

    /// Build reduced fraction.
    ///
    /// Fails with [RationalError::ZeroDenominator] on `x/0`.
    pub fn new(numerator: i64, denominator: i64) -> RationalResult<Self> {
        if denominator == 0 {
            return Err(RationalError::ZeroDenominator);
        }
        if numerator == i64::MIN || denominator == i64::MIN {
            return Err(RationalError::Overflow("reduce"));
        }
        Ok(Self(Ratio::new(numerator, denominator)))
    }

    pub const fn from_integer(integer: i64) -> Self {
        Self::raw(integer, 1)
    }

    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }
    pub fn is_zero(&self) -> bool {
        self.numerator() == 0
    }
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator() as f64 / self.denominator() as f64
    }

    /// Greatest integer not greater than self.
    pub fn floor(&self) -> i64 {
        self.0.floor().to_integer()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_neg(self) -> RationalResult<Self> {
        let num = self
            .numerator()
            .checked_neg()
            .ok_or(RationalError::Overflow("negate"))?;
        Ok(Self::raw(num, self.denominator()))
    }

    pub fn checked_add(self, rhs: Self) -> RationalResult<Self> {
        self.0
            .checked_add(&rhs.0)
            .map(Self)
            .ok_or(RationalError::Overflow("add"))
    }

    pub fn checked_sub(self, rhs: Self) -> RationalResult<Self> {
        self.0
            .checked_sub(&rhs.0)
            .map(Self)
            .ok_or(RationalError::Overflow("sub"))
    }

    pub fn checked_mul(self, rhs: Self) -> RationalResult<Self> {
        self.0
            .checked_mul(&rhs.0)
            .map(Self)
            .ok_or(RationalError::Overflow("mul"))
    }

    pub fn checked_div(self, rhs: Self) -> RationalResult<Self> {
        if rhs.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        self.0
            .checked_div(&rhs.0)
            .map(Self)
            .ok_or(RationalError::Overflow("div"))
    }

    pub fn reciprocal(&self) -> RationalResult<Self> {
        Self::ONE.checked_div(*self)
    }

    /// Self, brought into `[0, modulus)`.
    ///
    /// # Panics
    ///
    /// If modulus is not positive.
    ///
    /// # Example
    /// ```
    /// # use rat_score::primitives::Rational;
    /// let two = Rational::TWO;
    /// assert_eq!(two.modulo(Rational::ONE_AND_HALF), Rational::HALF);
    /// assert_eq!((-Rational::HALF).modulo(Rational::TWO), Rational::ONE_AND_HALF);
    /// ```
    pub fn modulo(self, modulus: Self) -> Self {
        assert!(
            modulus.is_positive(),
            "modulus should be positive, got: {}",
            modulus
        );
        let rem = Self(self.0 % modulus.0);
        match rem.is_negative() {
            true => rem + modulus,
            false => rem,
        }
    }

    /// (a.num + b.num) / (a.den + b.den)
    pub fn mediant(a: Self, b: Self) -> RationalResult<Self> {
        let overflow = || RationalError::Overflow("mediant");
        let num = a.numerator().checked_add(b.numerator()).ok_or_else(overflow)?;
        let den = a
            .denominator()
            .checked_add(b.denominator())
            .ok_or_else(overflow)?;
        Self::new(num, den)
    }

    /// Nearest fraction to the given float, found by continued
    /// fractions until relative error is below epsilon.
    ///
    /// Values, which magnitude is out of 32-bit range (too big or too
    /// small, but not zero), are [RationalError::Unrepresentable].
    ///
    /// # Example
    /// ```
    /// # use rat_score::primitives::{Rational, NEAREST_EPSILON};
    /// assert_eq!(Rational::nearest(0.5, NEAREST_EPSILON).unwrap(), Rational::HALF);
    /// assert_eq!(Rational::nearest(0.0, NEAREST_EPSILON).unwrap(), Rational::ZERO);
    /// assert!(Rational::nearest(1e10, NEAREST_EPSILON).is_err());
    /// ```
    pub fn nearest(x: f64, epsilon: f64) -> RationalResult<Self> {
        if x == 0.0 {
            return Ok(Self::ZERO);
        }
        if !x.is_finite()
            || x.abs() > NEAREST_LIMIT
            || x.abs() < 1.0 / NEAREST_LIMIT
        {
            return Err(RationalError::Unrepresentable(x.to_string()));
        }
        let sign = if x < 0.0 { -1 } else { 1 };
        let x = x.abs();
        let int_part = x.trunc() as i64;
        let mut z = x - int_part as f64;
        if z < 1.0 / NEAREST_LIMIT {
            return Self::new(sign * int_part, 1);
        }
        z = 1.0 / z;
        let mut a = z.trunc() as i64;
        z -= a as f64;
        let (mut prev_num, mut num) = (0_i64, 1_i64);
        let (mut prev_den, mut den) = (1_i64, a);
        let mut approx = (den * int_part + num) as f64 / den as f64;
        while ((x - approx) / x).abs() >= epsilon && z != 0.0 {
            z = 1.0 / z;
            a = z.trunc() as i64;
            z -= a as f64;
            if a as f64 * num as f64 + prev_num as f64 > NEAREST_LIMIT
                || a as f64 * den as f64 + prev_den as f64 > NEAREST_LIMIT
            {
                break;
            }
            (prev_num, num) = (num, a * num + prev_num);
            (prev_den, den) = (den, a * den + prev_den);
            approx = (den * int_part + num) as f64 / den as f64;
        }
        Self::new(sign * (den * int_part + num), den)
    }

    /// Like `1 1/2` or `-3/4`.
    pub fn to_mixed_string(&self) -> String {
        let whole = self.0.to_integer();
        let part = Self(self.0.fract().abs());
        match (whole, part.is_zero()) {
            (0, true) => "0".to_string(),
            (0, false) => self.to_string(),
            (w, true) => w.to_string(),
            (w, false) => format!("{} {}", w, part),
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Debug for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rational({})", self)
    }
}

impl FromStr for Rational {
    type Err = RationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| RationalError::Parse(s.to_string()))
        };
        match s.split_once('/') {
            None => Ok(Self::from_integer(parse(s)?)),
            Some((num, den)) => Self::new(parse(num)?, parse(den)?),
        }
    }
}
impl TryFrom<String> for Rational {
    type Error = RationalError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Rational> for String {
    fn from(value: Rational) -> Self {
        value.to_string()
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<Rational> for Fraction {
    fn from(value: Rational) -> Self {
        let num = value.numerator().unsigned_abs();
        let den = value.denominator().unsigned_abs();
        match value.is_negative() {
            true => Fraction::new_neg(num, den),
            false => Fraction::new(num, den),
        }
    }
}
impl TryFrom<Fraction> for Rational {
    type Error = RationalError;

    fn try_from(value: Fraction) -> Result<Self, Self::Error> {
        let not_finite = || RationalError::Unrepresentable(value.to_string());
        let num = *value.numer().ok_or_else(not_finite)?;
        let den = *value.denom().ok_or_else(not_finite)?;
        let num = i64::try_from(num)
            .map_err(|_| RationalError::Overflow("from fraction"))?;
        let den = i64::try_from(den)
            .map_err(|_| RationalError::Overflow("from fraction"))?;
        match value.is_sign_negative() && num != 0 {
            true => Self::new(-num, den),
            false => Self::new(num, den),
        }
    }
}

impl Add for Rational {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}
impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Sub for Rational {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}
impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl Mul for Rational {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}
impl Div for Rational {
    type Output = Self;
    /// # Panics
    ///
    /// On division by zero, as integers do.
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs).unwrap_or_else(|err| panic!("{err}"))
    }
}
impl Neg for Rational {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self.checked_neg().unwrap_or_else(|err| panic!("{err}"))
    }
}
impl Sum for Rational {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}
impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + *r)
    }
}
