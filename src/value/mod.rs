//! Value types that can be used as transition weights.
//!
//! All elimination code is generic over [`ValueOps`], which is implemented for:
//!
//!  - `f64`: floating point probabilities. [`ValueOps::simplify`] is a no-op.
//!  - [`BigRational`]: exact rational probabilities. Values are always stored in lowest terms.
//!  - [`RationalFunction`]: parametric weights, i.e. a fraction of two multivariate
//!    polynomials with rational coefficients. Here, [`ValueOps::simplify`] cancels the
//!    greatest common divisor of numerator and denominator, which keeps the expressions
//!    from growing exponentially during elimination.
//!
//! Arithmetic never simplifies implicitly for [`RationalFunction`]. The elimination procedure
//! calls [`ValueOps::simplify`] after every combination step.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use std::fmt::{Debug, Display};

mod polynomial;
mod rational_function;

#[cfg(test)]
mod tests;

pub use polynomial::{Monomial, Parameter, Polynomial};
pub use rational_function::{RationalFunction, ValueParseError};

/// The arithmetic capabilities required from a transition weight.
pub trait ValueOps: Clone + PartialEq + Debug + Display + 'static {
    fn zero() -> Self;
    fn one() -> Self;

    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;

    /// # Panics
    ///
    /// Division by (syntactic) zero is a correctness violation.
    fn div(&self, other: &Self) -> Self;

    /// Compute `1 / self`.
    fn invert(&self) -> Self {
        Self::one().div(self)
    }

    /// Compute `1 / (1 - self)`, i.e. the expected number of visits of a state with
    /// self-loop probability `self`.
    fn invert_complement(&self) -> Self {
        Self::one().sub(self).invert()
    }

    /// Bring the value into a canonical, reduced form. Must be idempotent.
    fn simplify(self) -> Self;

    fn is_zero(&self) -> bool;
    fn is_one(&self) -> bool;

    /// Parse a value from its textual form as used in explicit model files.
    fn parse_value(text: &str) -> Result<Self, ValueParseError>;

    /// Approximate this value as a floating point number, if it is a constant.
    fn to_f64(&self) -> Option<f64>;
}

impl ValueOps for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn div(&self, other: &Self) -> Self {
        assert!(*other != 0.0, "Correctness violation: Division by zero.");
        self / other
    }

    fn simplify(self) -> Self {
        self
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn is_one(&self) -> bool {
        *self == 1.0
    }

    fn parse_value(text: &str) -> Result<Self, ValueParseError> {
        let text = text.trim();
        if let Ok(value) = text.parse::<f64>() {
            return Ok(value);
        }
        BigRational::parse_value(text)
            .ok()
            .and_then(|it| ToPrimitive::to_f64(&it))
            .ok_or_else(|| ValueParseError::new(text, "not a floating point number"))
    }

    fn to_f64(&self) -> Option<f64> {
        Some(*self)
    }
}

impl ValueOps for BigRational {
    fn zero() -> Self {
        Zero::zero()
    }

    fn one() -> Self {
        One::one()
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn div(&self, other: &Self) -> Self {
        assert!(!Zero::is_zero(other), "Correctness violation: Division by zero.");
        self / other
    }

    fn simplify(self) -> Self {
        // `Ratio` keeps itself in lowest terms after every operation.
        self
    }

    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }

    fn is_one(&self) -> bool {
        One::is_one(self)
    }

    fn parse_value(text: &str) -> Result<Self, ValueParseError> {
        parse_rational(text)
    }

    fn to_f64(&self) -> Option<f64> {
        ToPrimitive::to_f64(self)
    }
}

impl ValueOps for RationalFunction {
    fn zero() -> Self {
        RationalFunction::zero()
    }

    fn one() -> Self {
        RationalFunction::one()
    }

    fn add(&self, other: &Self) -> Self {
        RationalFunction::add(self, other)
    }

    fn sub(&self, other: &Self) -> Self {
        RationalFunction::sub(self, other)
    }

    fn mul(&self, other: &Self) -> Self {
        RationalFunction::mul(self, other)
    }

    fn div(&self, other: &Self) -> Self {
        RationalFunction::div(self, other)
    }

    fn simplify(self) -> Self {
        RationalFunction::simplify(self)
    }

    fn is_zero(&self) -> bool {
        RationalFunction::is_zero(self)
    }

    fn is_one(&self) -> bool {
        RationalFunction::is_one(self)
    }

    fn parse_value(text: &str) -> Result<Self, ValueParseError> {
        text.parse()
    }

    fn to_f64(&self) -> Option<f64> {
        self.constant_value().and_then(|it| ToPrimitive::to_f64(&it))
    }
}

/// Parse an exact rational number written either as a fraction (`3/8`), an integer,
/// or a decimal number (`0.375`, `-1.5e-2`).
pub fn parse_rational(text: &str) -> Result<BigRational, ValueParseError> {
    let text = text.trim();
    if let Some((numerator, denominator)) = text.split_once('/') {
        let numerator = parse_rational(numerator)?;
        let denominator = parse_rational(denominator)?;
        if Zero::is_zero(&denominator) {
            return Err(ValueParseError::new(text, "zero denominator"));
        }
        return Ok(numerator / denominator);
    }

    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent
                .parse::<i32>()
                .map_err(|_| ValueParseError::new(text, "invalid exponent"))?;
            (mantissa, exponent)
        }
        None => (text, 0),
    };

    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };

    let (integral, fractional) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (integral.is_empty() && fractional.is_empty())
        || !integral.chars().chain(fractional.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(ValueParseError::new(text, "not a number"));
    }

    let digits = format!("{integral}{fractional}");
    let numerator: BigInt = digits
        .parse()
        .map_err(|_| ValueParseError::new(text, "not a number"))?;
    let scale = exponent - fractional.len() as i32;
    let ten = BigInt::from(10);
    let mut value = BigRational::from_integer(numerator);
    if scale >= 0 {
        value *= BigRational::from_integer(num_traits::pow(ten, scale as usize));
    } else {
        value /= BigRational::from_integer(num_traits::pow(ten, (-scale) as usize));
    }

    Ok(if negative { -value } else { value })
}

/// Compare two floating point values with an absolute tolerance.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance || (a.is_infinite() && b.is_infinite() && a.signum() == b.signum())
}
