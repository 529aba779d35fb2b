//! Exact rational numbers
//!
//! `Number` is an arbitrary-precision rational that is always fully reduced with a
//! positive denominator (`BigRational` guarantees this on construction). Each number
//! also remembers the form it was written in: decimal literals entered in approximate
//! mode stay decimal, so non-terminating quotients are rounded to the environment's
//! scale instead of growing without bound.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::{CalcError, Environment};

/// Digits kept by decimal rendering when no environment is at hand
pub const DEFAULT_SCALE: u32 = 12;

/// How a number is presented and whether its quotients are rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberForm {
    /// Exact `p/q` presentation
    #[default]
    Fraction,
    /// Decimal presentation, quotients rounded half-up to the configured scale
    Decimal,
}

impl NumberForm {
    /// Decimal is contagious: mixing forms yields a decimal
    fn combine(self, other: NumberForm) -> NumberForm {
        if self == NumberForm::Decimal || other == NumberForm::Decimal {
            NumberForm::Decimal
        } else {
            NumberForm::Fraction
        }
    }
}

/// Immutable exact rational value
#[derive(Debug, Clone)]
pub struct Number {
    value: BigRational,
    form: NumberForm,
}

// ===== Construction =====

impl Number {
    pub fn new(value: BigRational, form: NumberForm) -> Self {
        Number { value, form }
    }

    pub fn from_integer(n: i64) -> Self {
        Number {
            value: BigRational::from_integer(BigInt::from(n)),
            form: NumberForm::Fraction,
        }
    }

    /// Build `numer/denom`, reduced
    ///
    /// # Errors
    /// `DivisionByZero` when `denom` is zero.
    pub fn fraction(numer: i64, denom: i64) -> Result<Self, CalcError> {
        if denom == 0 {
            return Err(CalcError::DivisionByZero);
        }
        Ok(Number {
            value: BigRational::new(BigInt::from(numer), BigInt::from(denom)),
            form: NumberForm::Fraction,
        })
    }

    pub fn zero() -> Self {
        Number::from_integer(0)
    }

    pub fn one() -> Self {
        Number::from_integer(1)
    }

    pub fn minus_one() -> Self {
        Number::from_integer(-1)
    }

    /// Parse an unsigned decimal literal such as `12`, `0.25` or `.5`
    pub fn parse_decimal(text: &str, form: NumberForm) -> Option<Self> {
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }

        let numer: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
        let scale = u32::try_from(frac_part.len()).ok()?;
        let denom = BigInt::from(10u32).pow(scale);
        Some(Number {
            value: BigRational::new(numer, denom),
            form,
        })
    }

    /// Same value, presented as a decimal
    #[must_use]
    pub fn into_decimal(self) -> Self {
        Number {
            form: NumberForm::Decimal,
            ..self
        }
    }
}

// ===== Queries =====

impl Number {
    pub fn value(&self) -> &BigRational {
        &self.value
    }

    pub fn form(&self) -> NumberForm {
        self.form
    }

    pub fn numer(&self) -> &BigInt {
        self.value.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.value.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    pub fn is_minus_one(&self) -> bool {
        self.value.is_integer() && *self.value.numer() == BigInt::from(-1)
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.value.is_integer()
    }

    /// Integer value, when this is an integer that fits
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.value.numer().to_i64()
        } else {
            None
        }
    }

    /// Lossy conversion used by the floating-point fallback
    pub fn to_f64(&self) -> Option<f64> {
        let n = self.value.numer().to_f64()?;
        let d = self.value.denom().to_f64()?;
        Some(n / d)
    }

    /// True when the decimal expansion is finite (denominator is 2^a * 5^b)
    pub fn is_terminating(&self) -> bool {
        let mut d = self.value.denom().clone();
        let two = BigInt::from(2u32);
        let five = BigInt::from(5u32);
        while d.is_even() {
            d /= &two;
        }
        while (&d % &five).is_zero() {
            d /= &five;
        }
        d.is_one()
    }
}

// ===== Arithmetic =====

impl Number {
    #[must_use]
    pub fn add(&self, other: &Number) -> Number {
        Number {
            value: &self.value + &other.value,
            form: self.form.combine(other.form),
        }
    }

    #[must_use]
    pub fn sub(&self, other: &Number) -> Number {
        Number {
            value: &self.value - &other.value,
            form: self.form.combine(other.form),
        }
    }

    #[must_use]
    pub fn mul(&self, other: &Number) -> Number {
        Number {
            value: &self.value * &other.value,
            form: self.form.combine(other.form),
        }
    }

    #[must_use]
    pub fn negate(&self) -> Number {
        Number {
            value: -&self.value,
            form: self.form,
        }
    }

    #[must_use]
    pub fn abs(&self) -> Number {
        Number {
            value: self.value.abs(),
            form: self.form,
        }
    }

    /// Exact quotient, never rounded
    ///
    /// # Errors
    /// `DivisionByZero` when `other` is zero.
    pub fn div_exact(&self, other: &Number) -> Result<Number, CalcError> {
        if other.is_zero() {
            return Err(CalcError::DivisionByZero);
        }
        Ok(Number {
            value: &self.value / &other.value,
            form: self.form.combine(other.form),
        })
    }

    /// Quotient as the calculator presents it: decimals that do not terminate are
    /// rounded half-up to the environment's scale
    ///
    /// # Errors
    /// `DivisionByZero` when `other` is zero.
    pub fn div(&self, other: &Number, env: &Environment) -> Result<Number, CalcError> {
        let quotient = self.div_exact(other)?;
        if quotient.form == NumberForm::Decimal && !quotient.is_terminating() {
            Ok(quotient.round_to_scale(env.decimal_scale()))
        } else {
            Ok(quotient)
        }
    }

    /// # Errors
    /// `DivisionByZero` for zero.
    pub fn reciprocal(&self) -> Result<Number, CalcError> {
        Number::one().div_exact(self).map(|n| Number {
            form: self.form,
            ..n
        })
    }

    /// Round half-up (away from zero on ties) to `scale` fractional digits
    #[must_use]
    pub fn round_to_scale(&self, scale: u32) -> Number {
        Number {
            value: round_half_up(&self.value, scale),
            form: self.form,
        }
    }

    /// Raise to a rational power
    ///
    /// Integer exponents are exact. Rational exponents are exact when the root is
    /// (e.g. `4^(1/2)`); otherwise the power is evaluated in floating point and the
    /// result is a decimal rounded to the environment's scale.
    ///
    /// # Errors
    /// `DivisionByZero` for a negative power of zero, `UnsupportedOperation` when the
    /// exponent is out of range or the floating result is not finite.
    pub fn pow(&self, exponent: &Number, env: &Environment) -> Result<Number, CalcError> {
        if exponent.is_integer() {
            let e = exponent
                .numer()
                .to_i32()
                .ok_or_else(|| CalcError::unsupported(format!("exponent {} is too large", exponent)))?;
            if e < 0 && self.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            return Ok(Number {
                value: self.value.pow(e),
                form: self.form,
            });
        }

        if let Some(root) = self.exact_power(exponent) {
            return Ok(root);
        }

        let base = self.to_f64();
        let exp = exponent.to_f64();
        let result = match (base, exp) {
            (Some(b), Some(e)) => b.powf(e),
            _ => f64::NAN,
        };
        log::warn!(
            "falling back to floating point for {}^{} = {}",
            self,
            exponent,
            result
        );
        let value = BigRational::from_float(result).ok_or_else(|| {
            CalcError::unsupported(format!("{}^{} has no real value", self, exponent))
        })?;
        Ok(Number {
            value: round_half_up(&value, env.decimal_scale()),
            form: NumberForm::Decimal,
        })
    }

    /// `self^(p/q)` when both numerator and denominator have exact q-th roots
    fn exact_power(&self, exponent: &Number) -> Option<Number> {
        let q = exponent.denom().to_u32()?;
        let p = exponent.numer().to_i32()?;
        let negative = self.is_negative();
        if negative && q.is_even() {
            return None;
        }

        let exact_root = |n: &BigInt| {
            let magnitude = n.abs();
            let root = magnitude.nth_root(q);
            (root.pow(q) == magnitude).then_some(root)
        };
        let numer_root = exact_root(self.numer())?;
        let denom_root = exact_root(self.denom())?;
        let signed = if negative { -numer_root } else { numer_root };

        let root = BigRational::new(signed, denom_root);
        if p < 0 && root.is_zero() {
            return None;
        }
        Some(Number {
            value: root.pow(p),
            form: self.form.combine(exponent.form),
        })
    }

    /// Non-negative rational GCD: gcd of numerators over lcm of denominators
    #[must_use]
    pub fn gcd(&self, other: &Number) -> Number {
        let numer = self.numer().gcd(other.numer());
        let denom = self.denom().lcm(other.denom());
        Number {
            value: BigRational::new(numer, denom),
            form: self.form.combine(other.form),
        }
    }
}

fn round_half_up(value: &BigRational, scale: u32) -> BigRational {
    let factor = BigInt::from(10u32).pow(scale);
    let magnitude = value.numer().abs() * &factor;
    let denom = value.denom();
    let two = BigInt::from(2u32);
    let rounded = (magnitude * &two + denom) / (denom * &two);
    let signed = if value.is_negative() { -rounded } else { rounded };
    BigRational::new(signed, factor)
}

/// Decimal digits of a rational; non-terminating values are rounded to `scale`
pub(crate) fn decimal_string(value: &BigRational, scale: u32) -> String {
    let terminating = Number::new(value.clone(), NumberForm::Decimal).is_terminating();
    let value = if terminating {
        value.clone()
    } else {
        round_half_up(value, scale)
    };

    let mut digits_after_point = 0usize;
    let mut pow10 = BigInt::one();
    while !(&pow10 % value.denom()).is_zero() {
        pow10 *= 10u32;
        digits_after_point += 1;
    }
    let scaled = value.numer() * (&pow10 / value.denom());
    let sign = if scaled.is_negative() { "-" } else { "" };
    let digits = scaled.abs().to_string();

    if digits_after_point == 0 {
        return format!("{sign}{digits}");
    }
    let padded = format!("{:0>width$}", digits, width = digits_after_point + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - digits_after_point);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

// ===== Equality and ordering (by value only) =====

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::from_integer(n)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::OutputMode;

    fn frac(n: i64, d: i64) -> Number {
        Number::fraction(n, d).unwrap()
    }

    #[test]
    fn test_reduced_on_construction() {
        let n = frac(6, -8);
        assert_eq!(n.numer(), &BigInt::from(-3));
        assert_eq!(n.denom(), &BigInt::from(4));
        assert_eq!(frac(0, 5).denom(), &BigInt::from(1));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Number::fraction(1, 0), Err(CalcError::DivisionByZero));
        assert!(Number::one().div_exact(&Number::zero()).is_err());
    }

    #[test]
    fn test_add_uses_common_denominator() {
        assert_eq!(frac(1, 6).add(&frac(1, 4)), frac(5, 12));
        assert_eq!(frac(1, 2).sub(&frac(1, 2)), Number::zero());
    }

    #[test]
    fn test_parse_decimal() {
        let n = Number::parse_decimal("1.25", NumberForm::Fraction).unwrap();
        assert_eq!(n, frac(5, 4));
        assert_eq!(Number::parse_decimal(".5", NumberForm::Fraction).unwrap(), frac(1, 2));
        assert!(Number::parse_decimal("1.2.3", NumberForm::Fraction).is_none());
        assert!(Number::parse_decimal("12a", NumberForm::Fraction).is_none());
        assert!(Number::parse_decimal(".", NumberForm::Fraction).is_none());
    }

    #[test]
    fn test_decimal_division_rounds_half_up() {
        let env = Environment::new();
        let one = Number::one().into_decimal();
        let two = Number::from_integer(2).into_decimal();
        let three = Number::from_integer(3).into_decimal();
        let third = one.div(&three, &env).unwrap();
        assert_eq!(decimal_string(third.value(), 12), "0.333333333333");
        let two_thirds = two.div(&three, &env).unwrap();
        assert_eq!(decimal_string(two_thirds.value(), 12), "0.666666666667");
    }

    #[test]
    fn test_fraction_division_stays_exact() {
        let env = Environment::new().with_output_mode(OutputMode::Exact);
        let q = Number::one().div(&Number::from_integer(3), &env).unwrap();
        assert_eq!(q, frac(1, 3));
    }

    #[test]
    fn test_negative_rounding() {
        let n = frac(-2, 3).round_to_scale(2);
        assert_eq!(n, frac(-67, 100));
    }

    #[test]
    fn test_integer_pow() {
        let env = Environment::new();
        assert_eq!(frac(2, 3).pow(&Number::from_integer(2), &env).unwrap(), frac(4, 9));
        assert_eq!(frac(2, 3).pow(&Number::from_integer(-1), &env).unwrap(), frac(3, 2));
        assert!(Number::zero().pow(&Number::from_integer(-1), &env).is_err());
    }

    #[test]
    fn test_exact_root() {
        let env = Environment::new();
        let half = frac(1, 2);
        assert_eq!(Number::from_integer(4).pow(&half, &env).unwrap(), Number::from_integer(2));
        let two_thirds = frac(2, 3);
        assert_eq!(frac(8, 27).pow(&two_thirds, &env).unwrap(), frac(4, 9));
        assert_eq!(
            Number::from_integer(-8).pow(&frac(1, 3), &env).unwrap(),
            Number::from_integer(-2)
        );
    }

    #[test]
    fn test_float_fallback() {
        let env = Environment::new();
        let root = Number::from_integer(2).pow(&frac(1, 2), &env).unwrap();
        assert_eq!(root.form(), NumberForm::Decimal);
        assert!(decimal_string(root.value(), 12).starts_with("1.41421356237"));
        assert!(Number::from_integer(-2).pow(&frac(1, 2), &env).is_err());
    }

    #[test]
    fn test_rational_gcd() {
        assert_eq!(frac(1, 2).gcd(&frac(1, 3)), frac(1, 6));
        assert_eq!(Number::from_integer(4).gcd(&Number::from_integer(-6)), Number::from_integer(2));
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(decimal_string(frac(5, 4).value(), 12), "1.25");
        assert_eq!(decimal_string(frac(-1, 20).value(), 12), "-0.05");
        assert_eq!(decimal_string(Number::from_integer(40).value(), 12), "40");
    }
}
