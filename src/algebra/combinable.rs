//! The evaluation-time value: a polynomial part plus a function part
//!
//! Either part may be absent, never both: the value zero is an explicit zero
//! polynomial. Every operation renormalizes through `Combinable::from_parts`.

use std::cmp::Ordering;

use super::cmp_options;
use crate::environment::FunctionDef;
use crate::{
    AppliedFunction, CalcError, Environment, FunctionExpression, Number, Polynomial, Symbol,
};

/// `polynomial + functions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinable {
    polynomial: Option<Polynomial>,
    functions: Option<FunctionExpression>,
}

impl Combinable {
    /// Normalize a pair of parts: zero parts are dropped, and nothing at all is zero
    pub fn from_parts(
        polynomial: Option<Polynomial>,
        functions: Option<FunctionExpression>,
    ) -> Self {
        let polynomial = polynomial.filter(|p| !p.is_zero());
        let functions = functions.filter(|f| !f.is_zero());
        match (polynomial, functions) {
            (None, None) => Combinable::zero(),
            (polynomial, functions) => Combinable {
                polynomial,
                functions,
            },
        }
    }

    pub fn zero() -> Self {
        Combinable::from(Polynomial::zero())
    }

    pub fn one() -> Self {
        Combinable::from(Polynomial::one())
    }

    pub fn number(n: Number) -> Self {
        Combinable::from(Polynomial::from_number(n))
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Combinable::from(Polynomial::from_monomial(symbol.into()))
    }

    /// `def(args...)`
    pub fn function(def: &FunctionDef, args: Vec<Combinable>) -> Self {
        Combinable {
            polynomial: None,
            functions: Some(FunctionExpression::single(AppliedFunction::new(def, args))),
        }
    }

    pub fn polynomial(&self) -> Option<&Polynomial> {
        self.polynomial.as_ref()
    }

    pub fn functions(&self) -> Option<&FunctionExpression> {
        self.functions.as_ref()
    }

    pub fn is_zero(&self) -> bool {
        self.functions.is_none() && self.polynomial.as_ref().is_none_or(Polynomial::is_zero)
    }

    pub fn is_one(&self) -> bool {
        self.functions.is_none() && self.polynomial.as_ref().is_some_and(Polynomial::is_one)
    }

    /// The plain number this value is, if it is one
    pub fn as_number(&self) -> Option<Number> {
        if self.functions.is_some() {
            return None;
        }
        self.polynomial.as_ref().and_then(Polynomial::as_number)
    }

    /// Structural total order: `Equal` exactly when the two values are equal
    pub fn total_cmp(&self, other: &Combinable) -> Ordering {
        cmp_options(
            self.polynomial.as_ref(),
            other.polynomial.as_ref(),
            Polynomial::total_cmp,
        )
        .then_with(|| {
            cmp_options(
                self.functions.as_ref(),
                other.functions.as_ref(),
                FunctionExpression::total_cmp,
            )
        })
    }

    // ===== Arithmetic =====

    #[must_use]
    pub fn negate(&self) -> Combinable {
        Combinable {
            polynomial: self.polynomial.as_ref().map(Polynomial::negate),
            functions: self.functions.as_ref().map(FunctionExpression::negate),
        }
    }

    /// # Errors
    /// `UnsupportedOperation` when the polynomial parts cannot be added.
    pub fn add(&self, other: &Combinable, env: &Environment) -> Result<Combinable, CalcError> {
        let polynomial = match (&self.polynomial, &other.polynomial) {
            (Some(a), Some(b)) => Some(a.add(b, env)?),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let functions = match (&self.functions, &other.functions) {
            (Some(a), Some(b)) => Some(a.add(b, env)?),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        Ok(Combinable::from_parts(polynomial, functions))
    }

    /// # Errors
    /// `UnsupportedOperation` when the polynomial parts cannot be added.
    pub fn subtract(&self, other: &Combinable, env: &Environment) -> Result<Combinable, CalcError> {
        self.add(&other.negate(), env)
    }

    /// Distributed product `(P1 + F1)(P2 + F2)`
    ///
    /// # Errors
    /// Propagates algebra failures.
    pub fn multiply(&self, other: &Combinable, env: &Environment) -> Result<Combinable, CalcError> {
        let polynomial = match (&self.polynomial, &other.polynomial) {
            (Some(a), Some(b)) => Some(a.multiply(b, env)?),
            _ => None,
        };
        let mut product = Combinable::from_parts(polynomial, None);

        if let (Some(p), Some(f)) = (&self.polynomial, &other.functions) {
            let scaled = Combinable::from_parts(None, Some(f.scale(p, env)?));
            product = product.add(&scaled, env)?;
        }
        if let (Some(f), Some(p)) = (&self.functions, &other.polynomial) {
            let scaled = Combinable::from_parts(None, Some(f.scale(p, env)?));
            product = product.add(&scaled, env)?;
        }
        if let (Some(a), Some(b)) = (&self.functions, &other.functions) {
            product = product.add(&a.multiply(b, env)?, env)?;
        }
        Ok(product)
    }

    /// Quotient by a polynomial or by a single function term
    ///
    /// # Errors
    /// `DivisionByZero` for zero, `UnsupportedOperation` for a divisor mixing
    /// polynomial and function parts or holding several function terms.
    pub fn divide(&self, other: &Combinable, env: &Environment) -> Result<Combinable, CalcError> {
        if other.is_zero() {
            return Err(CalcError::DivisionByZero);
        }
        match (&other.polynomial, &other.functions) {
            (Some(divisor), None) => {
                let polynomial = match &self.polynomial {
                    Some(p) => Some(p.divide(divisor, env)?),
                    None => None,
                };
                let functions = match &self.functions {
                    Some(f) => Some(f.divide_by_polynomial(divisor, env)?),
                    None => None,
                };
                Ok(Combinable::from_parts(polynomial, functions))
            }
            (None, Some(f)) => {
                let inverse = Combinable::from_parts(None, Some(f.reciprocal(env)?));
                self.multiply(&inverse, env)
            }
            _ => Err(CalcError::unsupported(format!(
                "cannot divide by {other}"
            ))),
        }
    }

    /// Raise to a power
    ///
    /// Polynomials take any exponent. Function parts take numeric exponents when they
    /// are a single term, and positive integer exponents otherwise.
    ///
    /// # Errors
    /// `UnsupportedOperation` for exponents the value model cannot hold.
    pub fn exponentiate(
        &self,
        exponent: &Combinable,
        env: &Environment,
    ) -> Result<Combinable, CalcError> {
        if exponent.is_zero() {
            return Ok(Combinable::one());
        }
        if exponent.is_one() {
            return Ok(self.clone());
        }

        let Some(functions) = &self.functions else {
            let base = self.polynomial.clone().unwrap_or_else(Polynomial::zero);
            return base.exponentiate(exponent, env).map(Combinable::from);
        };

        let Some(n) = exponent.as_number() else {
            return Err(CalcError::unsupported(format!(
                "cannot raise {self} to {exponent}"
            )));
        };
        if self.polynomial.is_none() && functions.terms().len() == 1 {
            return Ok(Combinable::from_parts(None, Some(functions.pow(&n, env)?)));
        }
        match n.to_i64() {
            Some(count) if n.is_integer() && count > 0 => self.power(count.unsigned_abs(), env),
            _ => Err(CalcError::unsupported(format!(
                "cannot raise {self} to {exponent}"
            ))),
        }
    }

    fn power(&self, n: u64, env: &Environment) -> Result<Combinable, CalcError> {
        let mut result = Combinable::one();
        let mut square = self.clone();
        let mut remaining = n;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.multiply(&square, env)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = square.multiply(&square, env)?;
            }
        }
        Ok(result)
    }
}

impl From<Polynomial> for Combinable {
    fn from(polynomial: Polynomial) -> Self {
        Combinable {
            polynomial: Some(polynomial),
            functions: None,
        }
    }
}

impl From<Number> for Combinable {
    fn from(n: Number) -> Self {
        Combinable::number(n)
    }
}

impl From<Symbol> for Combinable {
    fn from(symbol: Symbol) -> Self {
        Combinable::symbol(symbol)
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

    fn env() -> Environment {
        Environment::new().with_output_mode(OutputMode::Exact)
    }

    fn x() -> Combinable {
        Combinable::symbol(Symbol::variable("x"))
    }

    fn int(n: i64) -> Combinable {
        Combinable::number(Number::from_integer(n))
    }

    fn sin(arg: Combinable, env: &Environment) -> Combinable {
        Combinable::function(env.function("sin").unwrap(), vec![arg])
    }

    #[test]
    fn test_zero_is_explicit_polynomial() {
        let zero = Combinable::from_parts(None, None);
        assert!(zero.is_zero());
        assert!(zero.polynomial().is_some());
        assert_eq!(zero.as_number(), Some(Number::zero()));
    }

    #[test]
    fn test_one_has_unit_exponent() {
        let one = Combinable::one();
        assert!(one.is_one());
        let term = one.polynomial().unwrap().expanded();
        assert!(term.has_unit_exponent());
        assert!(term.exponent().is_one());
        assert_eq!(x().to_string(), "x");
    }

    #[test]
    fn test_add_keeps_parts_apart() {
        let env = env();
        let sum = x().add(&sin(x(), &env), &env).unwrap();
        assert!(sum.polynomial().is_some());
        assert!(sum.functions().is_some());
        let back = sum.subtract(&sin(x(), &env), &env).unwrap();
        assert_eq!(back, x());
    }

    #[test]
    fn test_multiply_distributes_over_parts() {
        let env = env();
        let sum = x().add(&sin(x(), &env), &env).unwrap();
        let doubled = sum.multiply(&int(2), &env).unwrap();
        assert_eq!(doubled.to_string(), "2x+2sin(x)");
    }

    #[test]
    fn test_divide_by_function() {
        let env = env();
        let s = sin(x(), &env);
        let q = x().multiply(&s, &env).unwrap().divide(&s, &env).unwrap();
        assert_eq!(q, x());
        assert_eq!(x().divide(&Combinable::zero(), &env), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_function_power() {
        let env = env();
        let s = sin(x(), &env);
        let cubed = s.exponentiate(&int(3), &env).unwrap();
        assert_eq!(cubed.to_string(), "sin(x)^3");
        let y = Combinable::symbol(Symbol::variable("y"));
        assert!(matches!(
            s.exponentiate(&y, &env),
            Err(CalcError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_mixed_square_expands() {
        let env = env();
        let sum = int(1).add(&sin(x(), &env), &env).unwrap();
        let squared = sum.exponentiate(&int(2), &env).unwrap();
        assert_eq!(squared.to_string(), "1+sin(x)^2+2sin(x)");
    }
}
