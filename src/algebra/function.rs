//! Applied symbolic functions and their sums of products
//!
//! Functions never evaluate numerically: `sin(x)` stays `sin(x)` with its argument
//! carried along. A `FunctionExpression` is a sum of terms, each a polynomial
//! coefficient times a product of applied functions raised to numeric powers.

use std::cmp::Ordering;
use std::sync::Arc;

use super::cmp_slices;
use crate::environment::FunctionDef;
use crate::{CalcError, Combinable, Environment, Number, Polynomial};

/// A function applied to evaluated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFunction {
    name: Arc<str>,
    markup: Arc<str>,
    args: Vec<Combinable>,
}

impl AppliedFunction {
    pub fn new(def: &FunctionDef, args: Vec<Combinable>) -> Self {
        AppliedFunction {
            name: def.name.clone(),
            markup: def.markup.clone(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn args(&self) -> &[Combinable] {
        &self.args
    }

    /// By name, then argument by argument
    fn canonical_cmp(&self, other: &AppliedFunction) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| cmp_slices(&self.args, &other.args, Combinable::total_cmp))
    }
}

/// `function^exponent` with a non-zero exponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFactor {
    function: AppliedFunction,
    exponent: Number,
}

impl FunctionFactor {
    pub fn function(&self) -> &AppliedFunction {
        &self.function
    }

    pub fn exponent(&self) -> &Number {
        &self.exponent
    }
}

/// `coefficient * Π factors`, factors sorted and never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTerm {
    coefficient: Polynomial,
    factors: Vec<FunctionFactor>,
}

impl FunctionTerm {
    pub fn coefficient(&self) -> &Polynomial {
        &self.coefficient
    }

    pub fn factors(&self) -> &[FunctionFactor] {
        &self.factors
    }

    fn factors_cmp(&self, other: &FunctionTerm) -> Ordering {
        for (a, b) in self.factors.iter().zip(other.factors.iter()) {
            let ordering = a
                .function
                .canonical_cmp(&b.function)
                .then_with(|| b.exponent.cmp(&a.exponent));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        other.factors.len().cmp(&self.factors.len())
    }

    fn total_cmp(&self, other: &FunctionTerm) -> Ordering {
        self.factors_cmp(other)
            .then_with(|| self.coefficient.total_cmp(&other.coefficient))
    }
}

/// Multiply two sorted factor lists; exponents of the same function add and vanish at 0
fn merge_factors(a: &[FunctionFactor], b: &[FunctionFactor]) -> Vec<FunctionFactor> {
    let mut merged = a.to_vec();
    for factor in b {
        match merged.binary_search_by(|entry| entry.function.canonical_cmp(&factor.function)) {
            Ok(index) => {
                let exponent = merged[index].exponent.add(&factor.exponent);
                if exponent.is_zero() {
                    merged.remove(index);
                } else {
                    merged[index].exponent = exponent;
                }
            }
            Err(index) => merged.insert(index, factor.clone()),
        }
    }
    merged
}

/// Sum of function terms in canonical order; empty is zero
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionExpression {
    terms: Vec<FunctionTerm>,
}

impl FunctionExpression {
    /// `1 * function`
    pub fn single(function: AppliedFunction) -> Self {
        FunctionExpression {
            terms: vec![FunctionTerm {
                coefficient: Polynomial::one(),
                factors: vec![FunctionFactor {
                    function,
                    exponent: Number::one(),
                }],
            }],
        }
    }

    pub fn terms(&self) -> &[FunctionTerm] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn total_cmp(&self, other: &FunctionExpression) -> Ordering {
        cmp_slices(&self.terms, &other.terms, FunctionTerm::total_cmp)
    }

    /// Add one term, merging it with a term over the same factors
    fn insert_term(&mut self, term: FunctionTerm, env: &Environment) -> Result<(), CalcError> {
        if term.coefficient.is_zero() {
            return Ok(());
        }
        match self.terms.binary_search_by(|entry| entry.factors_cmp(&term)) {
            Ok(index) => {
                let coefficient = self.terms[index].coefficient.add(&term.coefficient, env)?;
                if coefficient.is_zero() {
                    self.terms.remove(index);
                } else {
                    self.terms[index].coefficient = coefficient;
                }
            }
            Err(index) => self.terms.insert(index, term),
        }
        Ok(())
    }

    /// # Errors
    /// `UnsupportedOperation` when like terms carry coefficients that cannot be added.
    pub fn add(&self, other: &FunctionExpression, env: &Environment) -> Result<Self, CalcError> {
        let mut sum = self.clone();
        for term in &other.terms {
            sum.insert_term(term.clone(), env)?;
        }
        Ok(sum)
    }

    #[must_use]
    pub fn negate(&self) -> FunctionExpression {
        FunctionExpression {
            terms: self
                .terms
                .iter()
                .map(|t| FunctionTerm {
                    coefficient: t.coefficient.negate(),
                    factors: t.factors.clone(),
                })
                .collect(),
        }
    }

    /// Multiply every coefficient by a polynomial
    ///
    /// # Errors
    /// Propagates polynomial failures.
    pub fn scale(&self, factor: &Polynomial, env: &Environment) -> Result<Self, CalcError> {
        self.map_coefficients(|c| c.multiply(factor, env))
    }

    /// # Errors
    /// `DivisionByZero` for a zero divisor.
    pub fn divide_by_polynomial(
        &self,
        divisor: &Polynomial,
        env: &Environment,
    ) -> Result<Self, CalcError> {
        self.map_coefficients(|c| c.divide(divisor, env))
    }

    fn map_coefficients(
        &self,
        mut f: impl FnMut(&Polynomial) -> Result<Polynomial, CalcError>,
    ) -> Result<Self, CalcError> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let coefficient = f(&term.coefficient)?;
            if !coefficient.is_zero() {
                terms.push(FunctionTerm {
                    coefficient,
                    factors: term.factors.clone(),
                });
            }
        }
        Ok(FunctionExpression { terms })
    }

    /// Distributed product
    ///
    /// Terms whose functions cancel completely (`sin(x) * sin(x)^-1`) leave their
    /// coefficient behind as a polynomial, so the result is a `Combinable`.
    ///
    /// # Errors
    /// Propagates coefficient failures.
    pub fn multiply(
        &self,
        other: &FunctionExpression,
        env: &Environment,
    ) -> Result<Combinable, CalcError> {
        let mut polynomial = Polynomial::zero();
        let mut functions = FunctionExpression::default();
        for left in &self.terms {
            for right in &other.terms {
                let coefficient = left.coefficient.multiply(&right.coefficient, env)?;
                let factors = merge_factors(&left.factors, &right.factors);
                if factors.is_empty() {
                    polynomial = polynomial.add(&coefficient, env)?;
                } else {
                    functions.insert_term(
                        FunctionTerm {
                            coefficient,
                            factors,
                        },
                        env,
                    )?;
                }
            }
        }
        Ok(Combinable::from_parts(Some(polynomial), Some(functions)))
    }

    fn single_term(&self, operation: &str) -> Result<&FunctionTerm, CalcError> {
        match self.terms.as_slice() {
            [only] => Ok(only),
            [] => Err(CalcError::DivisionByZero),
            _ => Err(CalcError::unsupported(format!("cannot {operation} {self}"))),
        }
    }

    /// Reciprocal of a single term; sums of functions have no representation
    ///
    /// # Errors
    /// `UnsupportedOperation` for more than one term, `DivisionByZero` for zero.
    pub fn reciprocal(&self, env: &Environment) -> Result<Self, CalcError> {
        self.pow(&Number::minus_one(), env)
    }

    /// Numeric power of a single term
    ///
    /// # Errors
    /// `UnsupportedOperation` for more than one term.
    pub fn pow(&self, exponent: &Number, env: &Environment) -> Result<Self, CalcError> {
        if exponent.is_one() {
            return Ok(self.clone());
        }
        let term = self.single_term("raise")?;
        let coefficient = term
            .coefficient
            .exponentiate(&Combinable::number(exponent.clone()), env)?;
        let factors = term
            .factors
            .iter()
            .map(|f| FunctionFactor {
                function: f.function.clone(),
                exponent: f.exponent.mul(exponent),
            })
            .collect();
        Ok(FunctionExpression {
            terms: vec![FunctionTerm {
                coefficient,
                factors,
            }],
        })
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
    use crate::{NumberForm, Symbol};

    fn sin(arg: Combinable, env: &Environment) -> FunctionExpression {
        let def = env.function("sin").unwrap();
        FunctionExpression::single(AppliedFunction::new(def, vec![arg]))
    }

    fn sin_of(name: &str, env: &Environment) -> FunctionExpression {
        sin(Combinable::symbol(Symbol::variable(name)), env)
    }

    fn decimal(text: &str) -> Combinable {
        Combinable::number(Number::parse_decimal(text, NumberForm::Decimal).unwrap())
    }

    #[test]
    fn test_like_terms_combine() {
        let env = Environment::new();
        let s = sin_of("x", &env);
        let doubled = s.add(&s, &env).unwrap();
        assert_eq!(doubled.terms().len(), 1);
        assert_eq!(doubled.to_string(), "2sin(x)");
        assert!(s.add(&s.negate(), &env).unwrap().is_zero());
    }

    #[test]
    fn test_different_arguments_stay_apart() {
        let env = Environment::new();
        let sum = sin_of("x", &env).add(&sin_of("y", &env), &env).unwrap();
        assert_eq!(sum.terms().len(), 2);
        assert_eq!(sum.to_string(), "sin(x)+sin(y)");
    }

    #[test]
    fn test_arguments_compare_by_value() {
        let env = Environment::new();
        let fraction = sin(Combinable::number(Number::fraction(1, 2).unwrap()), &env);
        let half = sin(decimal("0.5"), &env);
        assert_eq!(fraction.add(&half, &env).unwrap().terms().len(), 1);
        assert!(fraction.add(&half.negate(), &env).unwrap().is_zero());
    }

    #[test]
    fn test_arguments_differing_past_display_scale_stay_apart() {
        let env = Environment::new();
        let a = sin(decimal("0.1234567890123"), &env);
        let b = sin(decimal("0.1234567890124"), &env);
        assert_eq!(a.to_string(), b.to_string());
        let product = a.multiply(&b, &env).unwrap();
        let factors = product.functions().unwrap().terms()[0].factors();
        assert_eq!(factors.len(), 2);
        assert!(factors.iter().all(|f| f.exponent().is_one()));
        assert_eq!(a.add(&b, &env).unwrap().terms().len(), 2);
    }

    #[test]
    fn test_product_collects_exponents() {
        let env = Environment::new();
        let s = sin_of("x", &env);
        let squared = s.multiply(&s, &env).unwrap();
        assert!(squared.polynomial().is_none());
        assert_eq!(squared.to_string(), "sin(x)^2");
    }

    #[test]
    fn test_cancelled_functions_become_polynomial() {
        let env = Environment::new();
        let s = sin_of("x", &env);
        let one = s.multiply(&s.reciprocal(&env).unwrap(), &env).unwrap();
        assert!(one.is_one());
    }

    #[test]
    fn test_reciprocal_of_sum_unsupported() {
        let env = Environment::new();
        let sum = sin_of("x", &env).add(&sin_of("y", &env), &env).unwrap();
        assert!(matches!(
            sum.reciprocal(&env),
            Err(CalcError::UnsupportedOperation(_))
        ));
    }
}
