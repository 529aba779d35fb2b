//! Monomials: a coefficient times an ordered product of `base^exponent` terms
//!
//! Terms are kept sorted by `Base::canonical_cmp` with at most one term per base, so
//! two monomials are base-equal exactly when their term lists are equal.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::{Base, CalcError, Combinable, Environment, Number, Symbol};

// =============================================================================
// MONOMIAL TERM
// =============================================================================

/// `base^exponent` with a non-zero exponent
///
/// A unit exponent is stored as `None`, so building a bare symbol never has to build
/// the value one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonomialTerm {
    base: Base,
    exponent: Option<Arc<Combinable>>,
}

impl MonomialTerm {
    pub fn new(base: Base, exponent: Combinable) -> Self {
        MonomialTerm {
            base,
            exponent: (!exponent.is_one()).then(|| Arc::new(exponent)),
        }
    }

    /// `base^1`
    pub fn unit(base: Base) -> Self {
        MonomialTerm {
            base,
            exponent: None,
        }
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn exponent(&self) -> Cow<'_, Combinable> {
        match &self.exponent {
            Some(exponent) => Cow::Borrowed(exponent.as_ref()),
            None => Cow::Owned(Combinable::one()),
        }
    }

    pub fn has_unit_exponent(&self) -> bool {
        self.exponent.is_none()
    }

    /// The exponent as a plain number, if it is one
    pub fn numeric_exponent(&self) -> Option<Number> {
        match &self.exponent {
            Some(exponent) => exponent.as_number(),
            None => Some(Number::one()),
        }
    }

    /// Contribution to the monomial's degree: numeric exponents of variables only
    pub fn degree(&self) -> Number {
        if !self.base.is_variable() {
            return Number::zero();
        }
        self.numeric_exponent().unwrap_or_else(Number::zero)
    }

    /// Base order first, then larger numeric exponents first
    pub fn canonical_cmp(&self, other: &MonomialTerm) -> Ordering {
        self.base.canonical_cmp(&other.base).then_with(|| {
            match (self.numeric_exponent(), other.numeric_exponent()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => self.exponent().total_cmp(&other.exponent()),
            }
        })
    }

    fn with_exponent(&self, exponent: Combinable) -> MonomialTerm {
        MonomialTerm::new(self.base.clone(), exponent)
    }
}

// =============================================================================
// MONOMIAL
// =============================================================================

/// `coefficient * t1 * t2 * ...` in canonical term order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monomial {
    coefficient: Number,
    terms: Vec<MonomialTerm>,
}

impl Monomial {
    pub fn constant(coefficient: Number) -> Self {
        Monomial {
            coefficient,
            terms: Vec::new(),
        }
    }

    pub fn one() -> Self {
        Monomial::constant(Number::one())
    }

    pub fn zero() -> Self {
        Monomial::constant(Number::zero())
    }

    /// A bare variable or constant
    pub fn symbol(symbol: Symbol) -> Self {
        Monomial {
            coefficient: Number::one(),
            terms: vec![MonomialTerm::unit(Base::Symbol(symbol))],
        }
    }

    /// Canonical monomial from a coefficient and arbitrary terms
    ///
    /// # Errors
    /// Propagates failures from folding numeric powers or adding exponents.
    pub fn from_parts(
        coefficient: Number,
        terms: Vec<MonomialTerm>,
        env: &Environment,
    ) -> Result<Self, CalcError> {
        let mut monomial = Monomial::constant(coefficient);
        for term in terms {
            monomial = monomial.with_term(term, env)?;
        }
        Ok(monomial)
    }

    pub fn coefficient(&self) -> &Number {
        &self.coefficient
    }

    pub fn terms(&self) -> &[MonomialTerm] {
        &self.terms
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// No terms: just a coefficient
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.is_constant() && self.coefficient.is_one()
    }

    /// Sum of the numeric exponents of the variable terms
    pub fn degree(&self) -> Number {
        self.terms
            .iter()
            .fold(Number::zero(), |acc, term| acc.add(&term.degree()))
    }

    /// Same term list, so the two can be summed by adding coefficients
    pub fn is_base_equal(&self, other: &Monomial) -> bool {
        self.terms == other.terms
    }

    #[must_use]
    pub fn with_coefficient(&self, coefficient: Number) -> Monomial {
        if coefficient.is_zero() {
            return Monomial::zero();
        }
        Monomial {
            coefficient,
            terms: self.terms.clone(),
        }
    }

    #[must_use]
    pub fn negate(&self) -> Monomial {
        self.with_coefficient(self.coefficient.negate())
    }

    #[must_use]
    pub fn scale(&self, factor: &Number) -> Monomial {
        self.with_coefficient(self.coefficient.mul(factor))
    }

    /// Sum of two base-equal monomials; `None` when the bases differ
    pub fn try_add(&self, other: &Monomial) -> Option<Monomial> {
        if self.is_zero() {
            return Some(other.clone());
        }
        if other.is_zero() {
            return Some(self.clone());
        }
        self.is_base_equal(other)
            .then(|| self.with_coefficient(self.coefficient.add(&other.coefficient)))
    }

    /// Difference of two base-equal monomials; `None` when the bases differ
    pub fn try_subtract(&self, other: &Monomial) -> Option<Monomial> {
        self.try_add(&other.negate())
    }

    /// Product; terms sharing a base add their exponents
    ///
    /// # Errors
    /// Propagates failures from exponent arithmetic.
    pub fn multiply(&self, other: &Monomial, env: &Environment) -> Result<Monomial, CalcError> {
        let coefficient = self.coefficient.mul(&other.coefficient);
        if coefficient.is_zero() {
            return Ok(Monomial::zero());
        }
        let mut product = self.with_coefficient(coefficient);
        for term in &other.terms {
            product = product.with_term(term.clone(), env)?;
        }
        Ok(product)
    }

    /// Quotient: the divisor's exponents are negated and multiplied in
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor.
    pub fn divide(&self, other: &Monomial, env: &Environment) -> Result<Monomial, CalcError> {
        let coefficient = self.coefficient.div(&other.coefficient, env)?;
        self.divide_with_coefficient(other, coefficient, env)
    }

    /// Quotient with an unrounded coefficient, used by long division
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor.
    pub fn divide_exact(&self, other: &Monomial, env: &Environment) -> Result<Monomial, CalcError> {
        let coefficient = self.coefficient.div_exact(&other.coefficient)?;
        self.divide_with_coefficient(other, coefficient, env)
    }

    fn divide_with_coefficient(
        &self,
        other: &Monomial,
        coefficient: Number,
        env: &Environment,
    ) -> Result<Monomial, CalcError> {
        let mut quotient = self.with_coefficient(coefficient);
        for term in &other.terms {
            let negated = term.exponent().negate();
            quotient = quotient.with_term(term.with_exponent(negated), env)?;
        }
        Ok(quotient)
    }

    /// Raise to a power
    ///
    /// Every term's exponent is multiplied by `exponent`. A numeric exponent is folded
    /// into the coefficient; otherwise a non-unit coefficient becomes a numeric base
    /// term of its own (`(2x)^y = x^y*2^y`).
    ///
    /// # Errors
    /// Propagates failures from numeric powers and exponent arithmetic.
    pub fn exponentiate(
        &self,
        exponent: &Combinable,
        env: &Environment,
    ) -> Result<Monomial, CalcError> {
        if exponent.is_zero() {
            return Ok(Monomial::one());
        }
        if exponent.is_one() {
            return Ok(self.clone());
        }

        let (coefficient, coefficient_term) = match exponent.as_number() {
            Some(n) => (self.coefficient.pow(&n, env)?, None),
            None if self.is_zero() => return Ok(Monomial::zero()),
            None if self.coefficient.is_one() => (Number::one(), None),
            None => (
                Number::one(),
                Some(MonomialTerm::new(
                    Base::Number(self.coefficient.clone()),
                    exponent.clone(),
                )),
            ),
        };

        let mut result = Monomial::constant(coefficient);
        for term in &self.terms {
            let scaled = term.exponent().multiply(exponent, env)?;
            result = result.with_term(term.with_exponent(scaled), env)?;
        }
        if let Some(term) = coefficient_term {
            result = result.with_term(term, env)?;
        }
        Ok(result)
    }

    /// Whether `other / self` leaves no negative numeric exponent on any base
    pub fn divides(&self, other: &Monomial) -> bool {
        if self.is_zero() {
            return false;
        }
        self.terms.iter().all(|term| {
            other
                .terms
                .iter()
                .find(|candidate| candidate.base == term.base)
                .is_some_and(|candidate| {
                    match (candidate.numeric_exponent(), term.numeric_exponent()) {
                        (Some(have), Some(need)) => have >= need,
                        _ => candidate.exponent == term.exponent,
                    }
                })
        })
    }

    /// Greatest common monomial factor (coefficient 1): shared bases with the smaller
    /// positive exponent, or identical symbolic exponents
    pub fn common_factor(&self, other: &Monomial) -> Monomial {
        let terms = self
            .terms
            .iter()
            .filter_map(|term| {
                let candidate = other.terms.iter().find(|c| c.base == term.base)?;
                match (term.numeric_exponent(), candidate.numeric_exponent()) {
                    (Some(a), Some(b)) => {
                        let smaller = a.min(b);
                        (!smaller.is_negative() && !smaller.is_zero())
                            .then(|| term.with_exponent(Combinable::number(smaller)))
                    }
                    _ => (term.exponent == candidate.exponent).then(|| term.clone()),
                }
            })
            .collect();
        Monomial {
            coefficient: Number::one(),
            terms,
        }
    }

    /// Canonical order inside a sum: higher degree first, then by bases
    pub fn canonical_cmp(&self, other: &Monomial) -> Ordering {
        other
            .degree()
            .cmp(&self.degree())
            .then_with(|| self.compare_bases(other))
    }

    /// Canonical order, then coefficient: `Equal` exactly when the monomials are equal
    pub fn total_cmp(&self, other: &Monomial) -> Ordering {
        self.canonical_cmp(other)
            .then_with(|| self.coefficient.cmp(&other.coefficient))
    }

    /// Term-by-term base comparison; a monomial with more terms sorts first, so bare
    /// constants end up last
    pub fn compare_bases(&self, other: &Monomial) -> Ordering {
        for (a, b) in self.terms.iter().zip(other.terms.iter()) {
            let ordering = a.canonical_cmp(b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        other.terms.len().cmp(&self.terms.len())
    }

    /// Multiply one term in, keeping the list sorted and free of zero exponents
    fn with_term(mut self, term: MonomialTerm, env: &Environment) -> Result<Monomial, CalcError> {
        if self.is_zero() || term.exponent.as_deref().is_some_and(Combinable::is_zero) {
            return Ok(self);
        }
        if let Base::Number(base) = &term.base
            && let Some(power) = term.numeric_exponent()
        {
            self.coefficient = self.coefficient.mul(&base.pow(&power, env)?);
            if self.coefficient.is_zero() {
                return Ok(Monomial::zero());
            }
            return Ok(self);
        }

        match self
            .terms
            .binary_search_by(|entry| entry.base.canonical_cmp(&term.base))
        {
            Ok(index) => {
                let existing = self.terms.remove(index);
                let exponent = existing.exponent().add(&term.exponent(), env)?;
                self.with_term(existing.with_exponent(exponent), env)
            }
            Err(index) => {
                self.terms.insert(index, term);
                Ok(self)
            }
        }
    }
}

impl From<Number> for Monomial {
    fn from(n: Number) -> Self {
        Monomial::constant(n)
    }
}

impl From<Symbol> for Monomial {
    fn from(symbol: Symbol) -> Self {
        Monomial::symbol(symbol)
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

    fn var(name: &str) -> Monomial {
        Monomial::symbol(Symbol::variable(name))
    }

    fn num(n: i64) -> Number {
        Number::from_integer(n)
    }

    #[test]
    fn test_unit_exponent_is_normalized() {
        let base = Base::Symbol(Symbol::variable("x"));
        let explicit = MonomialTerm::new(base.clone(), Combinable::one());
        assert_eq!(explicit, MonomialTerm::unit(base));
        assert!(explicit.has_unit_exponent());
        assert_eq!(explicit.numeric_exponent(), Some(num(1)));
        assert_eq!(var("x").degree(), num(1));
    }

    #[test]
    fn test_multiply_merges_bases() {
        let env = Environment::new();
        let x = var("x");
        let product = x.multiply(&x, &env).unwrap().multiply(&x, &env).unwrap();
        assert_eq!(product.terms().len(), 1);
        assert_eq!(product.degree(), num(3));
        assert_eq!(product.to_string(), "x^3");
    }

    #[test]
    fn test_terms_sorted_by_name() {
        let env = Environment::new();
        let xs = var("x").multiply(&var("s"), &env).unwrap();
        assert_eq!(xs.to_string(), "sx");
        let sx = var("s").multiply(&var("x"), &env).unwrap();
        assert_eq!(xs, sx);
    }

    #[test]
    fn test_divide_negates_exponents() {
        let env = Environment::new();
        let x2 = var("x").exponentiate(&Combinable::number(num(2)), &env).unwrap();
        let q = x2.scale(&num(6)).divide(&var("x").scale(&num(3)), &env).unwrap();
        assert_eq!(q, var("x").scale(&num(2)));
        let one = var("x").divide(&var("x"), &env).unwrap();
        assert!(one.is_one());
    }

    #[test]
    fn test_try_add_requires_base_equality() {
        let x = var("x");
        let s = var("s");
        assert!(x.try_add(&s).is_none());
        let sum = x.try_add(&x.scale(&num(4))).unwrap();
        assert_eq!(sum.coefficient(), &num(5));
        assert!(x.try_subtract(&x).unwrap().is_zero());
    }

    #[test]
    fn test_exponentiate_numeric() {
        let env = Environment::new();
        let m = var("x").scale(&num(2));
        let cubed = m.exponentiate(&Combinable::number(num(3)), &env).unwrap();
        assert_eq!(cubed.coefficient(), &num(8));
        assert_eq!(cubed.degree(), num(3));
    }

    #[test]
    fn test_exponentiate_symbolic_moves_coefficient_to_base() {
        let env = Environment::new();
        let y = Combinable::symbol(Symbol::variable("y"));
        let m = var("x").scale(&num(2)).exponentiate(&y, &env).unwrap();
        assert!(m.coefficient().is_one());
        assert_eq!(m.terms().len(), 2);
        assert!(matches!(m.terms()[1].base(), Base::Number(_)));
    }

    #[test]
    fn test_divides() {
        let env = Environment::new();
        let x = var("x");
        let x2y = x
            .multiply(&x, &env)
            .unwrap()
            .multiply(&var("y"), &env)
            .unwrap();
        assert!(x.divides(&x2y));
        assert!(!x2y.divides(&x));
        assert!(Monomial::one().divides(&x));
    }

    #[test]
    fn test_common_factor() {
        let env = Environment::new();
        let x = var("x");
        let y = var("y");
        let x2y = x.multiply(&x, &env).unwrap().multiply(&y, &env).unwrap();
        let xy3 = x
            .multiply(&y, &env)
            .unwrap()
            .multiply(&y, &env)
            .unwrap()
            .multiply(&y, &env)
            .unwrap();
        let common = x2y.common_factor(&xy3);
        assert_eq!(common, x.multiply(&y, &env).unwrap());
    }

    #[test]
    fn test_canonical_order() {
        let env = Environment::new();
        let x2 = var("x").multiply(&var("x"), &env).unwrap();
        let x = var("x");
        let one = Monomial::one();
        assert_eq!(x2.canonical_cmp(&x), Ordering::Less);
        assert_eq!(x.canonical_cmp(&one), Ordering::Less);
        assert_eq!(var("s").canonical_cmp(&x), Ordering::Less);
        assert_eq!(x.canonical_cmp(&x.scale(&num(3))), Ordering::Equal);
    }

    #[test]
    fn test_constant_sorts_after_variables_in_product() {
        let env = Environment::new();
        let pi = Monomial::symbol(Symbol::constant("pi", "\\pi "));
        let m = pi.multiply(&var("x"), &env).unwrap();
        assert_eq!(m.to_string(), "xpi");
        assert_eq!(m.degree(), num(1));
    }
}
