//! Polynomials: an expanded term times a product of unexpanded factors
//!
//! The expanded part always has exponent 1 and absorbs everything that can be
//! distributed. Factors whose exponent is not an integer (`(x+1)^(1/2)`,
//! `(x+1)^y`) stay in the unexpanded list, one entry per distinct base, sorted by
//! `PolynomialTerm::total_cmp` on the base.

use std::cmp::Ordering;

use super::cmp_slices;
use crate::{CalcError, Combinable, Environment, Monomial, Number, PolynomialTerm};

/// `expanded * Π unexpanded`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    expanded: PolynomialTerm,
    unexpanded: Vec<PolynomialTerm>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial::from(PolynomialTerm::zero())
    }

    pub fn one() -> Self {
        Polynomial::from(PolynomialTerm::one())
    }

    pub fn from_number(n: Number) -> Self {
        Polynomial::from(PolynomialTerm::from_number(n))
    }

    pub fn from_monomial(monomial: Monomial) -> Self {
        Polynomial::from(PolynomialTerm::from_monomial(monomial))
    }

    /// Polynomial holding a single factor with any exponent
    ///
    /// # Errors
    /// Propagates failures from expanding integer powers.
    pub fn from_factor(factor: PolynomialTerm, env: &Environment) -> Result<Self, CalcError> {
        let mut polynomial = Polynomial::one();
        polynomial.insert_factor(factor, env)?;
        Ok(polynomial)
    }

    pub fn expanded(&self) -> &PolynomialTerm {
        &self.expanded
    }

    pub fn unexpanded(&self) -> &[PolynomialTerm] {
        &self.unexpanded
    }

    pub fn is_zero(&self) -> bool {
        self.expanded.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.unexpanded.is_empty() && self.expanded.is_one()
    }

    /// Fully distributed: no unexpanded factors
    pub fn is_expanded(&self) -> bool {
        self.unexpanded.is_empty()
    }

    pub fn as_number(&self) -> Option<Number> {
        if self.is_expanded() {
            self.expanded.as_number()
        } else {
            None
        }
    }

    pub fn as_monomial(&self) -> Option<&Monomial> {
        if self.is_expanded() {
            self.expanded.as_monomial()
        } else {
            None
        }
    }

    pub fn degree(&self) -> Number {
        self.unexpanded
            .iter()
            .fold(self.expanded.degree(), |acc, f| acc.add(&f.degree()))
    }

    /// Monomials in the expanded numerator
    pub fn count_terms(&self) -> usize {
        self.expanded.count_terms()
    }

    pub fn total_cmp(&self, other: &Polynomial) -> Ordering {
        self.expanded
            .total_cmp(&other.expanded)
            .then_with(|| cmp_slices(&self.unexpanded, &other.unexpanded, PolynomialTerm::total_cmp))
    }

    // ===== Factor bookkeeping =====

    /// Multiply one factor in
    ///
    /// Exponent 0 contributes nothing. Integer exponents and single-monomial bases are
    /// expanded into the expanded part. A base already present adds exponents and is
    /// inserted again, which may make it expandable.
    fn insert_factor(&mut self, factor: PolynomialTerm, env: &Environment) -> Result<(), CalcError> {
        let exponent = factor.exponent().into_owned();
        if exponent.is_zero() {
            return Ok(());
        }
        if self.is_zero() {
            return Ok(());
        }

        let base = factor.base();
        if exponent.is_one() {
            self.expanded = self.expanded.multiply_expanded(&base, env)?;
            return Ok(());
        }
        if let Some(n) = exponent.as_number()
            && n.is_integer()
        {
            let power = integer_power(&base, &n, env)?;
            self.expanded = self.expanded.multiply_expanded(&power, env)?;
            return Ok(());
        }
        if let Some(monomial) = base.as_monomial() {
            let power = PolynomialTerm::from_monomial(monomial.exponentiate(&exponent, env)?);
            self.expanded = self.expanded.multiply_expanded(&power, env)?;
            return Ok(());
        }

        match self
            .unexpanded
            .binary_search_by(|entry| entry.base().total_cmp(&base))
        {
            Ok(index) => {
                let existing = self.unexpanded.remove(index);
                let combined = existing.exponent().add(&exponent, env)?;
                self.insert_factor(existing.with_exponent(combined), env)
            }
            Err(index) => {
                self.unexpanded.insert(index, factor);
                Ok(())
            }
        }
    }

    fn collapse_if_zero(mut self) -> Self {
        if self.is_zero() {
            self.unexpanded.clear();
        }
        self
    }

    // ===== Arithmetic =====

    #[must_use]
    pub fn negate(&self) -> Polynomial {
        Polynomial {
            expanded: self.expanded.negate(),
            unexpanded: self.unexpanded.clone(),
        }
    }

    /// Sum; only polynomials with identical unexpanded factors can be added
    ///
    /// # Errors
    /// `UnsupportedOperation` when the unexpanded factors differ.
    pub fn add(&self, other: &Polynomial, env: &Environment) -> Result<Polynomial, CalcError> {
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }
        if self.unexpanded != other.unexpanded {
            return Err(CalcError::unsupported(format!(
                "cannot add {self} and {other}"
            )));
        }
        let sum = Polynomial {
            expanded: self.expanded.add(&other.expanded, env)?,
            unexpanded: self.unexpanded.clone(),
        };
        Ok(sum.collapse_if_zero())
    }

    /// # Errors
    /// `UnsupportedOperation` when the unexpanded factors differ.
    pub fn subtract(&self, other: &Polynomial, env: &Environment) -> Result<Polynomial, CalcError> {
        self.add(&other.negate(), env)
    }

    /// # Errors
    /// Propagates algebra failures.
    pub fn multiply(&self, other: &Polynomial, env: &Environment) -> Result<Polynomial, CalcError> {
        if self.is_zero() || other.is_zero() {
            return Ok(Polynomial::zero());
        }
        let mut product = Polynomial {
            expanded: self.expanded.multiply_expanded(&other.expanded, env)?,
            unexpanded: self.unexpanded.clone(),
        };
        for factor in &other.unexpanded {
            product.insert_factor(factor.clone(), env)?;
        }
        Ok(product.collapse_if_zero())
    }

    /// Quotient: expanded parts are divided with common-factor cancellation, the
    /// divisor's unexpanded factors come in with negated exponents
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor.
    pub fn divide(&self, other: &Polynomial, env: &Environment) -> Result<Polynomial, CalcError> {
        if other.is_zero() {
            return Err(CalcError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Polynomial::zero());
        }
        let mut quotient = Polynomial {
            expanded: self.expanded.divide_expanded(&other.expanded, env)?,
            unexpanded: self.unexpanded.clone(),
        };
        for factor in &other.unexpanded {
            let negated = factor.exponent().negate();
            quotient.insert_factor(factor.with_exponent(negated), env)?;
        }
        Ok(quotient.collapse_if_zero())
    }

    /// # Errors
    /// `DivisionByZero` for zero.
    pub fn reciprocal(&self, env: &Environment) -> Result<Polynomial, CalcError> {
        Polynomial::one().divide(self, env)
    }

    /// Raise to a power
    ///
    /// A plain number raised to a number is a single numeric power. Integer exponents
    /// multiply out by binary exponentiation (negative ones invert first). Any other exponent is pushed onto the expanded part as a new factor and
    /// multiplied into each unexpanded factor's exponent.
    ///
    /// # Errors
    /// `DivisionByZero` for a negative power of zero, `UnsupportedOperation` for
    /// exponents too large to expand.
    pub fn exponentiate(
        &self,
        exponent: &Combinable,
        env: &Environment,
    ) -> Result<Polynomial, CalcError> {
        if exponent.is_zero() {
            return Ok(Polynomial::one());
        }
        if exponent.is_one() {
            return Ok(self.clone());
        }

        let numeric = exponent.as_number();
        if self.is_zero() {
            return match numeric {
                Some(n) if n.is_negative() => Err(CalcError::DivisionByZero),
                _ => Ok(Polynomial::zero()),
            };
        }

        if let Some(n) = numeric.as_ref()
            && let Some(base) = self.as_number()
        {
            return Ok(Polynomial::from_number(base.pow(n, env)?));
        }
        if let Some(n) = numeric.as_ref()
            && n.is_integer()
        {
            let (base, magnitude) = if n.is_negative() {
                (self.reciprocal(env)?, n.negate())
            } else {
                (self.clone(), n.clone())
            };
            return base.power(to_count(&magnitude)?, env);
        }

        let mut result = Polynomial::one();
        result.insert_factor(self.expanded.with_exponent(exponent.clone()), env)?;
        for factor in &self.unexpanded {
            let scaled = factor.exponent().multiply(exponent, env)?;
            result.insert_factor(factor.with_exponent(scaled), env)?;
        }
        Ok(result.collapse_if_zero())
    }

    fn power(&self, n: u64, env: &Environment) -> Result<Polynomial, CalcError> {
        let mut result = Polynomial::one();
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

fn to_count(n: &Number) -> Result<u64, CalcError> {
    n.to_i64()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| CalcError::unsupported(format!("exponent {n} is too large to expand")))
}

/// `base^n` for an integer `n`, distributed
fn integer_power(
    base: &PolynomialTerm,
    n: &Number,
    env: &Environment,
) -> Result<PolynomialTerm, CalcError> {
    if n.is_negative() {
        base.reciprocal(env)?.power(to_count(&n.negate())?, env)
    } else {
        base.power(to_count(n)?, env)
    }
}

impl From<PolynomialTerm> for Polynomial {
    /// Wraps a term; a term with a non-unit exponent becomes the single unexpanded
    /// factor
    fn from(term: PolynomialTerm) -> Self {
        if term.has_unit_exponent() {
            Polynomial {
                expanded: term,
                unexpanded: Vec::new(),
            }
        } else {
            Polynomial {
                expanded: PolynomialTerm::one(),
                unexpanded: vec![term],
            }
        }
    }
}

impl From<Number> for Polynomial {
    fn from(n: Number) -> Self {
        Polynomial::from_number(n)
    }
}

impl From<Monomial> for Polynomial {
    fn from(monomial: Monomial) -> Self {
        Polynomial::from_monomial(monomial)
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
    use crate::{OutputMode, Symbol};

    fn env() -> Environment {
        Environment::new().with_output_mode(OutputMode::Exact)
    }

    fn var(name: &str) -> Monomial {
        Monomial::symbol(Symbol::variable(name))
    }

    fn num(n: i64) -> Number {
        Number::from_integer(n)
    }

    fn x_plus(k: i64) -> Polynomial {
        Polynomial::from(PolynomialTerm::from_sum(vec![
            var("x"),
            Monomial::constant(num(k)),
        ]))
    }

    fn half() -> Combinable {
        Combinable::number(Number::fraction(1, 2).unwrap())
    }

    #[test]
    fn test_integer_power_expands() {
        let env = env();
        let cubed = x_plus(1)
            .exponentiate(&Combinable::number(num(3)), &env)
            .unwrap();
        assert!(cubed.is_expanded());
        assert_eq!(cubed.to_string(), "x^3+3x^2+3x+1");
        assert_eq!(cubed.degree(), num(3));
        assert_eq!(cubed.count_terms(), 4);
    }

    #[test]
    fn test_rational_power_stays_unexpanded() {
        let env = env();
        let root = x_plus(1).exponentiate(&half(), &env).unwrap();
        assert!(!root.is_expanded());
        assert_eq!(root.unexpanded().len(), 1);

        // exponents add when the same base is multiplied in again
        let squared = root.multiply(&root, &env).unwrap();
        assert!(squared.is_expanded());
        assert_eq!(squared, x_plus(1));
    }

    #[test]
    fn test_divide_cancels_unexpanded_factor() {
        let env = env();
        let root = x_plus(1).exponentiate(&half(), &env).unwrap();
        let product = root.multiply(&Polynomial::from(var("x")), &env).unwrap();
        let q = product.divide(&root, &env).unwrap();
        assert_eq!(q, Polynomial::from(var("x")));
    }

    #[test]
    fn test_negative_integer_power_inverts() {
        let env = env();
        let inverse = x_plus(1)
            .exponentiate(&Combinable::number(num(-2)), &env)
            .unwrap();
        assert_eq!(inverse.to_string(), "1/(x^2+2x+1)");
        let back = inverse.multiply(&x_plus(1), &env).unwrap();
        assert_eq!(back.to_string(), "1/(x+1)");
    }

    #[test]
    fn test_add_requires_matching_factors() {
        let env = env();
        let root = x_plus(1).exponentiate(&half(), &env).unwrap();
        let doubled = root.add(&root, &env).unwrap();
        assert_eq!(doubled.expanded().as_number(), Some(num(2)));
        assert!(matches!(
            root.add(&x_plus(1), &env),
            Err(CalcError::UnsupportedOperation(_))
        ));
        assert!(root.subtract(&root, &env).unwrap().is_zero());
    }

    #[test]
    fn test_symbolic_power_of_number() {
        let env = env();
        let y = Combinable::symbol(Symbol::variable("y"));
        let p = Polynomial::from_number(num(64)).exponentiate(&y, &env).unwrap();
        assert!(p.is_expanded());
        assert_eq!(p.to_string(), "64^y");
    }

    #[test]
    fn test_zero_absorbs_factors() {
        let env = env();
        let root = x_plus(1).exponentiate(&half(), &env).unwrap();
        let zero = root.multiply(&Polynomial::zero(), &env).unwrap();
        assert!(zero.is_zero());
        assert!(zero.is_expanded());
        assert_eq!(
            Polynomial::zero().exponentiate(&Combinable::number(num(-1)), &env),
            Err(CalcError::DivisionByZero)
        );
    }
}
