//! Polynomial terms: `(Σnumerator / Σdenominator)^exponent`
//!
//! Numerator and denominator are canonical sums of monomials: sorted by
//! `Monomial::canonical_cmp`, base-equal monomials merged, zero monomials pruned. An
//! empty numerator is zero; the denominator is never empty.
//!
//! Terms with exponent 1 are kept reduced: common polynomial factors of numerator and
//! denominator are cancelled through the Euclidean GCD, a constant denominator is
//! folded into the numerator's coefficients, and any other denominator is scaled so
//! its coefficients share no numeric factor and lead with a positive sign.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{cmp_options, cmp_slices};
use crate::{CalcError, Combinable, Environment, Monomial, Number, Polynomial};

// =============================================================================
// SUMS OF MONOMIALS
// =============================================================================

/// Insert one monomial into a canonical sum, merging it with a base-equal entry
fn sum_insert(sum: &mut Vec<Monomial>, monomial: Monomial) {
    if monomial.is_zero() {
        return;
    }
    match sum.binary_search_by(|entry| entry.canonical_cmp(&monomial)) {
        Ok(index) => match sum[index].try_add(&monomial) {
            Some(merged) if merged.is_zero() => {
                sum.remove(index);
            }
            Some(merged) => sum[index] = merged,
            None => sum.insert(index, monomial),
        },
        Err(index) => sum.insert(index, monomial),
    }
}

fn canonical_sum(monomials: impl IntoIterator<Item = Monomial>) -> Vec<Monomial> {
    let mut sum = Vec::new();
    for monomial in monomials {
        sum_insert(&mut sum, monomial);
    }
    sum
}

fn sum_add(a: &[Monomial], b: &[Monomial]) -> Vec<Monomial> {
    let mut sum = a.to_vec();
    for monomial in b {
        sum_insert(&mut sum, monomial.clone());
    }
    sum
}

fn sum_subtract(a: &[Monomial], b: &[Monomial]) -> Vec<Monomial> {
    let mut sum = a.to_vec();
    for monomial in b {
        sum_insert(&mut sum, monomial.negate());
    }
    sum
}

fn sum_scale(
    sum: &[Monomial],
    factor: &Monomial,
    env: &Environment,
) -> Result<Vec<Monomial>, CalcError> {
    let mut product = Vec::with_capacity(sum.len());
    for monomial in sum {
        sum_insert(&mut product, monomial.multiply(factor, env)?);
    }
    Ok(product)
}

/// Distribute: every monomial of `a` times every monomial of `b`
fn sum_multiply(
    a: &[Monomial],
    b: &[Monomial],
    env: &Environment,
) -> Result<Vec<Monomial>, CalcError> {
    let mut product = Vec::with_capacity(a.len() * b.len());
    for left in a {
        for right in b {
            sum_insert(&mut product, left.multiply(right, env)?);
        }
    }
    Ok(product)
}

fn sum_degree(sum: &[Monomial]) -> Number {
    sum.first().map_or_else(Number::zero, Monomial::degree)
}

fn sum_is_one(sum: &[Monomial]) -> bool {
    matches!(sum, [only] if only.is_one())
}

fn unit_sum() -> Vec<Monomial> {
    vec![Monomial::one()]
}

/// Non-negative GCD of all coefficients
fn numeric_content(sum: &[Monomial]) -> Number {
    sum.iter()
        .fold(Number::zero(), |acc, m| acc.gcd(m.coefficient()))
}

/// Greatest monomial dividing every entry of the sum
fn monomial_content(sum: &[Monomial]) -> Monomial {
    let mut entries = sum.iter();
    let Some(first) = entries.next() else {
        return Monomial::one();
    };
    let mut content = first.with_coefficient(Number::one());
    for monomial in entries {
        content = content.common_factor(monomial);
    }
    content
}

/// Normalize to monic form
///
/// A single monomial keeps its terms with coefficient 1. A longer sum is divided by
/// the GCD of its coefficients and negated if its leading coefficient is negative.
fn to_monic(sum: &[Monomial]) -> Vec<Monomial> {
    match sum {
        [] => Vec::new(),
        [only] => vec![only.with_coefficient(Number::one())],
        [lead, ..] => {
            let mut content = numeric_content(sum);
            if lead.coefficient().is_negative() {
                content = content.negate();
            }
            if content.is_one() || content.is_zero() {
                return sum.to_vec();
            }
            sum.iter()
                .map(|m| {
                    m.coefficient()
                        .div_exact(&content)
                        .map_or_else(|_| m.clone(), |c| m.with_coefficient(c))
                })
                .collect()
        }
    }
}

/// Outcome of a polynomial long division
///
/// When the step budget runs out the division gives up: `quotient` is zero,
/// `remainder` is the untouched dividend and `exhausted` is set, which is what sets
/// "gave up" apart from "not evenly divisible".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Division {
    pub quotient: PolynomialTerm,
    pub remainder: PolynomialTerm,
    pub exhausted: bool,
}

struct SumDivision {
    quotient: Vec<Monomial>,
    remainder: Vec<Monomial>,
    exhausted: bool,
}

/// Long division of canonical sums by leading terms
fn sum_divide_and_remainder(
    dividend: &[Monomial],
    divisor: &[Monomial],
    env: &Environment,
) -> Result<SumDivision, CalcError> {
    let Some(divisor_lead) = divisor.first() else {
        return Err(CalcError::DivisionByZero);
    };
    let divisor_degree = divisor_lead.degree();
    let cap = env.max_division_iterations();

    let mut quotient = Vec::new();
    let mut remainder = dividend.to_vec();
    let mut steps = 0usize;

    while let Some(lead) = remainder.first() {
        if lead.degree() < divisor_degree || !divisor_lead.divides(lead) {
            break;
        }
        if steps == cap {
            log::warn!("long division gave up after {cap} steps");
            return Ok(SumDivision {
                quotient: Vec::new(),
                remainder: dividend.to_vec(),
                exhausted: true,
            });
        }
        steps += 1;

        let partial = lead.divide_exact(divisor_lead, env)?;
        log::trace!("division step {steps}: partial quotient {partial}");
        remainder = sum_subtract(&remainder, &sum_scale(divisor, &partial, env)?);
        sum_insert(&mut quotient, partial);
    }

    Ok(SumDivision {
        quotient,
        remainder,
        exhausted: false,
    })
}

/// `a / g` when `g` divides `a` evenly within the step budget
fn exact_quotient(
    a: &[Monomial],
    g: &[Monomial],
    env: &Environment,
) -> Result<Option<Vec<Monomial>>, CalcError> {
    let division = sum_divide_and_remainder(a, g, env)?;
    Ok((!division.exhausted && division.remainder.is_empty()).then_some(division.quotient))
}

/// Monic GCD of two sums
///
/// The common monomial factor is pulled out first; the Euclidean algorithm runs on
/// what is left. A step that makes no progress (the leading term does not divide)
/// ends the search with 1.
fn sum_gcd(
    a: &[Monomial],
    b: &[Monomial],
    env: &Environment,
) -> Result<Vec<Monomial>, CalcError> {
    if a.is_empty() {
        return Ok(to_monic(b));
    }
    if b.is_empty() {
        return Ok(to_monic(a));
    }

    let content_a = monomial_content(a);
    let content_b = monomial_content(b);
    let common = content_a.common_factor(&content_b);
    let primitive_a = divide_each(a, &content_a, env)?;
    let primitive_b = divide_each(b, &content_b, env)?;

    let (mut x, mut y) = if sum_degree(&primitive_a) >= sum_degree(&primitive_b) {
        (primitive_a, primitive_b)
    } else {
        (primitive_b, primitive_a)
    };

    let mut euclid = unit_sum();
    for iteration in 0..env.max_division_iterations() {
        if y.is_empty() {
            euclid = x;
            break;
        }
        let division = sum_divide_and_remainder(&x, &y, env)?;
        log::trace!(
            "gcd iteration {iteration}: remainder has {} terms",
            division.remainder.len()
        );
        if division.exhausted || division.quotient.is_empty() {
            break;
        }
        x = y;
        y = division.remainder;
    }

    let g = sum_scale(&to_monic(&euclid), &common, env)?;
    Ok(to_monic(&g))
}

fn divide_each(
    sum: &[Monomial],
    divisor: &Monomial,
    env: &Environment,
) -> Result<Vec<Monomial>, CalcError> {
    if divisor.is_one() {
        return Ok(sum.to_vec());
    }
    let mut quotient = Vec::with_capacity(sum.len());
    for monomial in sum {
        sum_insert(&mut quotient, monomial.divide_exact(divisor, env)?);
    }
    Ok(quotient)
}

/// Cancel the GCD of numerator and denominator, then normalize the denominator
fn reduce(
    numerator: Vec<Monomial>,
    denominator: Vec<Monomial>,
    env: &Environment,
) -> Result<(Vec<Monomial>, Vec<Monomial>), CalcError> {
    if denominator.is_empty() {
        return Err(CalcError::DivisionByZero);
    }
    if numerator.is_empty() {
        return Ok((Vec::new(), unit_sum()));
    }
    if sum_is_one(&denominator) {
        return Ok((numerator, denominator));
    }

    let g = sum_gcd(&numerator, &denominator, env)?;
    let (numerator, denominator) = cancel(numerator, denominator, &g, env)?;
    normalize_denominator(numerator, denominator, env)
}

fn cancel(
    numerator: Vec<Monomial>,
    denominator: Vec<Monomial>,
    g: &[Monomial],
    env: &Environment,
) -> Result<(Vec<Monomial>, Vec<Monomial>), CalcError> {
    if g.is_empty() || sum_is_one(g) {
        return Ok((numerator, denominator));
    }
    match (
        exact_quotient(&numerator, g, env)?,
        exact_quotient(&denominator, g, env)?,
    ) {
        (Some(n), Some(d)) => Ok((n, d)),
        _ => Ok((numerator, denominator)),
    }
}

/// Fold a constant denominator into the numerator, or strip the denominator's
/// numeric content and sign
fn normalize_denominator(
    numerator: Vec<Monomial>,
    denominator: Vec<Monomial>,
    env: &Environment,
) -> Result<(Vec<Monomial>, Vec<Monomial>), CalcError> {
    let divisor = match denominator.as_slice() {
        [] => return Err(CalcError::DivisionByZero),
        [only] if only.is_constant() => only.coefficient().clone(),
        [lead, ..] => {
            let content = numeric_content(&denominator);
            if lead.coefficient().is_negative() {
                content.negate()
            } else {
                content
            }
        }
    };
    if divisor.is_one() {
        return Ok((numerator, denominator));
    }

    let mut new_numerator = Vec::with_capacity(numerator.len());
    for m in &numerator {
        sum_insert(
            &mut new_numerator,
            m.with_coefficient(m.coefficient().div(&divisor, env)?),
        );
    }
    let mut new_denominator = Vec::with_capacity(denominator.len());
    for m in &denominator {
        sum_insert(
            &mut new_denominator,
            m.with_coefficient(m.coefficient().div_exact(&divisor)?),
        );
    }
    Ok((new_numerator, new_denominator))
}

// =============================================================================
// POLYNOMIAL TERM
// =============================================================================

/// `(Σnumerator / Σdenominator)^exponent`, with `None` standing for exponent 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolynomialTerm {
    numerator: Vec<Monomial>,
    denominator: Vec<Monomial>,
    exponent: Option<Arc<Combinable>>,
}

impl PolynomialTerm {
    pub fn zero() -> Self {
        PolynomialTerm {
            numerator: Vec::new(),
            denominator: unit_sum(),
            exponent: None,
        }
    }

    pub fn one() -> Self {
        PolynomialTerm::from_monomial(Monomial::one())
    }

    pub fn from_monomial(monomial: Monomial) -> Self {
        PolynomialTerm::from_sum(vec![monomial])
    }

    pub fn from_number(n: Number) -> Self {
        PolynomialTerm::from_monomial(Monomial::constant(n))
    }

    /// Sum of monomials over 1
    pub fn from_sum(monomials: impl IntoIterator<Item = Monomial>) -> Self {
        PolynomialTerm {
            numerator: canonical_sum(monomials),
            denominator: unit_sum(),
            exponent: None,
        }
    }

    /// Reduced quotient of two sums
    ///
    /// # Errors
    /// `DivisionByZero` when the denominator sums to zero.
    pub fn fraction(
        numerator: impl IntoIterator<Item = Monomial>,
        denominator: impl IntoIterator<Item = Monomial>,
        env: &Environment,
    ) -> Result<Self, CalcError> {
        let (numerator, denominator) =
            reduce(canonical_sum(numerator), canonical_sum(denominator), env)?;
        Ok(PolynomialTerm {
            numerator,
            denominator,
            exponent: None,
        })
    }

    // ===== Accessors =====

    pub fn numerator(&self) -> &[Monomial] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[Monomial] {
        &self.denominator
    }

    pub fn exponent(&self) -> Cow<'_, Combinable> {
        match &self.exponent {
            Some(exponent) => Cow::Borrowed(exponent.as_ref()),
            None => Cow::Owned(Combinable::one()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_empty()
    }

    pub fn is_one(&self) -> bool {
        sum_is_one(&self.numerator) && sum_is_one(&self.denominator)
    }

    pub fn has_unit_exponent(&self) -> bool {
        self.exponent.is_none()
    }

    pub fn has_unit_denominator(&self) -> bool {
        sum_is_one(&self.denominator)
    }

    /// Number of monomials in the numerator
    pub fn count_terms(&self) -> usize {
        self.numerator.len()
    }

    /// Leading numerator degree minus leading denominator degree, times a numeric
    /// exponent
    pub fn degree(&self) -> Number {
        let base = sum_degree(&self.numerator).sub(&sum_degree(&self.denominator));
        match self.exponent.as_deref().and_then(Combinable::as_number) {
            Some(e) => base.mul(&e),
            None => base,
        }
    }

    /// The single monomial this term is, if it is one
    pub fn as_monomial(&self) -> Option<&Monomial> {
        match (self.numerator.as_slice(), self.has_unit_exponent()) {
            ([only], true) if self.has_unit_denominator() => Some(only),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        if !self.has_unit_exponent() || !self.has_unit_denominator() {
            return None;
        }
        match self.numerator.as_slice() {
            [] => Some(Number::zero()),
            [only] if only.is_constant() => Some(only.coefficient().clone()),
            _ => None,
        }
    }

    /// Structural total order over numerator, denominator and exponent
    pub fn total_cmp(&self, other: &PolynomialTerm) -> Ordering {
        cmp_slices(&self.numerator, &other.numerator, Monomial::total_cmp)
            .then_with(|| cmp_slices(&self.denominator, &other.denominator, Monomial::total_cmp))
            .then_with(|| {
                cmp_options(
                    self.exponent.as_deref(),
                    other.exponent.as_deref(),
                    Combinable::total_cmp,
                )
            })
    }

    /// Same numerator and denominator, regardless of exponent
    pub fn same_base(&self, other: &PolynomialTerm) -> bool {
        self.numerator == other.numerator && self.denominator == other.denominator
    }

    /// The same base raised to `exponent`
    #[must_use]
    pub fn with_exponent(&self, exponent: Combinable) -> PolynomialTerm {
        PolynomialTerm {
            numerator: self.numerator.clone(),
            denominator: self.denominator.clone(),
            exponent: (!exponent.is_one()).then(|| Arc::new(exponent)),
        }
    }

    /// The base with exponent 1
    #[must_use]
    pub fn base(&self) -> PolynomialTerm {
        PolynomialTerm {
            numerator: self.numerator.clone(),
            denominator: self.denominator.clone(),
            exponent: None,
        }
    }

    #[must_use]
    pub fn negate(&self) -> PolynomialTerm {
        PolynomialTerm {
            numerator: self.numerator.iter().map(Monomial::negate).collect(),
            denominator: self.denominator.clone(),
            exponent: self.exponent.clone(),
        }
    }

    fn require_unit_exponent(&self, operation: &str) -> Result<(), CalcError> {
        if self.has_unit_exponent() {
            Ok(())
        } else {
            Err(CalcError::unsupported(format!(
                "cannot {operation} ({self}) directly"
            )))
        }
    }

    // ===== Arithmetic =====

    /// Sum of two terms with exponent 1
    ///
    /// Equal denominators merge numerators monomial by monomial; otherwise both sides
    /// are brought over the product of the denominators and the result is reduced.
    ///
    /// # Errors
    /// `UnsupportedOperation` when either exponent is not 1.
    pub fn add(&self, other: &PolynomialTerm, env: &Environment) -> Result<PolynomialTerm, CalcError> {
        self.require_unit_exponent("add")?;
        other.require_unit_exponent("add")?;
        if self.is_zero() {
            return Ok(other.clone());
        }
        if other.is_zero() {
            return Ok(self.clone());
        }

        if self.denominator == other.denominator {
            let numerator = sum_add(&self.numerator, &other.numerator);
            if self.has_unit_denominator() {
                return Ok(PolynomialTerm::from_sum(numerator));
            }
            return PolynomialTerm::fraction(numerator, self.denominator.clone(), env);
        }

        let left = sum_multiply(&self.numerator, &other.denominator, env)?;
        let right = sum_multiply(&other.numerator, &self.denominator, env)?;
        let denominator = sum_multiply(&self.denominator, &other.denominator, env)?;
        PolynomialTerm::fraction(sum_add(&left, &right), denominator, env)
    }

    /// # Errors
    /// `UnsupportedOperation` when either exponent is not 1.
    pub fn subtract(
        &self,
        other: &PolynomialTerm,
        env: &Environment,
    ) -> Result<PolynomialTerm, CalcError> {
        self.add(&other.negate(), env)
    }

    /// Fully distributed product of two terms with exponent 1
    ///
    /// # Errors
    /// `UnsupportedOperation` when either exponent is not 1.
    pub fn multiply_expanded(
        &self,
        other: &PolynomialTerm,
        env: &Environment,
    ) -> Result<PolynomialTerm, CalcError> {
        self.require_unit_exponent("distribute")?;
        other.require_unit_exponent("distribute")?;
        if self.is_zero() || other.is_zero() {
            return Ok(PolynomialTerm::zero());
        }

        let numerator = sum_multiply(&self.numerator, &other.numerator, env)?;
        if self.has_unit_denominator() && other.has_unit_denominator() {
            return Ok(PolynomialTerm::from_sum(numerator));
        }
        let denominator = sum_multiply(&self.denominator, &other.denominator, env)?;
        PolynomialTerm::fraction(numerator, denominator, env)
    }

    /// Product; distributes when both exponents are 1, otherwise the result is an
    /// unexpanded `Polynomial`
    ///
    /// # Errors
    /// Propagates algebra failures.
    pub fn multiply(&self, other: &PolynomialTerm, env: &Environment) -> Result<Polynomial, CalcError> {
        if self.has_unit_exponent() && other.has_unit_exponent() {
            return self.multiply_expanded(other, env).map(Polynomial::from);
        }
        Polynomial::from_factor(self.clone(), env)?.multiply(&Polynomial::from_factor(other.clone(), env)?, env)
    }

    /// Quotient of two terms with exponent 1
    ///
    /// The GCD of the numerators and the GCD of the denominators are cancelled before
    /// cross-multiplying: `(n1/d1) / (n2/d2) = (n1*d2) / (d1*n2)`.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor, `UnsupportedOperation` when either
    /// exponent is not 1.
    pub fn divide_expanded(
        &self,
        other: &PolynomialTerm,
        env: &Environment,
    ) -> Result<PolynomialTerm, CalcError> {
        self.require_unit_exponent("divide")?;
        other.require_unit_exponent("divide")?;
        if other.is_zero() {
            return Err(CalcError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(PolynomialTerm::zero());
        }

        let numerator_gcd = sum_gcd(&self.numerator, &other.numerator, env)?;
        let (n1, n2) = cancel(
            self.numerator.clone(),
            other.numerator.clone(),
            &numerator_gcd,
            env,
        )?;
        let denominator_gcd = sum_gcd(&self.denominator, &other.denominator, env)?;
        let (d1, d2) = cancel(
            self.denominator.clone(),
            other.denominator.clone(),
            &denominator_gcd,
            env,
        )?;

        let numerator = sum_multiply(&n1, &d2, env)?;
        let denominator = sum_multiply(&d1, &n2, env)?;
        let (numerator, denominator) = normalize_denominator(numerator, denominator, env)?;
        Ok(PolynomialTerm {
            numerator,
            denominator,
            exponent: None,
        })
    }

    /// Quotient; non-unit exponents give `dividend * reciprocal` as an unexpanded
    /// `Polynomial`
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor.
    pub fn divide(&self, other: &PolynomialTerm, env: &Environment) -> Result<Polynomial, CalcError> {
        if self.has_unit_exponent() && other.has_unit_exponent() {
            return self.divide_expanded(other, env).map(Polynomial::from);
        }
        Polynomial::from_factor(self.clone(), env)?.divide(&Polynomial::from_factor(other.clone(), env)?, env)
    }

    /// `denominator / numerator` for a term with exponent 1
    ///
    /// # Errors
    /// `DivisionByZero` for zero.
    pub fn reciprocal(&self, env: &Environment) -> Result<PolynomialTerm, CalcError> {
        self.require_unit_exponent("invert")?;
        let (numerator, denominator) =
            normalize_denominator(self.denominator.clone(), self.numerator.clone(), env)?;
        Ok(PolynomialTerm {
            numerator,
            denominator,
            exponent: None,
        })
    }

    /// `self^n` by square-and-multiply over the bits of `n`
    ///
    /// # Errors
    /// `UnsupportedOperation` when the exponent of `self` is not 1.
    pub fn power(&self, n: u64, env: &Environment) -> Result<PolynomialTerm, CalcError> {
        if n == 0 {
            return Ok(PolynomialTerm::one());
        }
        self.require_unit_exponent("distribute")?;
        let mut result = PolynomialTerm::one();
        let mut square = self.clone();
        let mut remaining = n;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.multiply_expanded(&square, env)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = square.multiply_expanded(&square, env)?;
            }
        }
        log::trace!("({self})^{n} = {result}");
        Ok(result)
    }

    /// Long division of the numerators of two polynomial (unit exponent, unit
    /// denominator) terms
    ///
    /// # Errors
    /// `DivisionByZero` for a zero divisor, `UnsupportedOperation` for terms with a
    /// denominator or a non-unit exponent.
    pub fn divide_and_remainder(
        &self,
        divisor: &PolynomialTerm,
        env: &Environment,
    ) -> Result<Division, CalcError> {
        for term in [self, divisor] {
            term.require_unit_exponent("long-divide")?;
            if !term.has_unit_denominator() {
                return Err(CalcError::unsupported(format!(
                    "long division needs polynomials, found ({term})"
                )));
            }
        }
        let division = sum_divide_and_remainder(&self.numerator, &divisor.numerator, env)?;
        Ok(Division {
            quotient: PolynomialTerm::from_sum(division.quotient),
            remainder: PolynomialTerm::from_sum(division.remainder),
            exhausted: division.exhausted,
        })
    }

    /// Monic GCD of the numerators of two terms
    ///
    /// # Errors
    /// Propagates algebra failures.
    pub fn gcd(&self, other: &PolynomialTerm, env: &Environment) -> Result<PolynomialTerm, CalcError> {
        sum_gcd(&self.numerator, &other.numerator, env).map(PolynomialTerm::from_sum)
    }

    /// This term's numerator in monic form
    #[must_use]
    pub fn to_monic(&self) -> PolynomialTerm {
        PolynomialTerm::from_sum(to_monic(&self.numerator))
    }
}

impl From<Monomial> for PolynomialTerm {
    fn from(monomial: Monomial) -> Self {
        PolynomialTerm::from_monomial(monomial)
    }
}

impl From<Number> for PolynomialTerm {
    fn from(n: Number) -> Self {
        PolynomialTerm::from_number(n)
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

    fn x() -> Monomial {
        Monomial::symbol(Symbol::variable("x"))
    }

    fn c(n: i64) -> Monomial {
        Monomial::constant(Number::from_integer(n))
    }

    fn x_pow(n: i64, coefficient: i64) -> Monomial {
        let env = env();
        x().exponentiate(&Combinable::number(Number::from_integer(n)), &env)
            .unwrap()
            .scale(&Number::from_integer(coefficient))
    }

    /// x + k
    fn linear(k: i64) -> PolynomialTerm {
        PolynomialTerm::from_sum(vec![x(), c(k)])
    }

    #[test]
    fn test_canonical_sum_merges_and_prunes() {
        let t = PolynomialTerm::from_sum(vec![c(1), x(), x_pow(1, 2), c(-1)]);
        assert_eq!(t.count_terms(), 1);
        assert_eq!(t.to_string(), "3x");
        assert!(PolynomialTerm::from_sum(vec![x(), x().negate()]).is_zero());
    }

    #[test]
    fn test_distribute() {
        let env = env();
        let squared = linear(1).multiply_expanded(&linear(1), &env).unwrap();
        assert_eq!(squared.to_string(), "x^2+2x+1");
        let cubed = linear(1).power(3, &env).unwrap();
        assert_eq!(cubed.to_string(), "x^3+3x^2+3x+1");
    }

    #[test]
    fn test_binary_power_matches_repeated_product() {
        let env = env();
        let mut repeated = PolynomialTerm::one();
        for _ in 0..7 {
            repeated = repeated.multiply_expanded(&linear(-2), &env).unwrap();
        }
        assert_eq!(linear(-2).power(7, &env).unwrap(), repeated);
    }

    #[test]
    fn test_power_by_bits() {
        let env = env();
        let mut repeated = PolynomialTerm::one();
        for _ in 0..13 {
            repeated = repeated.multiply_expanded(&linear(1), &env).unwrap();
        }
        assert_eq!(linear(1).power(13, &env).unwrap(), repeated);
        assert!(linear(1).power(0, &env).unwrap().is_one());
    }

    #[test]
    fn test_with_unit_exponent_drops_it() {
        let t = linear(1).with_exponent(Combinable::one());
        assert!(t.has_unit_exponent());
        assert_eq!(t, linear(1));
        assert_eq!(t.degree(), Number::one());
    }

    #[test]
    fn test_long_division_exact() {
        let env = env();
        let dividend = linear(1).power(3, &env).unwrap();
        let division = dividend.divide_and_remainder(&linear(1), &env).unwrap();
        assert!(!division.exhausted);
        assert!(division.remainder.is_zero());
        assert_eq!(division.quotient.to_string(), "x^2+2x+1");
    }

    #[test]
    fn test_long_division_remainder() {
        let env = env();
        let dividend = PolynomialTerm::from_sum(vec![x_pow(2, 1), c(1)]);
        let division = dividend.divide_and_remainder(&linear(1), &env).unwrap();
        assert_eq!(division.quotient.to_string(), "x-1");
        assert_eq!(division.remainder.to_string(), "2");
    }

    #[test]
    fn test_long_division_cap_returns_dividend() {
        let env = env().with_max_division_iterations(2);
        let dividend = PolynomialTerm::from_sum(vec![x_pow(5, 1), c(1)]);
        let division = dividend.divide_and_remainder(&linear(1), &env).unwrap();
        assert!(division.exhausted);
        assert!(division.quotient.is_zero());
        assert_eq!(division.remainder, dividend);
    }

    #[test]
    fn test_gcd_is_monic() {
        let env = env();
        // 2x + 6 and x^2 + 8x + 15 share x + 3
        let a = PolynomialTerm::from_sum(vec![x_pow(1, 2), c(6)]);
        let b = PolynomialTerm::from_sum(vec![x_pow(2, 1), x_pow(1, 8), c(15)]);
        assert_eq!(a.gcd(&b, &env).unwrap().to_string(), "x+3");
        let negative = PolynomialTerm::from_sum(vec![x_pow(1, -4), c(-6)]);
        assert_eq!(negative.to_monic().to_string(), "2x+3");
    }

    #[test]
    fn test_gcd_of_monomials() {
        let env = env();
        let a = PolynomialTerm::from_monomial(x_pow(3, 4));
        let b = PolynomialTerm::from_monomial(x_pow(2, 6));
        assert_eq!(a.gcd(&b, &env).unwrap().to_string(), "x^2");
    }

    #[test]
    fn test_divide_cancels_common_factor() {
        let env = env();
        let cubed = linear(1).power(3, &env).unwrap();
        let q = cubed.divide_expanded(&linear(1), &env).unwrap();
        assert_eq!(q.to_string(), "x^2+2x+1");
    }

    #[test]
    fn test_divide_keeps_irreducible_denominator() {
        let env = env();
        let q = linear(5).divide_expanded(&linear(3), &env).unwrap();
        assert_eq!(q.to_string(), "(x+5)/(x+3)");
        let back = q.multiply_expanded(&linear(3), &env).unwrap();
        assert_eq!(back, linear(5));
    }

    #[test]
    fn test_constant_denominator_folded() {
        let env = env();
        let q = linear(5).divide_expanded(&PolynomialTerm::from_monomial(c(2)), &env).unwrap();
        assert!(q.has_unit_denominator());
        assert_eq!(q.to_string(), "1/2x+5/2");
    }

    #[test]
    fn test_add_different_denominators() {
        let env = env();
        let one = PolynomialTerm::one();
        let a = one.divide_expanded(&linear(1), &env).unwrap();
        let b = one.divide_expanded(&linear(-1), &env).unwrap();
        let sum = a.add(&b, &env).unwrap();
        assert_eq!(sum.to_string(), "2x/(x^2-1)");
    }

    #[test]
    fn test_add_rejects_non_unit_exponent() {
        let env = env();
        let half = Combinable::number(Number::fraction(1, 2).unwrap());
        let root = linear(1).with_exponent(half);
        assert!(matches!(
            root.add(&linear(1), &env),
            Err(CalcError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_divide_by_zero() {
        let env = env();
        assert_eq!(
            linear(1).divide_expanded(&PolynomialTerm::zero(), &env),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_degree() {
        let env = env();
        let cubed = linear(1).power(3, &env).unwrap();
        assert_eq!(cubed.degree(), Number::from_integer(3));
        let ratio = linear(1).divide_expanded(&cubed, &env).unwrap();
        assert_eq!(ratio.degree(), Number::from_integer(-2));
    }
}
