//! Display implementations for calculator values.
//!
//! Two output formats share one set of formatting functions:
//!
//! ## Standard Display (`to_string()` / `{}`)
//! Plain calculator notation that the lexer reads back:
//! - `x^3+3x^2+3x+1`
//! - `(x+5)/(x+3)`
//! - `2sin(x)+64^y`
//!
//! ## LaTeX Format (`to_markup()`)
//! For the typeset output display:
//! - `x^{3}+3x^{2}+3x+1`
//! - `\frac{x+5}{x+3}`
//! - `2\sin\left(x\right)`
//!
//! Products are juxtaposed; an explicit `*` (or `\cdot`) appears only before a factor
//! that starts with a digit, where juxtaposition would read as one number.

use std::fmt;

use crate::number::{DEFAULT_SCALE, decimal_string};
use crate::{
    AppliedFunction, Base, Combinable, FunctionExpression, FunctionFactor, FunctionTerm,
    Monomial, MonomialTerm, Number, NumberForm, Polynomial, PolynomialTerm, Symbol,
};

// =============================================================================
// HELPER TYPES & FUNCTIONS
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum FormatMode {
    Standard,
    Latex,
}

/// Formatting in a chosen mode, shared by `Display` and `to_markup`
trait Render {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result;
}

struct Formatted<'a, T: ?Sized> {
    value: &'a T,
    mode: FormatMode,
}

impl<T: Render + ?Sized> fmt::Display for Formatted<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.render(f, self.mode)
    }
}

fn rendered<T: Render + ?Sized>(value: &T, mode: FormatMode) -> String {
    Formatted { value, mode }.to_string()
}

fn wrap_parens(inner: &str, mode: FormatMode) -> String {
    match mode {
        FormatMode::Standard => format!("({inner})"),
        FormatMode::Latex => format!("\\left({inner}\\right)"),
    }
}

/// Join summands with `+`, letting a leading `-` stand in for the sign
fn join_sum(parts: impl IntoIterator<Item = String>) -> String {
    let mut out = String::new();
    for part in parts {
        if !out.is_empty() && !part.starts_with('-') {
            out.push('+');
        }
        out.push_str(&part);
    }
    out
}

/// Append a factor to a product, with an explicit operator where juxtaposition would
/// merge two numbers
fn push_factor(out: &mut String, factor: &str, mode: FormatMode) {
    let needs_operator = out
        .chars()
        .last()
        .is_some_and(|last| last != '-' && last != '(')
        && factor.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if needs_operator {
        out.push_str(match mode {
            FormatMode::Standard => "*",
            FormatMode::Latex => "\\cdot ",
        });
    }
    out.push_str(factor);
}

/// `^e`, parenthesized unless the exponent is a non-negative integer or decimal or a
/// bare symbol; LaTeX braces make the parentheses unnecessary
fn format_exponent(exponent: &Combinable, mode: FormatMode) -> String {
    let text = rendered(exponent, mode);
    match mode {
        FormatMode::Latex => format!("^{{{text}}}"),
        FormatMode::Standard if is_simple_exponent(exponent) => format!("^{text}"),
        FormatMode::Standard => format!("^({text})"),
    }
}

fn is_simple_exponent(exponent: &Combinable) -> bool {
    if let Some(n) = exponent.as_number() {
        return !n.is_negative() && (n.is_integer() || n.form() == NumberForm::Decimal);
    }
    exponent
        .polynomial()
        .filter(|_| exponent.functions().is_none())
        .and_then(Polynomial::as_monomial)
        .is_some_and(|m| {
            m.coefficient().is_one()
                && matches!(m.terms(), [t] if t.has_unit_exponent() && matches!(t.base(), Base::Symbol(_)))
        })
}

fn format_number_exponent(exponent: &Number, mode: FormatMode) -> String {
    let text = rendered(exponent, mode);
    match mode {
        FormatMode::Latex => format!("^{{{text}}}"),
        FormatMode::Standard if !exponent.is_negative() && exponent.is_integer() => {
            format!("^{text}")
        }
        FormatMode::Standard => format!("^({text})"),
    }
}

// =============================================================================
// NUMBERS AND SYMBOLS
// =============================================================================

impl Render for Number {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        if self.form() == NumberForm::Decimal {
            return write!(f, "{}", decimal_string(self.value(), DEFAULT_SCALE));
        }
        if self.is_integer() {
            return write!(f, "{}", self.numer());
        }
        match mode {
            FormatMode::Standard => write!(f, "{}/{}", self.numer(), self.denom()),
            FormatMode::Latex => {
                let sign = if self.is_negative() { "-" } else { "" };
                write!(
                    f,
                    "{sign}\\frac{{{}}}{{{}}}",
                    self.abs().numer(),
                    self.denom()
                )
            }
        }
    }
}

impl Render for Symbol {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        match (self, mode) {
            (Symbol::Constant { markup, .. }, FormatMode::Latex) => write!(f, "{markup}"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl Render for Base {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        match self {
            Base::Symbol(symbol) => symbol.render(f, mode),
            Base::Number(n) if n.is_negative() || !n.is_integer() => {
                write!(f, "{}", wrap_parens(&rendered(n, mode), mode))
            }
            Base::Number(n) => n.render(f, mode),
        }
    }
}

// =============================================================================
// MONOMIALS
// =============================================================================

impl Render for MonomialTerm {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        self.base().render(f, mode)?;
        if self.has_unit_exponent() {
            return Ok(());
        }
        write!(f, "{}", format_exponent(&self.exponent(), mode))
    }
}

/// `coefficient` as a product prefix: hidden when 1, a bare sign when -1
fn coefficient_prefix(coefficient: &Number, mode: FormatMode) -> String {
    if coefficient.is_one() {
        String::new()
    } else if coefficient.is_minus_one() {
        "-".to_string()
    } else {
        rendered(coefficient, mode)
    }
}

fn has_negative_exponent(term: &MonomialTerm) -> bool {
    term.numeric_exponent().is_some_and(|n| n.is_negative())
}

impl Render for Monomial {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if self.is_constant() {
            return self.coefficient().render(f, mode);
        }
        if mode == FormatMode::Latex && self.terms().iter().any(has_negative_exponent) {
            return write!(f, "{}", latex_monomial_fraction(self));
        }

        let mut out = coefficient_prefix(self.coefficient(), mode);
        for term in self.terms() {
            push_factor(&mut out, &rendered(term, mode), mode);
        }
        write!(f, "{out}")
    }
}

/// `x^{2}y^{-1}` typeset as `\frac{x^{2}}{y}`
fn latex_monomial_fraction(monomial: &Monomial) -> String {
    let mode = FormatMode::Latex;
    let coefficient = monomial.coefficient();
    let sign = if coefficient.is_negative() { "-" } else { "" };

    let mut numerator = String::new();
    let numer = coefficient.numer().magnitude().to_string();
    if numer != "1" {
        numerator.push_str(&numer);
    }
    let mut denominator = String::new();
    let denom = coefficient.denom().to_string();
    if denom != "1" {
        denominator.push_str(&denom);
    }

    for term in monomial.terms() {
        match term.numeric_exponent() {
            Some(n) if n.is_negative() => {
                let positive = MonomialTerm::new(term.base().clone(), Combinable::number(n.negate()));
                push_factor(&mut denominator, &rendered(&positive, mode), mode);
            }
            _ => push_factor(&mut numerator, &rendered(term, mode), mode),
        }
    }
    if numerator.is_empty() {
        numerator.push('1');
    }
    format!("{sign}\\frac{{{numerator}}}{{{denominator}}}")
}

// =============================================================================
// POLYNOMIALS
// =============================================================================

fn format_sum(sum: &[Monomial], mode: FormatMode) -> String {
    if sum.is_empty() {
        return "0".to_string();
    }
    join_sum(sum.iter().map(|m| rendered(m, mode)))
}

/// A denominator reads unambiguously without parentheses when it is a plain number or
/// a single bare term
fn is_bare_denominator(denominator: &[Monomial]) -> bool {
    match denominator {
        [only] => only.is_constant() || (only.coefficient().is_one() && only.terms().len() == 1),
        _ => false,
    }
}

fn format_term_base(term: &PolynomialTerm, mode: FormatMode) -> String {
    let numerator = format_sum(term.numerator(), mode);
    if term.has_unit_denominator() {
        return numerator;
    }
    let denominator = format_sum(term.denominator(), mode);
    match mode {
        FormatMode::Latex => format!("\\frac{{{numerator}}}{{{denominator}}}"),
        FormatMode::Standard => {
            let numerator = if term.numerator().len() > 1 {
                wrap_parens(&numerator, mode)
            } else {
                numerator
            };
            let denominator = if is_bare_denominator(term.denominator()) {
                denominator
            } else {
                wrap_parens(&denominator, mode)
            };
            format!("{numerator}/{denominator}")
        }
    }
}

impl Render for PolynomialTerm {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        let base = format_term_base(self, mode);
        if self.has_unit_exponent() {
            return write!(f, "{base}");
        }
        write!(
            f,
            "{}{}",
            wrap_parens(&base, mode),
            format_exponent(&self.exponent(), mode)
        )
    }
}

/// A polynomial used as a product prefix: hidden when 1, parenthesized when it is a
/// sum or a quotient
fn polynomial_prefix(polynomial: &Polynomial, mode: FormatMode) -> String {
    if polynomial.is_one() {
        return String::new();
    }
    if let Some(monomial) = polynomial.as_monomial() {
        return if monomial.is_constant() {
            coefficient_prefix(monomial.coefficient(), mode)
        } else {
            rendered(monomial, mode)
        };
    }
    wrap_parens(&rendered(polynomial, mode), mode)
}

impl Render for Polynomial {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        if self.is_expanded() {
            return self.expanded().render(f, mode);
        }
        let mut out = match self.expanded().as_monomial() {
            Some(m) if m.is_constant() => coefficient_prefix(m.coefficient(), mode),
            Some(m) => rendered(m, mode),
            None => wrap_parens(&rendered(self.expanded(), mode), mode),
        };
        for factor in self.unexpanded() {
            push_factor(&mut out, &rendered(factor, mode), mode);
        }
        write!(f, "{out}")
    }
}

// =============================================================================
// FUNCTIONS
// =============================================================================

impl Render for AppliedFunction {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        let args = self
            .args()
            .iter()
            .map(|a| rendered(a, mode))
            .collect::<Vec<_>>()
            .join(",");
        match mode {
            FormatMode::Standard => write!(f, "{}({args})", self.name()),
            FormatMode::Latex => write!(f, "{}\\left({args}\\right)", self.markup()),
        }
    }
}

impl Render for FunctionFactor {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        self.function().render(f, mode)?;
        if self.exponent().is_one() {
            return Ok(());
        }
        write!(f, "{}", format_number_exponent(self.exponent(), mode))
    }
}

impl Render for FunctionTerm {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        let mut out = polynomial_prefix(self.coefficient(), mode);
        for factor in self.factors() {
            push_factor(&mut out, &rendered(factor, mode), mode);
        }
        write!(f, "{out}")
    }
}

impl Render for FunctionExpression {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        write!(f, "{}", join_sum(self.terms().iter().map(|t| rendered(t, mode))))
    }
}

impl Render for Combinable {
    fn render(&self, f: &mut fmt::Formatter<'_>, mode: FormatMode) -> fmt::Result {
        let parts = self
            .polynomial()
            .map(|p| rendered(p, mode))
            .into_iter()
            .chain(self.functions().map(|e| rendered(e, mode)));
        let text = join_sum(parts);
        if text.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{text}")
    }
}

// =============================================================================
// PUBLIC SURFACE
// =============================================================================

macro_rules! impl_display_and_markup {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.render(f, FormatMode::Standard)
                }
            }

            impl $ty {
                /// LaTeX markup for the typeset display
                #[must_use]
                pub fn to_markup(&self) -> String {
                    rendered(self, FormatMode::Latex)
                }
            }
        )*
    };
}

impl_display_and_markup!(
    Number,
    Symbol,
    Base,
    MonomialTerm,
    Monomial,
    PolynomialTerm,
    Polynomial,
    AppliedFunction,
    FunctionFactor,
    FunctionTerm,
    FunctionExpression,
    Combinable,
);

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::{Environment, OutputMode};

    fn env() -> Environment {
        Environment::new().with_output_mode(OutputMode::Exact)
    }

    fn x() -> Combinable {
        Combinable::symbol(Symbol::variable("x"))
    }

    fn int(n: i64) -> Combinable {
        Combinable::number(Number::from_integer(n))
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Number::from_integer(-7).to_string(), "-7");
        assert_eq!(Number::fraction(-3, 4).unwrap().to_string(), "-3/4");
        assert_eq!(Number::fraction(-3, 4).unwrap().to_markup(), "-\\frac{3}{4}");
        let third = Number::one()
            .into_decimal()
            .div(&Number::from_integer(3), &Environment::new())
            .unwrap();
        assert_eq!(third.to_string(), "0.333333333333");
        let quarter = Number::parse_decimal("0.25", NumberForm::Decimal).unwrap();
        assert_eq!(quarter.to_markup(), "0.25");
    }

    #[test]
    fn test_display_monomials() {
        let env = env();
        let m = x().exponentiate(&int(3), &env).unwrap().multiply(&int(-5), &env).unwrap();
        assert_eq!(m.to_string(), "-5x^3");
        assert_eq!(m.to_markup(), "-5x^{3}");
        let neg = x().negate();
        assert_eq!(neg.to_string(), "-x");
    }

    #[test]
    fn test_display_symbolic_exponents() {
        let env = env();
        let y = Combinable::symbol(Symbol::variable("y"));
        let xy = x().exponentiate(&y, &env).unwrap();
        assert_eq!(xy.to_string(), "x^y");
        let half = Combinable::number(Number::fraction(1, 2).unwrap());
        let root = x().exponentiate(&half, &env).unwrap();
        assert_eq!(root.to_string(), "x^(1/2)");
        assert_eq!(root.to_markup(), "x^{\\frac{1}{2}}");
        let eight_y = int(8).exponentiate(&y, &env).unwrap().multiply(&x(), &env).unwrap();
        assert_eq!(eight_y.to_string(), "x*8^y");
        assert_eq!(eight_y.to_markup(), "x\\cdot 8^{y}");
    }

    #[test]
    fn test_display_negative_base() {
        let env = env();
        let y = Combinable::symbol(Symbol::variable("y"));
        let p = int(-2).exponentiate(&y, &env).unwrap();
        assert_eq!(p.to_string(), "(-2)^y");
        assert_eq!(p.to_markup(), "\\left(-2\\right)^{y}");
    }

    #[test]
    fn test_display_quotients() {
        let env = env();
        let num = x().add(&int(5), &env).unwrap();
        let den = x().add(&int(3), &env).unwrap();
        let q = num.divide(&den, &env).unwrap();
        assert_eq!(q.to_string(), "(x+5)/(x+3)");
        assert_eq!(q.to_markup(), "\\frac{x+5}{x+3}");
        let inv = int(1).divide(&x(), &env).unwrap();
        assert_eq!(inv.to_string(), "1/x");
    }

    #[test]
    fn test_latex_negative_exponent_monomial() {
        let env = env();
        let terms = vec![
            MonomialTerm::new(Symbol::variable("y").into(), int(2)),
            MonomialTerm::new(Symbol::variable("x").into(), int(-1)),
        ];
        let m = Monomial::from_parts(Number::from_integer(3), terms, &env).unwrap();
        assert_eq!(m.to_string(), "3x^(-1)y^2");
        assert_eq!(m.to_markup(), "\\frac{3y^{2}}{x}");
        let inv = x().exponentiate(&int(-2), &env).unwrap();
        assert_eq!(inv.to_string(), "1/x^2");
    }

    #[test]
    fn test_display_unexpanded() {
        let env = env();
        let half = Combinable::number(Number::fraction(1, 2).unwrap());
        let base = x().add(&int(1), &env).unwrap();
        let root = base.exponentiate(&half, &env).unwrap().multiply(&int(2), &env).unwrap();
        assert_eq!(root.to_string(), "2(x+1)^(1/2)");
        assert_eq!(root.to_markup(), "2\\left(x+1\\right)^{\\frac{1}{2}}");
    }

    #[test]
    fn test_display_functions() {
        let env = env();
        let sin = env.function("sin").unwrap();
        let s = Combinable::function(sin, vec![x()]);
        assert_eq!(s.to_string(), "sin(x)");
        assert_eq!(s.to_markup(), "\\sin\\left(x\\right)");
        let inv = int(1).divide(&s, &env).unwrap();
        assert_eq!(inv.to_string(), "sin(x)^(-1)");
        let mixed = x().subtract(&s, &env).unwrap();
        assert_eq!(mixed.to_string(), "x-sin(x)");
    }

    #[test]
    fn test_display_constant() {
        let pi = Symbol::constant("pi", "\\pi ");
        assert_eq!(pi.to_string(), "pi");
        assert_eq!(pi.to_markup(), "\\pi ");
    }
}
