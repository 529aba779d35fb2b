//! Named symbols and monomial bases
//!
//! A `Symbol` is the identity of a variable or constant as it appears inside algebraic
//! values. Its registration data (binding, numeric value) lives in the `Environment`;
//! values only carry what they need to compare and render themselves.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::Number;

/// Variable or constant identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Algebraic indeterminate
    Variable(Arc<str>),
    /// Named constant such as `pi`; sorts after every variable and has degree 0
    Constant { name: Arc<str>, markup: Arc<str> },
}

impl Symbol {
    pub fn variable(name: impl Into<Arc<str>>) -> Self {
        Symbol::Variable(name.into())
    }

    pub fn constant(name: impl Into<Arc<str>>, markup: impl Into<Arc<str>>) -> Self {
        Symbol::Constant {
            name: name.into(),
            markup: markup.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(name) | Symbol::Constant { name, .. } => name,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Symbol::Constant { .. })
    }
}

/// Base of a `MonomialTerm`
///
/// Numeric bases only survive when raised to a non-numeric exponent (`8^x`);
/// numeric powers of numbers are folded into the monomial's coefficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    Symbol(Symbol),
    Number(Number),
}

impl Base {
    /// Variables count toward degree, constants and numbers do not
    pub fn is_variable(&self) -> bool {
        matches!(self, Base::Symbol(Symbol::Variable(_)))
    }

    fn rank(&self) -> u8 {
        if self.is_variable() { 0 } else { 1 }
    }

    /// Canonical order: variables by name, then constants and numeric bases by
    /// their textual form
    pub fn canonical_cmp(&self, other: &Base) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Base::Symbol(a), Base::Symbol(b)) => a.name().cmp(b.name()),
            (Base::Number(a), Base::Number(b)) => a.cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        })
    }
}

impl From<Symbol> for Base {
    fn from(symbol: Symbol) -> Self {
        Base::Symbol(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_before_constants() {
        let x = Base::from(Symbol::variable("x"));
        let a = Base::from(Symbol::variable("a"));
        let pi = Base::from(Symbol::constant("pi", "\\pi "));
        assert_eq!(a.canonical_cmp(&x), Ordering::Less);
        assert_eq!(pi.canonical_cmp(&a), Ordering::Greater);
        assert_eq!(x.canonical_cmp(&pi), Ordering::Less);
    }

    #[test]
    fn test_numbers_among_constants() {
        let eight = Base::Number(Number::from_integer(8));
        let pi = Base::from(Symbol::constant("pi", "\\pi "));
        let x = Base::from(Symbol::variable("x"));
        assert_eq!(eight.canonical_cmp(&pi), Ordering::Less);
        assert_eq!(x.canonical_cmp(&eight), Ordering::Less);
        assert!(!eight.is_variable());
    }
}
