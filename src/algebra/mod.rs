//! Symbolic value model and its canonicalizing algebra
//!
//! Values are layered: `Monomial` inside `PolynomialTerm` inside `Polynomial`, with
//! applied functions kept apart in `FunctionExpression`; `Combinable` joins the two.
//! All values are immutable; operations return new values in canonical form so that
//! structural equality is mathematical equality for the supported forms.

use std::cmp::Ordering;

mod combinable;
mod function;
mod monomial;
mod polynomial;
mod polynomial_term;

pub use combinable::Combinable;
pub use function::{AppliedFunction, FunctionExpression, FunctionFactor, FunctionTerm};
pub use monomial::{Monomial, MonomialTerm};
pub use polynomial::Polynomial;
pub use polynomial_term::{Division, PolynomialTerm};

/// Lexicographic order under `cmp`; on a common prefix the shorter slice sorts first
fn cmp_slices<T>(a: &[T], b: &[T], cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| cmp(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Absent sorts before present
fn cmp_options<T>(a: Option<&T>, b: Option<&T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}
