//! LaTeX rendering of the parsed input
//!
//! Built from the postfix queue rather than the raw text, so the markup shows how
//! the input was actually grouped: `\frac{a}{b}` for division, braces around
//! exponents, and `\left( \right)` only where precedence needs them.

use crate::parser::tokens::{Operator, Token, TokenKind};
use crate::{CalcError, Combinable};

/// Binding strength of a rendered fragment; atoms never need parentheses
const ATOM: u8 = u8::MAX;

struct Fragment {
    text: String,
    precedence: u8,
}

impl Fragment {
    /// The fragment's text, parenthesized when it binds looser than `min`
    fn at_least(&self, min: u8) -> String {
        if self.precedence < min {
            format!("\\left({}\\right)", self.text)
        } else {
            self.text.clone()
        }
    }

    /// Right-hand operand of `+`, `-` or a product: a leading sign is always
    /// parenthesized so it never reads as a second operator
    fn operand(&self, min: u8) -> String {
        if self.text.starts_with('-') {
            format!(r"\left({}\right)", self.text)
        } else {
            self.at_least(min)
        }
    }
}

/// How tightly an input value holds together when typeset
fn value_precedence(value: &Combinable) -> u8 {
    if let Some(n) = value.as_number() {
        return if n.is_negative() { 2 } else { ATOM };
    }
    let monomial = value
        .polynomial()
        .filter(|_| value.functions().is_none())
        .and_then(|p| p.as_monomial());
    match monomial {
        Some(m) if m.coefficient().is_one() && m.terms().len() == 1 => ATOM,
        Some(_) => 2,
        None => 1,
    }
}

fn combine(op: Operator, left: &Fragment, right: &Fragment) -> Fragment {
    let precedence = op.precedence();
    let text = match op {
        Operator::Add => format!("{}+{}", left.text, right.operand(precedence)),
        Operator::Sub => format!("{}-{}", left.text, right.operand(precedence + 1)),
        Operator::Mul => format!(
            "{}\\cdot {}",
            left.at_least(precedence),
            right.operand(precedence + 1)
        ),
        Operator::ImplicitMul => {
            format!("{}{}", left.at_least(precedence), right.operand(precedence + 1))
        }
        Operator::Div => format!("\\frac{{{}}}{{{}}}", left.text, right.text),
        Operator::Pow => format!("{}^{{{}}}", left.at_least(ATOM), right.text),
        Operator::Negate => format!("-{}", right.at_least(precedence)),
    };
    let precedence = match op {
        Operator::Negate => 2,
        _ => precedence,
    };
    Fragment { text, precedence }
}

fn too_few(what: &str, token: &Token) -> CalcError {
    CalcError::syntax_at(format!("Too few {what} \"{token}\""), token.span)
}

/// Render a postfix queue as LaTeX
///
/// # Errors
/// `Syntax` when the queue does not describe a single well-formed expression.
pub fn postfix_markup(postfix: &[Token]) -> Result<String, CalcError> {
    let mut stack: Vec<Fragment> = Vec::new();

    for token in postfix {
        match &token.kind {
            TokenKind::Value(value) => stack.push(Fragment {
                text: value.to_markup(),
                precedence: value_precedence(value),
            }),
            TokenKind::Operator(op) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(too_few("operands for operator", token));
                };
                stack.push(combine(*op, &left, &right));
            }
            TokenKind::Function(def) => {
                if stack.len() < def.arity {
                    return Err(too_few("arguments for function", token));
                }
                let args = stack
                    .split_off(stack.len() - def.arity)
                    .into_iter()
                    .map(|a| a.text)
                    .collect::<Vec<_>>()
                    .join(",");
                stack.push(Fragment {
                    text: format!("{}\\left({args}\\right)", def.markup),
                    precedence: ATOM,
                });
            }
            TokenKind::Comma | TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(CalcError::syntax_at(
                    format!("Unexpected \"{token}\" in postfix"),
                    token.span,
                ));
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(result), true) => Ok(result.text),
        (None, _) => Err(CalcError::EmptyExpression),
        (Some(_), false) => Err(CalcError::syntax(
            "Too many operands/arguments in input markup",
        )),
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
    use crate::parser::{normalize, to_postfix, tokenize};
    use crate::{Environment, OutputMode};

    fn markup(input: &str) -> String {
        let mut env = Environment::new().with_output_mode(OutputMode::Exact);
        env.define_variable("x").unwrap();
        env.define_variable("y").unwrap();
        let postfix = to_postfix(normalize(tokenize(input, &env).unwrap())).unwrap();
        postfix_markup(&postfix).unwrap()
    }

    #[test]
    fn test_fraction_and_power() {
        assert_eq!(markup("(x+1)/2"), "\\frac{x+1}{2}");
        assert_eq!(markup("x^(y+1)"), "x^{y+1}");
        assert_eq!(markup("(x+1)^2"), "\\left(x+1\\right)^{2}");
    }

    #[test]
    fn test_products() {
        assert_eq!(markup("2x"), "2x");
        assert_eq!(markup("2*x"), "2\\cdot x");
        assert_eq!(markup("(x+1)(x-1)"), "\\left(x+1\\right)\\left(x-1\\right)");
    }

    #[test]
    fn test_negation() {
        assert_eq!(markup("-x^2"), "-x^{2}");
        assert_eq!(markup("1-(x+1)"), "1-\\left(x+1\\right)");
        assert_eq!(markup("-(x+1)"), "-\\left(x+1\\right)");
    }

    #[test]
    fn test_negated_right_operand() {
        assert_eq!(markup("1--x"), "1-\\left(-x\\right)");
        assert_eq!(markup("1+-x"), "1+\\left(-x\\right)");
        assert_eq!(markup("2*-x"), "2\\cdot \\left(-x\\right)");
        assert_eq!(markup("-x-1"), "-x-1");
    }

    #[test]
    fn test_function() {
        assert_eq!(markup("sin(x)^2"), "\\sin\\left(x\\right)^{2}");
    }
}
