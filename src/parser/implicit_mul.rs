//! Sign and implicit multiplication normalization
//!
//! Two passes over the token list:
//! 1. A `-` that cannot be binary subtraction (at the start, or after anything other
//!    than an operand or `)`) becomes the literal `-1` followed by `Negate`.
//! 2. A multiplication is inserted between juxtaposed operands, e.g. `2x` → `2 * x`.

use crate::parser::tokens::{Operator, Token, TokenKind};
use crate::{Combinable, Number};

fn is_subtraction(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Operator(Operator::Sub))
}

/// Replace unary minus signs with `-1 !`
///
/// `Negate` binds like `^` (right-associative, precedence 3), so `-x^2` reads as
/// `-1 ! (x^2)`.
pub fn mark_negations(tokens: Vec<Token>) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let unary = is_subtraction(&token) && !result.last().is_some_and(Token::ends_operand);
        if unary {
            let minus_one = Combinable::number(Number::minus_one());
            result.push(Token::new(TokenKind::Value(minus_one), token.span));
            result.push(Token::new(TokenKind::Operator(Operator::Negate), token.span));
        } else {
            result.push(token);
        }
    }
    result
}

/// Check if implicit multiplication should be inserted between two tokens
///
/// - Operand * Operand: `2x`, `xs`
/// - Operand * `(`: `2(x+1)`
/// - `)` * Operand or `(`: `(x+1)x`, `(a)(b)`
/// - Operand or `)` * Function: `2sin(x)`
///
/// A function never multiplies into its own `(`.
fn should_insert_mul(current: &Token, next: &Token) -> bool {
    current.ends_operand()
        && (next.starts_operand() || matches!(next.kind, TokenKind::Function(_)))
}

/// Insert implicit multiplication operators between appropriate tokens
pub fn insert_implicit_multiplication(tokens: Vec<Token>) -> Vec<Token> {
    let needs_insertion = tokens
        .windows(2)
        .any(|w| should_insert_mul(&w[0], &w[1]));
    if !needs_insertion {
        return tokens;
    }

    #[allow(
        clippy::integer_division,
        reason = "Integer division for capacity estimation in token vector"
    )]
    let mut result = Vec::with_capacity(tokens.len() * 3 / 2);
    let mut it = tokens.into_iter().peekable();

    while let Some(current) = it.next() {
        let inserted = it
            .peek()
            .filter(|next| should_insert_mul(&current, next))
            .map(|next| Token::new(TokenKind::Operator(Operator::ImplicitMul), next.span));

        result.push(current);
        if let Some(mul) = inserted {
            result.push(mul);
        }
    }

    result
}

/// Both normalization passes, signs first
pub fn normalize(tokens: Vec<Token>) -> Vec<Token> {
    let normalized = insert_implicit_multiplication(mark_negations(tokens));
    log::debug!("normalized to {} tokens", normalized.len());
    normalized
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::{Environment, Span};

    fn env() -> Environment {
        let mut env = Environment::new();
        env.define_variable("x").unwrap();
        env
    }

    fn normalized(input: &str) -> Vec<String> {
        normalize(tokenize(input, &env()).unwrap())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_number_identifier() {
        assert_eq!(normalized("2x"), ["2", "*", "x"]);
    }

    #[test]
    fn test_paren_products() {
        assert_eq!(normalized("(x)(x)"), ["(", "x", ")", "*", "(", "x", ")"]);
        assert_eq!(normalized("2(x)"), ["2", "*", "(", "x", ")"]);
    }

    #[test]
    fn test_function_no_multiplication() {
        assert_eq!(normalized("sin(x)"), ["sin", "(", "x", ")"]);
        assert_eq!(normalized("2sin(x)"), ["2", "*", "sin", "(", "x", ")"]);
    }

    #[test]
    fn test_leading_minus() {
        assert_eq!(normalized("-x"), ["-1", "!", "x"]);
    }

    #[test]
    fn test_double_minus() {
        assert_eq!(normalized("1--x"), ["1", "-", "-1", "!", "x"]);
        assert_eq!(normalized("(1)-x"), ["(", "1", ")", "-", "x"]);
    }

    #[test]
    fn test_negation_keeps_span() {
        let tokens = normalize(tokenize("2*-x", &env()).unwrap());
        assert_eq!(tokens[2].span, Span::at(2));
        assert!(matches!(tokens[3].kind, TokenKind::Operator(Operator::Negate)));
    }

    #[test]
    fn test_implicit_mul_marked() {
        let tokens = normalize(tokenize("2x", &env()).unwrap());
        assert!(matches!(
            tokens[1].kind,
            TokenKind::Operator(Operator::ImplicitMul)
        ));
    }
}
