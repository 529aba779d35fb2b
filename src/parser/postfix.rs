//! Shunting-yard conversion from infix tokens to postfix order

use crate::CalcError;
use crate::parser::tokens::{Associativity, Operator, Token, TokenKind};

const MISSING_OPEN_PAREN: &str = "Missing \"(\"";
const EXTRA_PAREN: &str = "Extra Parenthesis";

/// Whether `top` must be output before `incoming` is pushed
fn pops_before(top: Operator, incoming: Operator) -> bool {
    top.precedence() > incoming.precedence()
        || (top.precedence() == incoming.precedence()
            && incoming.associativity() == Associativity::Left)
}

/// Move tokens from the stack to the output while the top satisfies `pred`
fn pop_while(stack: &mut Vec<Token>, output: &mut Vec<Token>, pred: impl Fn(&Token) -> bool) {
    while stack.last().is_some_and(&pred) {
        if let Some(top) = stack.pop() {
            output.push(top);
        }
    }
}

fn is_left_paren(token: &Token) -> bool {
    matches!(token.kind, TokenKind::LeftParen)
}

/// Reorder tokens into postfix
///
/// Functions wait on the operator stack until the `)` closing their argument list.
/// Commas flush operators back to the enclosing `(`.
///
/// # Errors
/// `Syntax` for a `,` or `)` with no matching `(`, and for a `(` that is never
/// closed.
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, CalcError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Value(_) => output.push(token),
            TokenKind::Function(_) | TokenKind::LeftParen => stack.push(token),
            TokenKind::Comma => {
                pop_while(&mut stack, &mut output, |t| !is_left_paren(t));
                if stack.is_empty() {
                    return Err(CalcError::syntax_at(MISSING_OPEN_PAREN, token.span));
                }
            }
            TokenKind::Operator(incoming) => {
                let incoming = *incoming;
                pop_while(&mut stack, &mut output, |t| {
                    matches!(t.kind, TokenKind::Operator(top) if pops_before(top, incoming))
                });
                stack.push(token);
            }
            TokenKind::RightParen => {
                pop_while(&mut stack, &mut output, |t| !is_left_paren(t));
                if stack.pop().is_none() {
                    return Err(CalcError::syntax_at(MISSING_OPEN_PAREN, token.span));
                }
                if stack
                    .last()
                    .is_some_and(|t| matches!(t.kind, TokenKind::Function(_)))
                    && let Some(function) = stack.pop()
                {
                    output.push(function);
                }
            }
        }
    }

    while let Some(top) = stack.pop() {
        if matches!(top.kind, TokenKind::LeftParen | TokenKind::RightParen) {
            return Err(CalcError::syntax_at(EXTRA_PAREN, top.span));
        }
        output.push(top);
    }

    log::debug!(
        "postfix: {}",
        output
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok(output)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::parser::{normalize, tokenize};
    use crate::{Environment, Span};

    fn env() -> Environment {
        let mut env = Environment::new();
        env.define_variable("x").unwrap();
        env.define_function("max", 2, None).unwrap();
        env
    }

    fn postfix(input: &str) -> Result<String, CalcError> {
        let tokens = normalize(tokenize(input, &env())?);
        Ok(to_postfix(tokens)?
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(
            postfix("5+7-8*9^5^7-3").unwrap(),
            "5 7 + 8 9 5 7 ^ ^ * - 3 -"
        );
        assert_eq!(postfix("8/4/2").unwrap(), "8 4 / 2 /");
    }

    #[test]
    fn test_negation_binds_like_power() {
        assert_eq!(postfix("-x^2").unwrap(), "-1 x 2 ^ !");
        assert_eq!(postfix("2^-x").unwrap(), "2 -1 x ! ^");
    }

    #[test]
    fn test_function_arguments() {
        assert_eq!(postfix("sin(x+1)").unwrap(), "x 1 + sin");
        assert_eq!(postfix("max(x, 2x)").unwrap(), "x 2 x * max");
    }

    #[test]
    fn test_missing_open_paren() {
        let err = postfix("x+1)").unwrap_err();
        assert_eq!(err, CalcError::syntax_at(MISSING_OPEN_PAREN, Span::at(3)));
        assert!(postfix("1,2").is_err());
    }

    #[test]
    fn test_extra_paren() {
        let err = postfix("(((1").unwrap_err();
        assert!(matches!(err, CalcError::Syntax { .. }));
        assert_eq!(err.span(), Some(Span::at(2)));
    }
}
