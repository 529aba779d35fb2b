//! Parser module - converts input text to a postfix token queue
//!
//! Pipeline: lex -> normalize (unary minus, implicit multiplication) -> shunting-yard.
//! Each stage is public so callers can inspect intermediate token lists.
mod implicit_mul;
mod lexer;
mod markup;
mod postfix;
mod tokens;

pub use implicit_mul::{insert_implicit_multiplication, mark_negations, normalize};
pub use lexer::tokenize;
pub use markup::postfix_markup;
pub use postfix::to_postfix;
pub use tokens::{Associativity, Operator, Token, TokenKind};

use crate::{CalcError, Environment, Span};

/// Parse an input string into postfix order
///
/// # Example
/// ```
/// use symcalc::Environment;
/// use symcalc::parser::parse;
///
/// let mut env = Environment::new();
/// env.define_variable("x").unwrap();
/// let postfix = parse("2x+1", &env).unwrap();
/// assert_eq!(postfix.len(), 5);
/// ```
///
/// # Errors
/// Returns `CalcError` if:
/// - The input is empty
/// - A run of characters is not a name or a number
/// - Parentheses are unbalanced
/// - Only parentheses and commas remain once grouping is resolved (`()`, `(,)`)
pub fn parse(input: &str, env: &Environment) -> Result<Vec<Token>, CalcError> {
    let tokens = tokenize(input, env)?;
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(CalcError::EmptyExpression);
    };
    let span = Span::new(first.span.start, last.span.end);
    let postfix = to_postfix(normalize(tokens))?;
    if postfix.is_empty() {
        return Err(CalcError::syntax_at("Missing operand", span));
    }
    Ok(postfix)
}
