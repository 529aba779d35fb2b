//! Tokenizer: input text to a flat token list
//!
//! Whitespace is dropped before scanning. At each position the lexer tries, in order:
//! an operator symbol, a function name directly followed by `(`, a variable or
//! constant name, then `,` `(` `)`. Names are tried longest first. Anything else is
//! buffered and, once the next recognized token starts, read as a numeric literal.

use crate::parser::tokens::{Operator, Token, TokenKind};
use crate::{CalcError, Combinable, Environment, Number, Span};

/// Input with whitespace removed, remembering each char's original offset
struct Source {
    chars: Vec<char>,
    offsets: Vec<usize>,
}

impl Source {
    fn new(input: &str) -> Self {
        let (offsets, chars): (Vec<usize>, Vec<char>) = input
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .unzip();
        Source { chars, offsets }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn starts_with(&self, pos: usize, name: &str) -> bool {
        let mut i = pos;
        for expected in name.chars() {
            if self.chars.get(i) != Some(&expected) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Span in the original text covering stripped chars `start..end`
    fn span(&self, start: usize, end: usize) -> Span {
        let first = self.offsets.get(start).copied().unwrap_or(0);
        let last = end
            .checked_sub(1)
            .and_then(|i| self.offsets.get(i))
            .map_or(first, |&o| o + 1);
        Span::new(first, last)
    }
}

/// Pending run of unrecognized characters
struct Buffer {
    start: usize,
    text: String,
}

fn flush(
    buffer: &mut Option<Buffer>,
    end: usize,
    source: &Source,
    env: &Environment,
    tokens: &mut Vec<Token>,
) -> Result<(), CalcError> {
    let Some(Buffer { start, text }) = buffer.take() else {
        return Ok(());
    };
    let span = source.span(start, end);
    let number = Number::parse_decimal(&text, env.output_mode().number_form())
        .ok_or_else(|| CalcError::parse_at(text.clone(), span))?;
    tokens.push(Token::new(TokenKind::Value(Combinable::number(number)), span));
    Ok(())
}

/// Recognize a token at `pos`; returns it with its length in chars
fn recognize(source: &Source, pos: usize, env: &Environment) -> Option<(TokenKind, usize)> {
    let c = source.chars[pos];

    if let Some(op) = Operator::from_symbol(c.encode_utf8(&mut [0; 4]))
        && env.has_operator(op.symbol())
    {
        return Some((TokenKind::Operator(op), 1));
    }

    for name in env.function_names() {
        let len = name.chars().count();
        if source.starts_with(pos, name) && source.chars.get(pos + len) == Some(&'(') {
            let def = env.function(name)?;
            return Some((TokenKind::Function(def.clone()), len));
        }
    }

    for name in env.symbol_names() {
        if source.starts_with(pos, name) {
            let value = if let Some(var) = env.variable(name) {
                var.resolve()
            } else {
                Combinable::symbol(env.constant(name)?.symbol())
            };
            return Some((TokenKind::Value(value), name.chars().count()));
        }
    }

    match c {
        ',' => Some((TokenKind::Comma, 1)),
        '(' => Some((TokenKind::LeftParen, 1)),
        ')' => Some((TokenKind::RightParen, 1)),
        _ => None,
    }
}

/// Split `input` into tokens
///
/// # Errors
/// `Parse` when a run of characters is neither a registered name nor a number.
pub fn tokenize(input: &str, env: &Environment) -> Result<Vec<Token>, CalcError> {
    let source = Source::new(input);
    let mut tokens = Vec::with_capacity(source.len());
    let mut buffer: Option<Buffer> = None;
    let mut pos = 0;

    while pos < source.len() {
        match recognize(&source, pos, env) {
            Some((kind, len)) => {
                flush(&mut buffer, pos, &source, env, &mut tokens)?;
                tokens.push(Token::new(kind, source.span(pos, pos + len)));
                pos += len;
            }
            None => {
                buffer
                    .get_or_insert_with(|| Buffer {
                        start: pos,
                        text: String::new(),
                    })
                    .text
                    .push(source.chars[pos]);
                pos += 1;
            }
        }
    }
    flush(&mut buffer, pos, &source, env, &mut tokens)?;

    log::debug!("lexed {} tokens from {:?}", tokens.len(), input);
    Ok(tokens)
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
        let mut env = Environment::new();
        env.define_variable("x").unwrap();
        env.define_variable("s").unwrap();
        env
    }

    fn kinds(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_numbers_and_operators() {
        let tokens = tokenize("12 + 3.5*x", &env()).unwrap();
        assert_eq!(kinds(&tokens), ["12", "+", "3.5", "*", "x"]);
        assert_eq!(tokens[2].span, Span::new(5, 8));
    }

    #[test]
    fn test_adjacent_names() {
        let tokens = tokenize("5xsx", &env()).unwrap();
        assert_eq!(kinds(&tokens), ["5", "x", "s", "x"]);
    }

    #[test]
    fn test_function_needs_paren() {
        let tokens = tokenize("sin(x)", &env()).unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Function(_)));
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert!(tokenize("sin", &env()).is_err());
    }

    #[test]
    fn test_longest_name_wins() {
        let mut env = env();
        env.define_variable("xs").unwrap();
        let tokens = tokenize("xsx", &env).unwrap();
        assert_eq!(kinds(&tokens), ["xs", "x"]);
    }

    #[test]
    fn test_constant_lexes_to_symbol() {
        let tokens = tokenize("2pi", &env()).unwrap();
        match &tokens[1].kind {
            TokenKind::Value(v) => {
                assert_eq!(v, &Combinable::symbol(Symbol::constant("pi", "\\pi ")));
            }
            other => panic!("expected a value, got {other:?}"),
        }
    }

    #[test]
    fn test_bound_variable_lexes_to_value() {
        let mut env = env();
        env.bind_variable_value("y", Combinable::number(Number::from_integer(4)))
            .unwrap();
        let tokens = tokenize("y", &env).unwrap();
        assert_eq!(kinds(&tokens), ["4"]);
    }

    #[test]
    fn test_literal_form_follows_mode() {
        let exact = env().with_output_mode(OutputMode::Exact);
        let tokens = tokenize("0.5", &exact).unwrap();
        assert_eq!(kinds(&tokens), ["1/2"]);
        let tokens = tokenize("0.5", &env()).unwrap();
        assert_eq!(kinds(&tokens), ["0.5"]);
    }

    #[test]
    fn test_unidentifiable_run() {
        let err = tokenize("3 + 4q", &env()).unwrap_err();
        assert_eq!(err, CalcError::parse_at("4q", Span::new(4, 6)));
        assert_eq!(err.to_string(), "Unidentifiable: 4q at positions 5-6");
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ", &env()).unwrap().is_empty());
    }
}
