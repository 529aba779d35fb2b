//! Token types produced by the lexer
//!
//! Tokens carry the character span they were read from so that syntax errors can
//! point back into the input text. Values are evaluated at lex time: a numeric
//! literal or a variable reference is already a `Combinable`.

use std::fmt;

use crate::environment::FunctionDef;
use crate::{Combinable, Span};

/// Binary operators, plus the two the normalizer inserts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// Unary minus, always preceded by a literal `-1` and applied as a product
    Negate,
    /// Multiplication implied by juxtaposition (`2x`, `(a)(b)`)
    ImplicitMul,
}

/// Operand grouping when precedences tie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl Operator {
    /// Operators a user can type
    pub const VISIBLE: [Operator; 5] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Pow,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            "^" => Some(Operator::Pow),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul | Operator::ImplicitMul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Negate => "!",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::ImplicitMul | Operator::Div => 2,
            Operator::Pow | Operator::Negate => 3,
        }
    }

    pub fn associativity(self) -> Associativity {
        match self {
            Operator::Pow | Operator::Negate => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    /// LaTeX between the operands; `Negate` and `ImplicitMul` typeset as juxtaposition
    pub fn markup(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "\\cdot ",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Negate | Operator::ImplicitMul => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Value(Combinable),
    Operator(Operator),
    Function(FunctionDef),
    Comma,
    LeftParen,
    RightParen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    /// Operands and closing parentheses end a product factor
    pub(crate) fn ends_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Value(_) | TokenKind::RightParen)
    }

    /// Operands and opening parentheses start one
    pub(crate) fn starts_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Value(_) | TokenKind::LeftParen)
    }

    /// LaTeX for this token on its own
    #[must_use]
    pub fn to_markup(&self) -> String {
        match &self.kind {
            TokenKind::Value(value) => value.to_markup(),
            TokenKind::Operator(op) => op.markup().to_string(),
            TokenKind::Function(def) => def.markup.to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::LeftParen => "\\left(".to_string(),
            TokenKind::RightParen => "\\right)".to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Value(value) => write!(f, "{value}"),
            TokenKind::Operator(op) => write!(f, "{op}"),
            TokenKind::Function(def) => write!(f, "{}", def.name),
            TokenKind::Comma => write!(f, ","),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_table() {
        assert!(Operator::Pow.precedence() > Operator::Mul.precedence());
        assert!(Operator::Mul.precedence() > Operator::Sub.precedence());
        assert_eq!(Operator::Negate.precedence(), Operator::Pow.precedence());
        assert_eq!(Operator::Pow.associativity(), Associativity::Right);
        assert_eq!(Operator::Div.associativity(), Associativity::Left);
    }

    #[test]
    fn test_symbols_round_trip() {
        for op in Operator::VISIBLE {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("!"), None);
    }

    #[test]
    fn test_token_markup() {
        let mul = Token::new(TokenKind::Operator(Operator::Mul), Span::at(0));
        assert_eq!(mul.to_markup(), "\\cdot ");
        assert_eq!(mul.to_string(), "*");
        let open = Token::new(TokenKind::LeftParen, Span::at(1));
        assert_eq!(open.to_markup(), "\\left(");
    }
}
