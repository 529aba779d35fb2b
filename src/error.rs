//! Error type shared by every pipeline stage

use std::fmt;

/// Char offsets `start..end` into the original input (whitespace included)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// The single char at `offset`
    pub const fn at(offset: usize) -> Self {
        Span::new(offset, offset + 1)
    }

    pub const fn empty() -> Self {
        Span::new(0, 0)
    }

    pub const fn is_valid(&self) -> bool {
        self.start < self.end
    }

    const fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Renders as a message suffix with 1-based positions; an empty span renders as
/// nothing
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width() {
            0 => Ok(()),
            1 => write!(f, " at position {}", self.end),
            _ => write!(f, " at positions {}-{}", self.start + 1, self.end),
        }
    }
}

/// Errors raised while tokenizing, converting or evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    EmptyExpression,

    /// A run of input that is neither a registered name nor a numeric literal
    Parse {
        text: String,
        span: Option<Span>,
    },

    /// Structurally invalid token sequence
    Syntax {
        msg: String,
        span: Option<Span>,
    },

    /// A non-value token was offered as a variable's value
    Type {
        name: String,
        found: String,
    },

    NameCollision {
        name: String,
    },
    DivisionByZero,
    UnsupportedOperation(String),
}

impl CalcError {
    /// Create a ParseError for an unrecognized run of input
    pub fn parse_at(text: impl Into<String>, span: Span) -> Self {
        CalcError::Parse {
            text: text.into(),
            span: Some(span),
        }
    }

    /// Create a SyntaxError without location
    pub fn syntax(msg: impl Into<String>) -> Self {
        CalcError::Syntax {
            msg: msg.into(),
            span: None,
        }
    }

    /// Create a SyntaxError pointing at the offending token
    pub fn syntax_at(msg: impl Into<String>, span: Span) -> Self {
        CalcError::Syntax {
            msg: msg.into(),
            span: span.is_valid().then_some(span),
        }
    }

    pub fn type_mismatch(name: impl Into<String>, found: impl Into<String>) -> Self {
        CalcError::Type {
            name: name.into(),
            found: found.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        CalcError::UnsupportedOperation(msg.into())
    }

    /// Source location of the error, when one is known
    pub fn span(&self) -> Option<Span> {
        match self {
            CalcError::Parse { span, .. } | CalcError::Syntax { span, .. } => *span,
            _ => None,
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::EmptyExpression => write!(f, "Expression cannot be empty"),
            CalcError::Parse { text, span } => {
                write!(f, "Unidentifiable: {text}{}", span.unwrap_or_default())
            }
            CalcError::Syntax { msg, span } => {
                write!(f, "Syntax error: {msg}{}", span.unwrap_or_default())
            }
            CalcError::Type { name, found } => write!(
                f,
                "Type mismatch for {name}. Expected type Combinable, but found {found}"
            ),
            CalcError::NameCollision { name } => {
                write!(f, "Name '{name}' is already registered with another kind")
            }
            CalcError::DivisionByZero => write!(f, "Division by zero"),
            CalcError::UnsupportedOperation(msg) => {
                write!(f, "Unsupported operation: {msg}")
            }
        }
    }
}

impl std::error::Error for CalcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::at(0).to_string(), " at position 1");
        assert_eq!(Span::new(2, 5).to_string(), " at positions 3-5");
        assert_eq!(Span::empty().to_string(), "");
    }

    #[test]
    fn test_syntax_message() {
        let err = CalcError::syntax_at("Missing \")\"", Span::at(3));
        assert_eq!(err.to_string(), "Syntax error: Missing \")\" at position 4");
        assert_eq!(err.span(), Some(Span::at(3)));
    }

    #[test]
    fn test_type_message() {
        let err = CalcError::type_mismatch("y", "+");
        assert_eq!(
            err.to_string(),
            "Type mismatch for y. Expected type Combinable, but found +"
        );
    }

    #[test]
    fn test_empty_span_dropped() {
        let err = CalcError::syntax_at("Extra Parenthesis", Span::empty());
        assert_eq!(err.span(), None);
    }
}
