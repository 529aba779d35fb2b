//! Symbolic Calculator Core
//!
//! Evaluates textual math expressions into an exact canonical symbolic form.
//!
//! # Features
//! - Exact rational arithmetic, with rounded decimals in approximate mode
//! - Polynomial algebra: canonical term order, long division, GCD cancellation
//! - Unexpanded products for non-integer powers (`(x+1)^(1/2)`)
//! - Symbolic functions (`sin`, `cos`, user-defined) carried with their arguments
//! - Implicit multiplication (`2x`, `(x+1)(x-1)`) and unary minus
//! - LaTeX markup for both the parsed input and the result
//!
//! # Usage
//! ```
//! use symcalc::{Environment, calculate};
//!
//! let mut env = Environment::new();
//! env.define_variable("x").unwrap();
//!
//! let calc = calculate("(1+x)(1+x)(1+x)", &env).unwrap();
//! assert_eq!(calc.result.to_string(), "x^3+3x^2+3x+1");
//! assert_eq!(calc.result_markup(), "x^{3}+3x^{2}+3x+1");
//! ```

mod algebra;
mod display;
pub mod environment;
mod error;
pub mod evaluator;
pub mod number;
pub mod parser;
mod symbol;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use algebra::{
    AppliedFunction, Combinable, Division, FunctionExpression, FunctionFactor, FunctionTerm,
    Monomial, MonomialTerm, Polynomial, PolynomialTerm,
};
pub use environment::{Environment, OutputMode};
pub use error::{CalcError, Span};
pub use number::{Number, NumberForm};
pub use parser::{Token, TokenKind};
pub use symbol::{Base, Symbol};

/// One run of the pipeline: the input, its postfix form and its value
#[derive(Debug, Clone)]
pub struct Calculation {
    pub input: String,
    pub postfix: Vec<Token>,
    pub result: Combinable,
    /// LaTeX of the input as it was grouped by the parser
    pub input_markup: String,
}

impl Calculation {
    /// Postfix tokens separated by spaces, e.g. `5 7 + 8 *`
    pub fn postfix_string(&self) -> String {
        self.postfix
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// LaTeX of the result
    pub fn result_markup(&self) -> String {
        self.result.to_markup()
    }
}

/// Run the full pipeline on `input`
///
/// # Errors
/// `EmptyExpression` for blank input, `Parse` for unrecognized text, `Syntax` for a
/// malformed expression, and any algebra error raised during evaluation.
pub fn calculate(input: &str, env: &Environment) -> Result<Calculation, CalcError> {
    let postfix = parser::parse(input, env)?;
    let result = evaluator::evaluate(&postfix, env)?;
    let input_markup = parser::postfix_markup(&postfix)?;
    Ok(Calculation {
        input: input.to_string(),
        postfix,
        result,
        input_markup,
    })
}

/// Evaluate `input` to its value
///
/// # Example
/// ```
/// use symcalc::{Environment, OutputMode, evaluate_str};
///
/// let env = Environment::new().with_output_mode(OutputMode::Exact);
/// let value = evaluate_str("1/3 + 1/6", &env).unwrap();
/// assert_eq!(value.to_string(), "1/2");
/// ```
///
/// # Errors
/// Same as [`calculate`].
pub fn evaluate_str(input: &str, env: &Environment) -> Result<Combinable, CalcError> {
    let postfix = parser::parse(input, env)?;
    evaluator::evaluate(&postfix, env)
}
