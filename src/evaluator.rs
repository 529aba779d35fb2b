//! Postfix stack evaluator
//!
//! Values are pushed with the span they came from; operators pop their right then
//! left operand and push the result spanning both. Functions pop exactly their arity
//! and bind the arguments in source order.

use crate::parser::{Operator, Token, TokenKind};
use crate::{CalcError, Combinable, Environment, Span};

/// Stack entry: a value and the input it was computed from
struct Operand {
    value: Combinable,
    span: Span,
}

fn apply(
    op: Operator,
    left: &Combinable,
    right: &Combinable,
    env: &Environment,
) -> Result<Combinable, CalcError> {
    match op {
        Operator::Add => left.add(right, env),
        Operator::Sub => left.subtract(right, env),
        Operator::Mul | Operator::ImplicitMul | Operator::Negate => left.multiply(right, env),
        Operator::Div => left.divide(right, env),
        Operator::Pow => left.exponentiate(right, env),
    }
}

/// Evaluate a postfix queue to a single value
///
/// # Errors
/// `Syntax` when an operator or function runs out of operands or values are left
/// over; any algebra error raised while applying an operator.
pub fn evaluate(postfix: &[Token], env: &Environment) -> Result<Combinable, CalcError> {
    let mut stack: Vec<Operand> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match &token.kind {
            TokenKind::Value(value) => stack.push(Operand {
                value: value.clone(),
                span: token.span,
            }),
            TokenKind::Operator(op) => {
                let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                    return Err(CalcError::syntax_at(
                        format!("Too few operands for operator \"{op}\""),
                        token.span,
                    ));
                };
                let value = apply(*op, &left.value, &right.value, env)?;
                log::trace!("{} {op} {} = {value}", left.value, right.value);
                stack.push(Operand {
                    value,
                    span: Span::new(left.span.start.min(token.span.start), right.span.end),
                });
            }
            TokenKind::Function(def) => {
                if stack.len() < def.arity {
                    return Err(CalcError::syntax_at(
                        format!("Too few arguments for function \"{}\"", def.name),
                        token.span,
                    ));
                }
                let args = stack.split_off(stack.len() - def.arity);
                let end = args.last().map_or(token.span.end, |a| a.span.end);
                let args = args.into_iter().map(|a| a.value).collect();
                stack.push(Operand {
                    value: Combinable::function(def, args),
                    span: Span::new(token.span.start, end),
                });
            }
            TokenKind::Comma | TokenKind::LeftParen | TokenKind::RightParen => {
                return Err(CalcError::syntax_at(
                    format!("Unexpected \"{token}\""),
                    token.span,
                ));
            }
        }
    }

    let result = stack.pop().ok_or(CalcError::EmptyExpression)?;
    if let Some(extra) = stack.pop() {
        return Err(CalcError::syntax_at(
            format!(
                "Too many operands/arguments. Extra operand/argument detected: {}",
                extra.value
            ),
            extra.span,
        ));
    }
    log::debug!("evaluated to {}", result.value);
    Ok(result.value)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::{Number, OutputMode};

    fn env() -> Environment {
        let mut env = Environment::new().with_output_mode(OutputMode::Exact);
        env.define_variable("x").unwrap();
        env.define_function("max", 2, None).unwrap();
        env
    }

    fn eval(input: &str) -> Result<Combinable, CalcError> {
        let env = env();
        evaluate(&parse(input, &env)?, &env)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2+3*4").unwrap().as_number(), Some(Number::from_integer(14)));
        assert_eq!(eval("2^3^2").unwrap().as_number(), Some(Number::from_integer(512)));
        assert_eq!(eval("-2^2").unwrap().as_number(), Some(Number::from_integer(-4)));
    }

    #[test]
    fn test_too_few_operands() {
        let err = eval("1+").unwrap_err();
        assert_eq!(
            err,
            CalcError::syntax_at("Too few operands for operator \"+\"", Span::at(1))
        );
    }

    #[test]
    fn test_function_arguments_in_order() {
        let v = eval("max(x, 2)").unwrap();
        assert_eq!(v.to_string(), "max(x,2)");
    }

    #[test]
    fn test_too_few_arguments() {
        let err = eval("max(x)").unwrap_err();
        assert_eq!(
            err,
            CalcError::syntax_at("Too few arguments for function \"max\"", Span::new(0, 3))
        );
    }

    #[test]
    fn test_too_many_operands() {
        let err = eval("sin(x, 2)").unwrap_err();
        match err {
            CalcError::Syntax { msg, span } => {
                assert_eq!(
                    msg,
                    "Too many operands/arguments. Extra operand/argument detected: x"
                );
                assert_eq!(span, Some(Span::at(4)));
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("x/0"), Err(CalcError::DivisionByZero));
    }
}
