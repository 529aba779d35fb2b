//! User-facing error messages and their positions

use crate::{CalcError, Environment, Span, calculate};

fn env() -> Environment {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = Environment::new();
    env.define_variable("x").unwrap();
    env
}

fn message(input: &str) -> String {
    calculate(input, &env()).unwrap_err().to_string()
}

#[test]
fn test_unclosed_parenthesis() {
    assert_eq!(message("(((1"), "Syntax error: Extra Parenthesis at position 3");
}

#[test]
fn test_unopened_parenthesis() {
    assert_eq!(message("1+2)"), "Syntax error: Missing \"(\" at position 4");
}

#[test]
fn test_dangling_operator() {
    assert_eq!(
        message("1+"),
        "Syntax error: Too few operands for operator \"+\" at position 2"
    );
}

#[test]
fn test_undefined_name() {
    assert_eq!(message("1+y"), "Unidentifiable: y at position 3");
    let err = calculate("2 * foo", &env()).unwrap_err();
    assert_eq!(err.span(), Some(Span::new(4, 7)));
}

#[test]
fn test_empty_input() {
    assert!(matches!(
        calculate("  ", &env()),
        Err(CalcError::EmptyExpression)
    ));
}

#[test]
fn test_grouping_without_operands() {
    assert_eq!(message("()"), "Syntax error: Missing operand at positions 1-2");
    let err = calculate("(,)", &env()).unwrap_err();
    assert!(matches!(err, CalcError::Syntax { .. }));
    assert_eq!(err.span(), Some(Span::new(0, 3)));
}

#[test]
fn test_bind_non_value() {
    let mut env = env();
    let err = env.bind_variable("y", "(").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Type mismatch for y. Expected type Combinable, but found ("
    );
    assert!(!env.has_variable("y"));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(calculate("x/(x-x)", &env()).unwrap_err(), CalcError::DivisionByZero);
}

#[test]
fn test_function_name_reserved() {
    let mut env = env();
    assert!(matches!(
        env.define_variable("cos"),
        Err(CalcError::NameCollision { .. })
    ));
}
