//! Whole-pipeline checks: input text to canonical result and markup

use crate::{Environment, OutputMode, calculate, evaluate_str};

fn env() -> Environment {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = Environment::new().with_output_mode(OutputMode::Exact);
    env.define_variable("x").unwrap();
    env.define_variable("s").unwrap();
    env
}

fn eval(input: &str) -> String {
    evaluate_str(input, &env()).unwrap().to_string()
}

#[test]
fn test_single_operand() {
    assert_eq!(eval("1"), "1");
    assert_eq!(eval("x"), "x");
    assert_eq!(eval("(x)"), "x");
}

#[test]
fn test_like_terms_combine() {
    assert_eq!(eval("5xxx+5xxx"), "10x^3");
    assert_eq!(eval("xxxxx"), "x^5");
    assert_eq!(eval("(x+x)(s+s)"), "4sx");
}

#[test]
fn test_products_expand() {
    assert_eq!(eval("(1+x)(1+x)(1+x)"), "x^3+3x^2+3x+1");
    assert_eq!(eval("(1+x)(1-x)"), "-x^2+1");
    assert_eq!(eval("(1-1)(x^2+1)"), "0");
}

#[test]
fn test_canonical_order() {
    assert_eq!(eval("x+s"), "s+x");
    assert_eq!(eval("5x^4s^3"), "5s^3x^4");
}

#[test]
fn test_unary_minus() {
    assert_eq!(eval("1--x"), "x+1");
    assert_eq!(eval("-x-x"), "-2x");
}

#[test]
fn test_division_cancels() {
    assert_eq!(eval("(x+1)(x+1)(x+1)/(x+1)"), "x^2+2x+1");
    assert_eq!(eval("(x^5+1)/(x+1)"), "x^4-x^3+x^2-x+1");
}

#[test]
fn test_numeric_base_power() {
    assert_eq!(eval("(8^2)^x"), "64^x");
}

#[test]
fn test_postfix_order() {
    let calc = calculate("5+7-8*9^5^7-3", &env()).unwrap();
    assert_eq!(calc.postfix_string(), "5 7 + 8 9 5 7 ^ ^ * - 3 -");
    // 8*9^78125 has 74552 digits
    let value = calc.result.to_string();
    assert!(value.starts_with('-'));
    assert_eq!(value.len(), 74553);
}

#[test]
fn test_numeric_powers_are_exact() {
    assert_eq!(eval("9^5^2"), "717897987691852588770249");
    assert_eq!(eval("2^-2"), "1/4");
    assert_eq!(eval("(2/3)^3"), "8/27");
}

#[test]
fn test_division_cap() {
    let env = env().with_max_division_iterations(2);
    let dividend = evaluate_str("x^5+1", &env).unwrap();
    let divisor = evaluate_str("x+1", &env).unwrap();
    let dividend = dividend.polynomial().unwrap().expanded();
    let divisor = divisor.polynomial().unwrap().expanded();
    let division = dividend.divide_and_remainder(divisor, &env).unwrap();
    assert!(division.exhausted);
    assert!(division.quotient.is_zero());
    assert_eq!(&division.remainder, dividend);
}

#[test]
fn test_markup() {
    let calc = calculate("(x+1)/2", &env()).unwrap();
    assert_eq!(calc.input_markup, "\\frac{x+1}{2}");
    assert_eq!(calc.result_markup(), "\\frac{1}{2}x+\\frac{1}{2}");
}

#[test]
fn test_bound_variable_substitutes() {
    let mut env = env();
    env.define_variable("y").unwrap();
    env.bind_variable("y", "x+1").unwrap();
    assert_eq!(evaluate_str("y^2", &env).unwrap().to_string(), "x^2+2x+1");
}

#[test]
fn test_approximate_mode_rounds() {
    let env = Environment::new();
    assert_eq!(evaluate_str("1/4", &env).unwrap().to_string(), "0.25");
    let exact = env.with_output_mode(OutputMode::Exact);
    assert_eq!(evaluate_str("1/3", &exact).unwrap().to_string(), "1/3");
}
