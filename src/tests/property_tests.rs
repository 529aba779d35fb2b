//! Property-based checks over generated expressions
//!
//! Exponents are kept to small literals so generated inputs stay cheap to expand.
//! Read-back properties cover plain polynomials, symbolic forms and decimals.

use num_bigint::BigInt;
use num_integer::Integer;
use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{Combinable, Environment, Monomial, Number, OutputMode, Symbol, evaluate_str};

fn env() -> Environment {
    let mut env = Environment::new().with_output_mode(OutputMode::Exact);
    env.define_variable("x").unwrap();
    env.define_variable("y").unwrap();
    env
}

fn gen_expr(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        return match u8::arbitrary(g) % 4 {
            0 => (u8::arbitrary(g) % 10).to_string(),
            1 => "x".to_string(),
            2 => "y".to_string(),
            _ => "2".to_string(),
        };
    }
    match u8::arbitrary(g) % 8 {
        0..=3 => {
            let ops = ["+", "-", "*", "/"];
            let op = ops[usize::arbitrary(g) % ops.len()];
            let left = gen_expr(g, depth - 1);
            let right = gen_expr(g, depth - 1);
            format!("({left}{op}{right})")
        }
        4 => {
            let base = gen_expr(g, depth - 1);
            format!("{base}^{}", u8::arbitrary(g) % 3)
        }
        5 => format!("sin({})", gen_expr(g, depth - 1)),
        6 => format!("-{}", gen_expr(g, depth - 1)),
        _ => gen_expr(g, depth - 1),
    }
}

/// Sums and products of small powers only, so the rendered form stays readable input
fn gen_polynomial(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        return match u8::arbitrary(g) % 3 {
            0 => (u8::arbitrary(g) % 6).to_string(),
            1 => "x".to_string(),
            _ => "y".to_string(),
        };
    }
    let left = gen_polynomial(g, depth - 1);
    let right = gen_polynomial(g, depth - 1);
    match u8::arbitrary(g) % 4 {
        0 => format!("({left}+{right})"),
        1 => format!("({left}-{right})"),
        2 => format!("({left})({right})"),
        _ => format!("({left})^{}", u8::arbitrary(g) % 3),
    }
}

/// Values outside plain polynomials: quotients, symbolic and fractional exponents,
/// unexpanded factors and function terms
fn gen_canonical(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        let n = u8::arbitrary(g) % 4 + 1;
        return match u8::arbitrary(g) % 10 {
            0 => n.to_string(),
            1 => "x".to_string(),
            2 => "x^y".to_string(),
            3 => format!("{}^({n}x)", n + 1),
            4 => "x^(1/2)".to_string(),
            5 => format!("sin(x+{n})"),
            6 => "cos(y)".to_string(),
            7 => format!("(x+{n})^(1/2)"),
            8 => format!("(x+{n})/(y+{})", n + 1),
            _ => format!("{n}/(x^2+{n}x)"),
        };
    }
    let ops = ["+", "-", "*", "/"];
    let op = ops[usize::arbitrary(g) % ops.len()];
    let left = gen_canonical(g, depth - 1);
    let right = gen_canonical(g, depth - 1);
    format!("({left}){op}({right})")
}

/// Polynomials with one-digit decimal coefficients, read in approximate mode
fn gen_decimal(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        return match u8::arbitrary(g) % 3 {
            0 => format!("{}.{}", u8::arbitrary(g) % 4, u8::arbitrary(g) % 10),
            1 => "x".to_string(),
            _ => "y".to_string(),
        };
    }
    let left = gen_decimal(g, depth - 1);
    let right = gen_decimal(g, depth - 1);
    match u8::arbitrary(g) % 4 {
        0 => format!("({left}+{right})"),
        1 => format!("({left}-{right})"),
        2 => format!("({left})({right})"),
        _ => format!("({left})^{}", u8::arbitrary(g) % 3),
    }
}

#[derive(Clone, Debug)]
struct Expression(String);

#[derive(Clone, Debug)]
struct CanonicalInput(String);

#[derive(Clone, Debug)]
struct DecimalInput(String);

impl Arbitrary for CanonicalInput {
    fn arbitrary(g: &mut Gen) -> Self {
        CanonicalInput(gen_canonical(g, g.size().min(2)))
    }
}

impl Arbitrary for DecimalInput {
    fn arbitrary(g: &mut Gen) -> Self {
        DecimalInput(gen_decimal(g, g.size().min(3)))
    }
}

#[derive(Clone, Debug)]
struct PolynomialInput(String);

impl Arbitrary for PolynomialInput {
    fn arbitrary(g: &mut Gen) -> Self {
        PolynomialInput(gen_polynomial(g, g.size().min(3)))
    }
}

impl Arbitrary for Expression {
    fn arbitrary(g: &mut Gen) -> Self {
        Expression(gen_expr(g, g.size().min(3)))
    }
}

#[test]
fn test_pipeline_never_panics() {
    fn prop(expr: Expression) -> bool {
        let _ = evaluate_str(&expr.0, &env());
        true
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Expression) -> bool);
}

#[test]
fn test_integer_arithmetic_matches() {
    fn prop(a: i16, b: i16, c: i16) -> bool {
        let (a, b, c) = (i64::from(a), i64::from(b), i64::from(c));
        let value = evaluate_str(&format!("{a}+{b}*{c}"), &env()).unwrap();
        value.as_number() == Some(Number::from_integer(a + b * c))
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i16, i16, i16) -> bool);
}

#[test]
fn test_product_commutes() {
    fn prop(a: i8, b: i8) -> bool {
        let env = env();
        let left = evaluate_str(&format!("(x+{a})(y+{b})"), &env).unwrap();
        let right = evaluate_str(&format!("(y+{b})(x+{a})"), &env).unwrap();
        left == right
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i8, i8) -> bool);
}

#[test]
fn test_division_undoes_product() {
    fn prop(a: i8, b: i8) -> bool {
        let env = env();
        let quotient = evaluate_str(&format!("(x+{a})(x+{b})/(x+{b})"), &env).unwrap();
        let factor = evaluate_str(&format!("x+{a}"), &env).unwrap();
        quotient == factor
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i8, i8) -> bool);
}

#[test]
fn test_fraction_invariants() {
    fn prop(a: i32, b: i32, c: i32, d: i32) -> TestResult {
        if b == 0 || d == 0 {
            return TestResult::discard();
        }
        let p = Number::fraction(i64::from(a), i64::from(b)).unwrap();
        let q = Number::fraction(i64::from(c), i64::from(d)).unwrap();
        let reduced = p.numer().gcd(p.denom()) == BigInt::from(1) || p.is_zero();
        let positive = *p.denom() > BigInt::from(0);
        TestResult::from_bool(reduced && positive && p.add(&q).sub(&q) == p)
    }
    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(i32, i32, i32, i32) -> TestResult);
}

#[test]
fn test_disjoint_monomials_commute() {
    fn prop(a: i8, p: u8, b: i8, q: u8) -> bool {
        let env = env();
        let power = |name: &str, n: u8, coefficient: i8| {
            Monomial::symbol(Symbol::variable(name))
                .exponentiate(&Combinable::number(Number::from_integer(i64::from(n % 5))), &env)
                .unwrap()
                .scale(&Number::from_integer(i64::from(coefficient)))
        };
        let m1 = power("x", p, a);
        let m2 = power("y", q, b);
        m1.multiply(&m2, &env).unwrap() == m2.multiply(&m1, &env).unwrap()
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i8, u8, i8, u8) -> bool);
}

#[test]
fn test_rendered_form_reads_back() {
    fn prop(input: PolynomialInput) -> bool {
        let env = env();
        let value = evaluate_str(&input.0, &env).unwrap();
        let again = evaluate_str(&value.to_string(), &env).unwrap();
        again == value
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(PolynomialInput) -> bool);
}

/// Inputs the value model rejects (unlike unexpanded sums, division by zero) are
/// discarded; anything that evaluates must render to text that evaluates back to it
fn reads_back(input: &str, env: &Environment) -> TestResult {
    let Ok(value) = evaluate_str(input, env) else {
        return TestResult::discard();
    };
    let rendered = value.to_string();
    match evaluate_str(&rendered, env) {
        Ok(again) => TestResult::from_bool(again == value && again.to_string() == rendered),
        Err(_) => TestResult::failed(),
    }
}

#[test]
fn test_symbolic_forms_read_back() {
    fn prop(input: CanonicalInput) -> TestResult {
        reads_back(&input.0, &env())
    }
    QuickCheck::new()
        .tests(150)
        .quickcheck(prop as fn(CanonicalInput) -> TestResult);
}

#[test]
fn test_decimal_forms_read_back() {
    fn prop(input: DecimalInput) -> TestResult {
        let mut env = Environment::new().with_output_mode(OutputMode::Approximate);
        env.define_variable("x").unwrap();
        env.define_variable("y").unwrap();
        reads_back(&input.0, &env)
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(DecimalInput) -> TestResult);
}

#[test]
fn test_known_symbolic_forms_read_back() {
    let env = env();
    for input in [
        "(2x+3)/(x^2+3x+2)",
        "(1/x)sin(x)",
        "2^(2x)",
        "x^y*x",
        "(x+1)^(1/2)/(x+1)",
        "sin(x)+(x+1)/(x+2)",
    ] {
        assert!(!reads_back(input, &env).is_failure(), "{input}");
    }
}
