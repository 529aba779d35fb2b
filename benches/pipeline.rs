//! Pipeline Benchmark
//!
//! Times each stage separately (lex, postfix, evaluate) and the end-to-end run on
//! polynomial-heavy inputs.

use criterion::{Criterion, criterion_group, criterion_main};
use std::fmt::Write;
use std::hint::black_box;
use symcalc::parser::{normalize, parse, to_postfix, tokenize};
use symcalc::{Environment, OutputMode, calculate, evaluator};

// =============================================================================
// Input Generators
// =============================================================================

/// `(x+1)(x+2)...(x+n)`
fn generate_product(n: usize) -> String {
    let mut s = String::with_capacity(n * 6);
    for i in 1..=n {
        let _ = write!(s, "(x+{i})");
    }
    s
}

/// Sum of `n` mixed monomials in two variables
fn generate_sum(n: usize) -> String {
    let mut s = String::with_capacity(n * 10);
    for i in 1..=n {
        if i > 1 {
            s.push(if i % 2 == 0 { '+' } else { '-' });
        }
        let _ = write!(s, "{i}x^{}y^{}", i % 7, i % 5);
    }
    s
}

fn env() -> Environment {
    let mut env = Environment::new().with_output_mode(OutputMode::Exact);
    let _ = env.define_variable("x");
    let _ = env.define_variable("y");
    env
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_stages(c: &mut Criterion) {
    let env = env();
    let input = generate_sum(200);
    let mut group = c.benchmark_group("stages_sum_200");

    group.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(&input), &env));
    });

    let Ok(tokens) = tokenize(&input, &env) else {
        return;
    };
    group.bench_function("postfix", |b| {
        b.iter(|| to_postfix(normalize(black_box(tokens.clone()))));
    });

    let Ok(postfix) = parse(&input, &env) else {
        return;
    };
    group.bench_function("evaluate", |b| {
        b.iter(|| evaluator::evaluate(black_box(&postfix), &env));
    });

    group.finish();
}

fn bench_expansion(c: &mut Criterion) {
    let env = env();
    let mut group = c.benchmark_group("expansion");

    for n in [4, 8, 16] {
        let input = generate_product(n);
        group.bench_function(format!("product_{n}"), |b| {
            b.iter(|| calculate(black_box(&input), &env));
        });
    }

    group.bench_function("binomial_power_20", |b| {
        b.iter(|| calculate(black_box("(x+y)^20"), &env));
    });

    group.finish();
}

fn bench_division(c: &mut Criterion) {
    let env = env();
    let mut group = c.benchmark_group("division");

    group.bench_function("cancel_common_factor", |b| {
        b.iter(|| calculate(black_box("(x+1)(x+2)(x+3)(x+4)/((x+2)(x+4))"), &env));
    });
    group.bench_function("irreducible_ratio", |b| {
        b.iter(|| calculate(black_box("(x^5+3x+1)/(x^2+x+7)"), &env));
    });

    group.finish();
}

criterion_group!(benches, bench_stages, bench_expansion, bench_division);

criterion_main!(benches);
