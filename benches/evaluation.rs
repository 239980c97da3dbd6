use criterion::{black_box, criterion_group, criterion_main, Criterion};
use equations_rs::{evaluate, Evaluator, VariableTable};
use evalexpr::*;

/// Benchmark simple arithmetic expressions
fn benchmark_simple_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Simple arithmetic Expression Evaluation");

    let expr = "2 + 3 * 4";
    let mut evaluator = Evaluator::default();
    let parsed = evaluator.parse_expression(expr).unwrap();
    let precompiled_evalexpr = build_operator_tree::<DefaultNumericTypes>(expr).unwrap();
    let mut empty = VariableTable::new();

    group.bench_function("uncached_arithmetic", |b| {
        b.iter(|| evaluate(black_box(expr), &mut empty).unwrap())
    });

    group.bench_function("cached_arithmetic", |b| {
        b.iter(|| evaluator.evaluate(black_box(expr), &mut empty).unwrap())
    });

    group.bench_function("preparsed_arithmetic", |b| {
        b.iter(|| evaluator.evaluate_ast(black_box(&parsed), &mut empty).unwrap())
    });

    group.bench_function("native_rust_arithmetic", |b| {
        b.iter(|| black_box(2.0 + 3.0 * 4.0))
    });

    group.bench_function("meval_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(expr)).unwrap())
    });

    group.bench_function("precompiled_evalexpr_arithmetic", |b| {
        b.iter(|| precompiled_evalexpr.eval().unwrap())
    });
}

/// Benchmark complex arithmetic expressions
fn benchmark_complex_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("Complex arithmetic Expression Evaluation");

    let expr = "-3 + (5 / 8 ^ (3 - 2) * 3) * 2";
    let evalexpr_expr = "-3.0 + (5.0 / math::pow(8.0, 3.0 - 2.0) * 3.0) * 2.0";
    let mut evaluator = Evaluator::default();
    let mut empty = VariableTable::new();

    group.bench_function("uncached_complex_arithmetic", |b| {
        b.iter(|| evaluate(black_box(expr), &mut empty).unwrap())
    });

    group.bench_function("cached_complex_arithmetic", |b| {
        b.iter(|| evaluator.evaluate(black_box(expr), &mut empty).unwrap())
    });

    group.bench_function("native_rust_complex_arithmetic", |b| {
        b.iter(|| black_box(-3.0 + (5.0 / 8f64.powf(3.0 - 2.0) * 3.0) * 2.0))
    });

    group.bench_function("meval_complex_arithmetic", |b| {
        b.iter(|| meval::eval_str(black_box(expr)).unwrap())
    });

    group.bench_function("evalexpr_complex_arithmetic", |b| {
        b.iter(|| evalexpr::eval(black_box(evalexpr_expr)).unwrap())
    });
}

fn dependency_chain(length: usize) -> VariableTable {
    let mut table = VariableTable::new();
    table.insert_value("v0", 1.0);
    for i in 1..length {
        table.insert_expression(format!("v{i}"), format!("v{} * 1.01 + 1", i - 1));
    }
    table
}

/// Benchmark variable resolution through a table
fn benchmark_variable_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Variable Resolution");

    let table = dependency_chain(60);
    let mut evaluator = Evaluator::default();

    group.bench_function("resolve_chain_cold", |b| {
        b.iter_batched(
            || table.clone(),
            |mut variables| evaluator.evaluate(black_box("v59 + v30"), &mut variables).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    let mut memoized = table.clone();
    evaluator.evaluate("v59", &mut memoized).unwrap();
    group.bench_function("resolve_chain_memoized", |b| {
        b.iter(|| evaluator.evaluate(black_box("v59 + v30"), &mut memoized).unwrap())
    });

    group.bench_function("evaluate_all_chain", |b| {
        b.iter_batched(
            || table.clone(),
            |mut variables| evaluator.evaluate_all(&mut variables),
            criterion::BatchSize::SmallInput,
        )
    });

    let mut context = meval::Context::new();
    context.var("x", 3.0).var("y", 4.0);
    let mut variables = VariableTable::new();
    variables.insert_value("x", 3.0);
    variables.insert_value("y", 4.0);

    group.bench_function("variables_expression", |b| {
        b.iter(|| evaluator.evaluate(black_box("x * x + y * y"), &mut variables).unwrap())
    });

    group.bench_function("meval_variables_expression", |b| {
        b.iter(|| meval::eval_str_with_context(black_box("x * x + y * y"), &context).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_simple_arithmetic,
    benchmark_complex_arithmetic,
    benchmark_variable_resolution
);
criterion_main!(benches);
