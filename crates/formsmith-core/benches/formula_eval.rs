//! Formula evaluation and resolver benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use formsmith_core::derive::resolve_derived;
use formsmith_core::domain::{DerivedConfig, Field, FieldKind, FieldType, ValueSet};
use formsmith_core::expr::{EvalContext, Formula};
use serde_json::json;

fn formula_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula");

    let mut ctx = EvalContext::new();
    ctx.bind("price", 12.5);
    ctx.bind("qty", 4.0);
    ctx.bind("dob", "1990-06-02");

    group.bench_function("parse", |b| {
        b.iter(|| Formula::parse(black_box("price * qty > 40 ? 'bulk' : 'single'")))
    });

    let arithmetic = Formula::parse("price * qty + (price / 2) ^ 2").expect("formula parses");
    group.bench_function("arithmetic", |b| b.iter(|| arithmetic.evaluate(black_box(&ctx))));

    let age = Formula::parse("yearsBetween(toDate(dob), today())").expect("formula parses");
    group.bench_function("age", |b| b.iter(|| age.evaluate(black_box(&ctx))));

    group.finish();
}

fn resolve_scaling_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_derived");

    for size in [10usize, 100, 1000] {
        let mut fields = vec![Field::new("base", "Base", FieldKind::blank(FieldType::Number))];
        fields.extend((0..size).map(|i| {
            Field::new(format!("d{i}"), format!("Derived {i}"), FieldKind::blank(FieldType::Number))
                .with_derived(DerivedConfig::formula(format!("base * {i} + 1")))
        }));
        let values: ValueSet = [("base".to_string(), json!(3))].into_iter().collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| resolve_derived(black_box(&fields), black_box(&values)))
        });
    }

    group.finish();
}

criterion_group!(benches, formula_benchmark, resolve_scaling_benchmark);
criterion_main!(benches);
