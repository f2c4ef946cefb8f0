//! Filter compile and evaluation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynq_bench::fixtures::{generate_users, user_entity, user_schema, user_to_row, Scale};
use dynq_core::{compile, Row};
use dynq_proto::{Criterion as Term, Operator, Value};

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/compile");
    let entity = user_entity();

    for count in [1usize, 4, 16] {
        let criteria: Vec<Term> = (0..count)
            .map(|i| match i % 4 {
                0 => Term::starts_with("name", "Alice"),
                1 => Term::ge("age", 30),
                2 => Term::contains("tags", "ops"),
                _ => Term::is_null_or_white_space("nickname"),
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("criteria", count), &criteria, |b, criteria| {
            b.iter(|| black_box(compile(&entity, criteria).unwrap()));
        });
    }

    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/operator");

    let entity = user_entity();
    let rows: Vec<Row> = generate_users(Scale::Medium.count()).iter().map(user_to_row).collect();
    group.throughput(Throughput::Elements(rows.len() as u64));

    let cases = [
        ("eq_string", Term::eq("status", "active")),
        ("eq_int32", Term::eq("age", 30)),
        ("gt_int32", Term::gt("age", 50)),
        ("starts_with", Term::starts_with("name", "Alice")),
        ("ends_with", Term::ends_with("email", "@example0.com")),
        ("contains", Term::contains("name", "_1")),
        ("like", Term::like("email", "example3")),
        ("not_like", Term::new("email", Operator::NotLike, "example3")),
        ("array_contains", Term::contains("tags", "ops")),
        ("null_or_white_space", Term::is_null_or_white_space("nickname")),
    ];

    for (name, criterion) in cases {
        let predicate = compile(&entity, &[criterion]).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| black_box(predicate.filter(&rows).count()));
        });
    }

    group.finish();
}

fn bench_rows_vs_structs(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/record");

    let users = generate_users(Scale::Medium.count());
    let rows: Vec<Row> = users.iter().map(user_to_row).collect();
    let criteria = [Term::starts_with("name", "Alice"), Term::ge("age", 30)];
    group.throughput(Throughput::Elements(users.len() as u64));

    let row_predicate = compile(&user_entity(), &criteria).unwrap();
    group.bench_function("row", |b| {
        b.iter(|| black_box(row_predicate.filter(&rows).count()));
    });

    let struct_predicate = compile(&user_schema(), &criteria).unwrap();
    group.bench_function("struct", |b| {
        b.iter(|| black_box(struct_predicate.filter(&users).count()));
    });

    let age_only = compile(&user_schema(), &[Term::ge("age", 30)]).unwrap();
    group.bench_function("struct_age_only", |b| {
        b.iter(|| black_box(age_only.filter(&users).count()));
    });

    group.finish();
}

fn bench_conjunction_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter/conjunction");

    let entity = user_entity();
    let rows: Vec<Row> = generate_users(Scale::Medium.count()).iter().map(user_to_row).collect();
    group.throughput(Throughput::Elements(rows.len() as u64));

    for width in [1usize, 2, 4, 8] {
        // every term passes, so no short-circuit
        let criteria: Vec<Term> = (0..width).map(|_| Term::ge("age", 0)).collect();
        let predicate = compile(&entity, &criteria).unwrap();

        group.bench_with_input(BenchmarkId::new("terms", width), &predicate, |b, predicate| {
            b.iter(|| black_box(predicate.filter(&rows).count()));
        });
    }

    let missing = [Term::eq("nickname", Value::Null), Term::starts_with("name", "Alice")];
    let predicate = compile(&entity, &missing).unwrap();
    group.bench_function("null_first", |b| {
        b.iter(|| black_box(predicate.filter(&rows).count()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_operators,
    bench_rows_vs_structs,
    bench_conjunction_width
);
criterion_main!(benches);
