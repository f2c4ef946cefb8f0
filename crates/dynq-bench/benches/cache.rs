//! Predicate cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dynq_bench::fixtures::user_entity;
use dynq_core::{compile, PredicateCache, PredicateFingerprint};
use dynq_proto::Criterion as Term;

fn criteria() -> Vec<Term> {
    vec![
        Term::starts_with("name", "Alice"),
        Term::ge("age", 30),
        Term::le("age", 50),
        Term::contains("tags", "ops"),
        Term::is_null_or_white_space("nickname"),
    ]
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/fingerprint");
    let criteria = criteria();

    group.bench_function("one_criterion", |b| {
        b.iter(|| black_box(PredicateFingerprint::new("User", &criteria[..1])));
    });

    group.bench_function("five_criteria", |b| {
        b.iter(|| black_box(PredicateFingerprint::new("User", &criteria)));
    });

    group.finish();
}

fn bench_cache_hit_vs_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache/lookup");
    let entity = user_entity();
    let criteria = criteria();

    group.bench_function("compile", |b| {
        b.iter(|| black_box(compile(&entity, &criteria).unwrap()));
    });

    let cache = PredicateCache::with_capacity(&entity, 64);
    cache.get_or_compile(&criteria).unwrap();
    group.bench_function("hit", |b| {
        b.iter(|| black_box(cache.get_or_compile(&criteria).unwrap()));
    });

    let churn = PredicateCache::with_capacity(&entity, 8);
    let mut next = 0i32;
    group.bench_function("miss_with_eviction", |b| {
        b.iter(|| {
            next = next.wrapping_add(1);
            let criteria = [Term::eq("age", next)];
            black_box(churn.get_or_compile(&criteria).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_cache_hit_vs_compile);
criterion_main!(benches);
