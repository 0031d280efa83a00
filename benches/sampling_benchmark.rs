use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vaycay_sampler::{
    ranking::{Ranker, WeightRanker},
    sampling::{filter_pool, sample_pool},
    Bounds, Candidate, QueryParameters, QuotaTable,
};

fn create_test_pool(categories: usize, per_category: usize) -> Vec<Candidate<()>> {
    let mut pool = Vec::with_capacity(categories * per_category);
    for c in 0..categories {
        for i in 0..per_category {
            let lat = -80.0 + (c as f64 * 0.9) % 160.0;
            let long = -179.0 + (i as f64 * 1.7) % 358.0;
            let weight = if i % 7 == 0 { None } else { Some(((c * 31 + i * 17) % 10_000) as f64) };
            pool.push(Candidate::new(
                format!("{}-{}", c, i),
                format!("country-{}", c),
                weight,
                lat,
                long,
                (),
            ));
        }
    }
    pool
}

fn bench_sample_pool(c: &mut Criterion) {
    let table = QuotaTable::default();
    let ranker = WeightRanker::new();
    let mut group = c.benchmark_group("sample_pool");

    for &(categories, per_category) in &[(10, 100), (150, 200)] {
        let pool = create_test_pool(categories, per_category);
        let global = QueryParameters::global("2020-01-15", 300);
        let europe = QueryParameters::in_bounds("2020-01-15", Bounds::new(35.0, 70.0, -10.0, 40.0), 0.1, 300);

        group.bench_with_input(BenchmarkId::new("global", pool.len()), &pool, |b, pool| {
            b.iter(|| black_box(sample_pool(pool, &global, &table, &ranker)));
        });

        group.bench_with_input(BenchmarkId::new("bounds", pool.len()), &pool, |b, pool| {
            b.iter(|| black_box(sample_pool(pool, &europe, &table, &ranker)));
        });
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let pool = create_test_pool(150, 200);
    let bounds = Bounds::new(-20.0, 20.0, -60.0, 60.0);
    let ranker = WeightRanker::new();

    c.bench_function("filter_pool_30k", |b| {
        b.iter(|| black_box(filter_pool(&pool, Some(&bounds), 0.1).len()));
    });

    let all: Vec<&Candidate<()>> = pool.iter().collect();
    c.bench_function("weight_rank_30k", |b| {
        b.iter(|| black_box(ranker.rank(&all).len()));
    });
}

criterion_group!(benches, bench_sample_pool, bench_stages);
criterion_main!(benches);
