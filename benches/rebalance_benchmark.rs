use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stock_rebalancer::core::config::RebalanceConfig;
use stock_rebalancer::optimization::pipeline::RebalanceEngine;
use stock_rebalancer::simulation::snapshot_generator::{generate_snapshot, SnapshotConfig};

fn bench_rebalance_5_locations(c: &mut Criterion) {
    let config = SnapshotConfig {
        location_count: 5,
        product_count: 500,
        seed: Some(1),
        ..Default::default()
    };
    let snapshot = generate_snapshot(&config);
    let engine = RebalanceEngine::default();

    c.bench_function("rebalance_5_locations_500_products", |b| {
        b.iter(|| engine.run(black_box(&snapshot)))
    });
}

fn bench_rebalance_20_locations(c: &mut Criterion) {
    let config = SnapshotConfig {
        location_count: 20,
        product_count: 5_000,
        seed: Some(2),
        ..Default::default()
    };
    let snapshot = generate_snapshot(&config);
    let engine = RebalanceEngine::default();

    c.bench_function("rebalance_20_locations_5000_products", |b| {
        b.iter(|| engine.run(black_box(&snapshot)))
    });
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let config = SnapshotConfig {
        location_count: 40,
        product_count: 20_000,
        seed: Some(3),
        ..Default::default()
    };
    let snapshot = generate_snapshot(&config);
    let parallel = RebalanceEngine::default();
    let sequential = RebalanceEngine::new(RebalanceConfig::default().sequential());

    let mut group = c.benchmark_group("rebalance_40_locations_20000_products");
    group.sample_size(10);
    group.bench_function("parallel", |b| b.iter(|| parallel.run(black_box(&snapshot))));
    group.bench_function("sequential", |b| {
        b.iter(|| sequential.run(black_box(&snapshot)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rebalance_5_locations,
    bench_rebalance_20_locations,
    bench_parallel_vs_sequential
);
criterion_main!(benches);
