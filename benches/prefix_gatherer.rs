//! Prefixing gatherer benchmarks

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use prometheus::{IntCounterVec, Opts, Registry};
use promgate::metrics::{
    Gatherer, MetricFamily, MetricType, PrefixingGatherer, ReservedPrefixes, Sample,
    StaticGatherer,
};

fn snapshot(size: usize) -> Vec<MetricFamily> {
    (0..size)
        .map(|i| {
            // Half already namespaced, half foreign
            let name = if i % 2 == 0 {
                format!("grafana_family_{}", i)
            } else {
                format!("apiserver_family_{}", i)
            };
            MetricFamily::new(name, "bench", MetricType::Counter)
                .with_sample(Sample::new(i as f64).with_label("instance", "a"))
        })
        .collect()
}

// ============== Static snapshot ==============

fn bench_static_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_gatherer/static");

    for size in [10, 100, 1000] {
        let gatherer =
            PrefixingGatherer::new(StaticGatherer::new(snapshot(size)), ReservedPrefixes::default());
        group.bench_with_input(BenchmarkId::from_parameter(size), &gatherer, |b, g| {
            b.iter(|| g.gather().unwrap());
        });
    }

    group.finish();
}

// ============== Live registry ==============

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_gatherer/registry");

    let registry = Registry::new();
    for i in 0..50 {
        let counter = IntCounterVec::new(
            Opts::new(format!("subsystem_{}_requests_total", i), "bench"),
            &["code"],
        )
        .unwrap();
        counter.with_label_values(&["200"]).inc();
        counter.with_label_values(&["500"]).inc();
        registry.register(Box::new(counter)).unwrap();
    }

    let plain = registry.clone();
    group.bench_function("unwrapped", |b| {
        b.iter(|| Gatherer::gather(&plain).unwrap());
    });

    let prefixing = PrefixingGatherer::new(registry, ReservedPrefixes::default());
    group.bench_function("prefixing", |b| {
        b.iter(|| prefixing.gather().unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_static_snapshot, bench_registry);
criterion_main!(benches);
