//! Formatter cache get/set throughput benchmark.
//!
//! Measures cache-key hashing plus lookup/insert cost at a few occupancy
//! levels, and the cost of the oldest-eviction path once at capacity.

use agentgate_core::formatters::{FormatRequest, FormatResult, FormatterCache};
use agentgate_core::types::FormatterCacheConfig;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

fn cache(max_size: usize) -> FormatterCache {
    FormatterCache::new(FormatterCacheConfig {
        max_size,
        ttl: Duration::from_secs(3600),
        cleanup_freq: Duration::from_secs(3600),
    })
}

fn request(i: usize) -> FormatRequest {
    FormatRequest::new(format!("content body number {i}\n")).with_language("python").with_file_path(format!("file_{i}.py"))
}

fn bench_set(c: &mut Criterion) {
    let sizes: &[usize] = &[100, 1_000, 10_000];
    let mut group = c.benchmark_group("cache_set");
    for &max_size in sizes {
        group.bench_with_input(BenchmarkId::from_parameter(max_size), &max_size, |b, &max_size| {
            let cache = cache(max_size);
            let mut i = 0usize;
            b.iter(|| {
                let req = request(black_box(i));
                cache.set(&req, FormatResult::success(req.content.clone(), true, Duration::from_millis(1)));
                i += 1;
            });
        });
    }
    group.finish();
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("cache_get_hit", |b| {
        let cache = cache(1_000);
        let req = request(42);
        cache.set(&req, FormatResult::success("formatted".to_string(), true, Duration::from_millis(1)));
        b.iter(|| black_box(cache.get(&req)));
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("cache_get_miss", |b| {
        let cache = cache(1_000);
        let req = request(0);
        b.iter(|| black_box(cache.get(&req)));
    });
}

fn bench_set_at_capacity_evicts(c: &mut Criterion) {
    c.bench_function("cache_set_at_capacity_eviction", |b| {
        let cache = cache(64);
        for i in 0..64 {
            cache.set(&request(i), FormatResult::success("x".to_string(), true, Duration::from_millis(1)));
        }
        let mut i = 64usize;
        b.iter(|| {
            let req = request(black_box(i));
            cache.set(&req, FormatResult::success("x".to_string(), true, Duration::from_millis(1)));
            i += 1;
        });
    });
}

criterion_group!(benches, bench_set, bench_get_hit, bench_get_miss, bench_set_at_capacity_evicts);
criterion_main!(benches);
