//! Memory Store Benchmarks
//!
//! Measures the cost of the per-operation connection and transaction:
//! - save (insert and overwrite)
//! - recall
//! - list and search over stores of different sizes

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tempfile::TempDir;

use mnemo_core::MemoryStore;

fn populated_store(entries: usize) -> (TempDir, MemoryStore) {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::open(dir.path().join("bench.db")).unwrap();
    for i in 0..entries {
        store
            .save(&format!("key-{i:05}"), &format!("value number {i} about rust"))
            .unwrap();
    }
    (dir, store)
}

/// Benchmark write operations
fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");

    group.bench_function("overwrite_same_key", |b| {
        let (_dir, store) = populated_store(0);
        b.iter(|| store.save(black_box("key"), black_box("value")).unwrap())
    });

    for size in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("value_size", size), size, |b, &size| {
            let (_dir, store) = populated_store(0);
            let value = "x".repeat(size);
            b.iter(|| store.save("sized", black_box(&value)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark read operations
fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");

    group.bench_function("recall_hit", |b| {
        let (_dir, store) = populated_store(100);
        b.iter(|| store.recall(black_box("key-00050")).unwrap())
    });

    group.bench_function("recall_miss", |b| {
        let (_dir, store) = populated_store(100);
        b.iter(|| store.recall(black_box("absent")).unwrap())
    });

    for count in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("list", count), count, |b, &count| {
            let (_dir, store) = populated_store(count);
            b.iter(|| store.list().unwrap())
        });

        group.bench_with_input(BenchmarkId::new("search", count), count, |b, &count| {
            let (_dir, store) = populated_store(count);
            b.iter(|| store.search(black_box("RUST")).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_save, bench_reads);
criterion_main!(benches);
