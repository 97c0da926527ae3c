use coedit_core::buffer::PieceTable;
use coedit_core::engine::{transform, ServerTextEngine};
use coedit_core::ops::{Delete, Insert, TextOperation};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark sequential typing at the end (fast path)
fn bench_sequential_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("piece_table_sequential_typing");

    for size in [10, 100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut table = PieceTable::new();
                for i in 0..size {
                    table.insert("a", i);
                }
                black_box(table.len());
            });
        });
    }

    group.finish();
}

/// Benchmark typing in the middle (splits a piece every time)
fn bench_middle_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("piece_table_middle_typing");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut table = PieceTable::new();
                table.read_str(&"x".repeat(1000));
                for i in 0..size {
                    table.insert("a", 500 + i);
                }
                black_box(table.len());
            });
        });
    }

    group.finish();
}

/// Benchmark deletes across many pieces
fn bench_remove(c: &mut Criterion) {
    c.bench_function("piece_table_remove_across_pieces", |b| {
        b.iter_batched(
            || {
                let mut table = PieceTable::new();
                table.read_str(&"x".repeat(1000));
                for i in 0..100 {
                    table.insert("ab", i * 10);
                }
                table
            },
            |mut table| {
                table.remove(10, 900);
                black_box(table.text());
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark getText on a fragmented document
fn bench_text(c: &mut Criterion) {
    let mut table = PieceTable::new();
    table.read_str(&"x".repeat(10000));
    for i in 0..1000 {
        table.insert("ab", i * 10);
    }

    c.bench_function("piece_table_text_1000_pieces", |b| {
        b.iter(|| black_box(table.text()));
    });
}

/// Benchmark the transform primitive over every type pair
fn bench_transform(c: &mut Criterion) {
    let insert_a: TextOperation = Insert::new("hello", 10, "c1").into();
    let insert_b: TextOperation = Insert::new("world", 10, "c2").into();
    let delete_a: TextOperation = Delete::new(5, 10, "c1").into();
    let delete_b: TextOperation = Delete::new(8, 10, "c2").into();

    c.bench_function("transform_all_pairs", |b| {
        b.iter(|| {
            black_box(transform(&insert_a, &insert_b));
            black_box(transform(&insert_a, &delete_b));
            black_box(transform(&delete_a, &insert_b));
            black_box(transform(&delete_a, &delete_b));
        });
    });
}

/// Benchmark server reconciliation against a growing history
fn bench_server_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("server_reconcile_stale_op");

    for history in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(history), history, |b, &history| {
            b.iter_batched(
                || {
                    let mut server = ServerTextEngine::new();
                    for i in 0..history {
                        let op = Insert::new("a", 0, "c1").with_version(i as u64);
                        server.process_incoming_operation(op.into());
                    }
                    server
                },
                |mut server| {
                    // Computed at version 0: transformed against the whole history
                    let stale = Insert::new("z", 0, "c2").with_version(0);
                    black_box(server.process_incoming_operation(stale.into()));
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_typing,
    bench_middle_typing,
    bench_remove,
    bench_text,
    bench_transform,
    bench_server_history
);
criterion_main!(benches);
