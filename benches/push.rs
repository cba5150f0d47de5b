use criterion::*;
use std::hint::black_box;

mod common;
use common::*;

fn push_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");

    group.bench_function("push_back_reserved_100k", |b| {
        b.iter_batched(
            || Agents::with_capacity(ROWS_MED),
            |mut agents| {
                for i in 0..ROWS_MED {
                    agents.push_back((
                        Position {
                            x: i as f32,
                            y: 0.0,
                        },
                        Wealth { value: 100.0 },
                        Productivity { rate: 1.0 },
                    ));
                }
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    // Exact growth makes unreserved appends quadratic; keep the row count
    // small enough for the harness.
    group.bench_function("push_back_unreserved_10k", |b| {
        b.iter_batched(
            Agents::new,
            |mut agents| {
                for i in 0..ROWS_SMALL {
                    agents.push_back((
                        Position {
                            x: i as f32,
                            y: 0.0,
                        },
                        Wealth { value: 100.0 },
                        Productivity { rate: 1.0 },
                    ));
                }
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("swap_remove_half_100k", |b| {
        b.iter_batched(
            || populate(ROWS_MED),
            |mut agents| {
                for _ in 0..ROWS_MED / 2 {
                    agents.remove_at_swap(0, 1, false);
                }
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, push_benchmark);
criterion_main!(benches);
