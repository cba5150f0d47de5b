use criterion::*;
use std::hint::black_box;

mod common;
use common::*;

fn iterate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    group.bench_function("for_each_write_wealth_1M", |b| {
        b.iter_batched(
            || populate(ROWS_LARGE),
            |mut agents| {
                agents.for_each::<(Wealth,), _>(|w| {
                    w.value *= 1.0001;
                });
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("for_each_read_productivity_1M", |b| {
        b.iter_batched(
            || populate(ROWS_LARGE),
            |agents| {
                let mut total = 0.0f32;
                agents.for_each_read::<(Productivity,), _>(|p| {
                    total += p.rate;
                });
                black_box(total);
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("for_each_read_write_prod_to_wealth_1M", |b| {
        b.iter_batched(
            || populate(ROWS_LARGE),
            |mut agents| {
                agents.for_each::<(Productivity, Wealth), _>(|(p, w)| {
                    w.value += p.rate;
                });
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("subset_iter_positions_1M", |b| {
        b.iter_batched(
            || populate(ROWS_LARGE),
            |agents| {
                let mut sum = 0.0f32;
                for position in agents.iter::<(Position,)>() {
                    sum += position.x + position.y;
                }
                black_box(sum);
                black_box(agents);
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
