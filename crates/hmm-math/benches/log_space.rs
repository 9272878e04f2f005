//! Criterion benchmarks for `hmm-math`.
//!
//! Focus on the reductions that sit in the innermost forward/backward loop.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hmm_math::{log_normal_pdf, log_sum_exp, log_sum_exp_iter};

fn bench_log_sum_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_sum_exp");

    for n_states in [2usize, 8, 32, 128] {
        let values: Vec<f64> = (0..n_states)
            .map(|i| -(i as f64) * 1.7 - 350.0)
            .collect();

        group.bench_with_input(BenchmarkId::new("two_pass", n_states), &values, |b, v| {
            b.iter(|| black_box(log_sum_exp(black_box(v))));
        });

        group.bench_with_input(BenchmarkId::new("streaming", n_states), &values, |b, v| {
            b.iter(|| black_box(log_sum_exp_iter(black_box(v).iter().copied())));
        });
    }

    group.finish();
}

fn bench_densities(c: &mut Criterion) {
    c.bench_function("log_normal_pdf", |b| {
        b.iter(|| {
            black_box(log_normal_pdf(
                black_box(0.37),
                black_box(1.2),
                black_box(0.8),
            ))
        });
    });
}

criterion_group!(benches, bench_log_sum_exp, bench_densities);
criterion_main!(benches);
