//! Criterion benchmarks for the engine entry points.
//!
//! Observations come from a seeded simulation so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hmm_core::distributions::Normal;
use hmm_core::{decode, fit, forward_backward, simulate, FitConfig, Hmm};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// K-state chain with means spread 5 apart and a sticky diagonal.
fn banded_model(k: usize) -> Hmm<Normal> {
    let stay = 0.9;
    let transition = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    if k == 1 {
                        1.0
                    } else if i == j {
                        stay
                    } else {
                        (1.0 - stay) / (k - 1) as f64
                    }
                })
                .collect()
        })
        .collect();
    let emissions = (0..k)
        .map(|i| Normal::new(5.0 * i as f64, 1.0).unwrap())
        .collect();
    Hmm::with_uniform_initial(transition, emissions).unwrap()
}

fn observations(hmm: &Hmm<Normal>, length: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    simulate(hmm, length, None, &mut rng).unwrap().observations
}

fn bench_forward_backward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_backward");
    for k in [2usize, 4, 8] {
        let hmm = banded_model(k);
        let obs = observations(&hmm, 1_000);
        group.bench_with_input(BenchmarkId::new("states", k), &obs, |b, obs| {
            b.iter(|| black_box(forward_backward(&hmm, black_box(obs)).unwrap()));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("viterbi");
    for length in [250usize, 2_500] {
        let hmm = banded_model(4);
        let obs = observations(&hmm, length);
        group.bench_with_input(BenchmarkId::new("length", length), &obs, |b, obs| {
            b.iter(|| black_box(decode(&hmm, black_box(obs)).unwrap()));
        });
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let truth = banded_model(2);
    let obs = observations(&truth, 250);
    let start = Hmm::with_uniform_initial(
        vec![vec![0.7, 0.3], vec![0.4, 0.6]],
        vec![Normal::new(1.5, 2.0).unwrap(), Normal::new(4.0, 2.0).unwrap()],
    )
    .unwrap();
    let config = FitConfig::new(20, 0.0);

    c.bench_function("baum_welch_20_iterations", |b| {
        b.iter(|| black_box(fit(&start, black_box(&obs), &config).unwrap()));
    });
}

criterion_group!(benches, bench_forward_backward, bench_decode, bench_fit);
criterion_main!(benches);
