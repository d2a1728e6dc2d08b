//! Criterion microbenches for the contour side: scan-line profiling at the
//! default and a dense slice count, the full symmetrizer, and simplification
//! of a noisy trace.

use std::f64::consts::TAU;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mountform::contour::{
    relative_epsilon, scan_profile, simplify_closed, symmetrize, Contour, SymmetrizeCfg,
};
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Wobbly closed trace with `n` points, like a hand-drawn outline.
fn noisy_trace(n: usize, seed: u64) -> Contour {
    let mut rng = StdRng::seed_from_u64(seed);
    Contour::new(
        (0..n)
            .map(|k| {
                let t = TAU * k as f64 / n as f64;
                let r = 40.0 + 8.0 * (3.0 * t).sin() + rng.gen_range(-0.3..0.3);
                Vector2::new(300.0 + r * t.cos(), 200.0 + 1.4 * r * t.sin())
            })
            .collect(),
    )
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let trace = noisy_trace(2000, 7);
    for slices in [200usize, 2000] {
        group.bench_function(BenchmarkId::new("scan_profile", slices), |b| {
            b.iter(|| scan_profile(&trace, slices))
        });
    }
    group.bench_function(BenchmarkId::new("symmetrize", 200), |b| {
        let cfg = SymmetrizeCfg::default();
        b.iter(|| symmetrize(trace.clone(), &cfg))
    });
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");
    for n in [500usize, 5000] {
        let trace = noisy_trace(n, 11);
        let eps = relative_epsilon(&trace, 0.001);
        group.bench_function(BenchmarkId::new("simplify_closed", n), |b| {
            b.iter(|| simplify_closed(&trace, eps))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scan, bench_simplify);
criterion_main!(benches);
