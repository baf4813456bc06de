use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orbit_env::sgp4::solve_kepler_equation;

/// Uniform random in [0, 2π)
#[inline]
fn rand_angle(rng: &mut StdRng) -> f64 {
    rng.random::<f64>() * std::f64::consts::TAU
}

/// Eccentricity vector components (e cos ω, e sin ω) and a mean longitude.
fn make_cases(rng: &mut StdRng, samples: usize, e_min: f64, e_max: f64) -> Vec<(f64, f64, f64)> {
    (0..samples)
        .map(|_| {
            let e = if e_max > e_min {
                rng.random_range(e_min..e_max)
            } else {
                e_min
            };
            let w = rand_angle(rng);
            (rand_angle(rng), e * w.cos(), e * w.sin())
        })
        .collect()
}

/// Near-Earth regime: e ∈ [0, 0.1)
fn bench_low_e(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);

    c.bench_function("solve_kepler_equation/low_e<0.1", |b| {
        b.iter_batched(
            || make_cases(&mut rng, 10_000, 0.0, 0.1),
            |cases| {
                for (u, axnl, aynl) in cases {
                    black_box(solve_kepler_equation(
                        black_box(u),
                        black_box(axnl),
                        black_box(aynl),
                    ));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// High-eccentricity: e ∈ [0.7, 0.9)
fn bench_high_e(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBADF00D);

    c.bench_function("solve_kepler_equation/high_e_0.7..0.9", |b| {
        b.iter_batched(
            || make_cases(&mut rng, 10_000, 0.7, 0.9),
            |cases| {
                for (u, axnl, aynl) in cases {
                    black_box(solve_kepler_equation(
                        black_box(u),
                        black_box(axnl),
                        black_box(aynl),
                    ));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Circular orbit: a single step is expected.
fn bench_circular(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xFEEDFACE);

    c.bench_function("solve_kepler_equation/circular", |b| {
        b.iter_batched(
            || make_cases(&mut rng, 10_000, 0.0, 0.0),
            |cases| {
                for (u, axnl, aynl) in cases {
                    black_box(solve_kepler_equation(
                        black_box(u),
                        black_box(axnl),
                        black_box(aynl),
                    ));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_low_e, bench_high_e, bench_circular
);
criterion_main!(benches);
