//! Criterion micro-benchmarks for Riemann dispatch.

use std::hint::black_box;

use corona_bench::{blast, orszag_tang};
use corona_core::{Array3, Dir, NVAR};
use corona_flux::{RiemannDispatcher, Scheme, ShockDetector};
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: One X1 sweep over a 128x128 Orszag-Tang block, per MHD scheme.
fn bench_sweep_per_scheme_128(c: &mut Criterion) {
    let profile = orszag_tang(128);
    let states = profile.face_states();
    let mut flux = Array3::new(profile.grid.shape(), [0.0; NVAR]);

    for scheme in Scheme::ALL
        .into_iter()
        .filter(|s| s.supports(&profile.physics))
    {
        let mut dispatcher =
            RiemannDispatcher::new(scheme, profile.physics, &profile.grid, None).unwrap();
        c.bench_function(&format!("sweep_x1_{scheme}_128"), |b| {
            b.iter(|| {
                let stats =
                    dispatcher.calc_flux(Dir::X1, &profile.grid, &states[0], &profile.prim, &mut flux);
                black_box(stats);
            });
        });
    }
}

/// Benchmark: The same sweep with shock flattening on a 3-D blast.
///
/// Includes the shock detection pass over all 32^3 cells.
fn bench_sweep_flattened_blast_32(c: &mut Criterion) {
    let profile = blast(32);
    let states = profile.face_states();
    let mut flux = Array3::new(profile.grid.shape(), [0.0; NVAR]);
    let mut dispatcher = RiemannDispatcher::new(
        Scheme::Roe,
        profile.physics,
        &profile.grid,
        Some(ShockDetector::DEFAULT_THRESHOLD),
    )
    .unwrap();

    c.bench_function("sweep_x1_roe_flattened_blast_32", |b| {
        b.iter(|| {
            let stats =
                dispatcher.calc_flux(Dir::X1, &profile.grid, &states[0], &profile.prim, &mut flux);
            black_box(stats);
        });
    });
}

/// Benchmark: Shock detection alone on the 3-D blast.
fn bench_find_shocks_blast_32(c: &mut Criterion) {
    let profile = blast(32);
    let mut detector =
        ShockDetector::new(&profile.grid, ShockDetector::DEFAULT_THRESHOLD).unwrap();

    c.bench_function("find_shocks_blast_32", |b| {
        b.iter(|| black_box(detector.find_shocks(&profile.prim, &profile.grid)));
    });
}

criterion_group!(
    benches,
    bench_sweep_per_scheme_128,
    bench_sweep_flattened_blast_32,
    bench_find_shocks_blast_32,
);
criterion_main!(benches);
