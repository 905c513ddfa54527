//! Benchmarks for the approximate Riemann solvers.
//!
//! Run with: `cargo bench --bench riemann_bench`
//!
//! Compares the HLLE and HLLD solvers on a spread of MHD interface states.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ctu_mhd::{hlld_flux, hlle_flux, prim1d_to_cons1d, Cons1D, EquationOfState, Prim1D};

const GAMMA: f64 = 5.0 / 3.0;

/// Generate interface state pairs with smoothly varying jumps.
fn generate_states(n: usize) -> Vec<(Cons1D, Cons1D, Prim1D, Prim1D, f64)> {
    let eos = EquationOfState::Adiabatic { gamma: GAMMA };
    let mut states = Vec::with_capacity(n);
    for i in 0..n {
        let phase = (i as f64) * 0.1;

        let wl = Prim1D {
            d: 1.0 + 0.3 * phase.sin(),
            vx: 0.4 * phase.cos(),
            vy: 0.2 * (phase + 0.3).sin(),
            vz: -0.1 * phase.sin(),
            p: 0.8 + 0.2 * (phase + 0.7).cos(),
            by: 0.5 * (phase * 0.5).sin(),
            bz: 0.3,
            ..Default::default()
        };
        let wr = Prim1D {
            d: 0.9 + 0.25 * (phase + 0.4).sin(),
            vx: -0.3 * phase.sin(),
            vy: 0.1,
            vz: 0.2 * (phase + 0.1).cos(),
            p: 0.7 + 0.15 * phase.sin(),
            by: 0.4 * (phase * 0.5 + 0.2).cos(),
            bz: -0.2,
            ..Default::default()
        };
        let bx = 0.6 * (phase * 0.3).cos();
        let ul = prim1d_to_cons1d(&wl, bx, &eos, true);
        let ur = prim1d_to_cons1d(&wr, bx, &eos, true);
        states.push((ul, ur, wl, wr, bx));
    }
    states
}

fn bench_riemann_solvers(c: &mut Criterion) {
    let eos = EquationOfState::Adiabatic { gamma: GAMMA };
    let states = generate_states(1000);
    let mut group = c.benchmark_group("riemann");

    group.bench_function("hlle", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for (ul, ur, wl, wr, bx) in &states {
                let f = hlle_flux(
                    black_box(ul),
                    black_box(ur),
                    black_box(wl),
                    black_box(wr),
                    black_box(*bx),
                    0.0,
                    &eos,
                    true,
                );
                total += f.d;
            }
            total
        })
    });

    group.bench_function("hlld", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for (ul, ur, wl, wr, bx) in &states {
                let f = hlld_flux(
                    black_box(ul),
                    black_box(ur),
                    black_box(wl),
                    black_box(wr),
                    black_box(*bx),
                    0.0,
                    &eos,
                    true,
                );
                total += f.d;
            }
            total
        })
    });

    group.finish();
}

criterion_group!(benches, bench_riemann_solvers);
criterion_main!(benches);
