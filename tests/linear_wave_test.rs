//! Grid-aligned linear sound wave: after one period the solution returns to
//! the initial data, and the L1 error must fall at second order when the
//! resolution doubles (Δt is halved with Δx).

use ctu_mhd::grid::boundary;
use ctu_mhd::{BoundarySet, CellState, EquationOfState, Grid, Integrator3D, StepConfig};

const GAMMA: f64 = 5.0 / 3.0;
const AMP: f64 = 1.0e-4;
const NT: usize = 4; // transverse extent

/// Right-going sound wave on a unit background with cs = 1.
fn wave_grid(n: usize) -> Grid {
    let mut g = Grid::new(n, NT, NT, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
    let tau = std::f64::consts::TAU;
    let p0 = 1.0 / GAMMA; // cs^2 = gamma p0 / d0 = 1
    let (n3, n2, n1) = g.u.dims();
    for k in 0..n3 {
        for j in 0..n2 {
            for i in 0..n1 {
                let (x1, _, _) = g.cc_pos(i, j, k);
                let delta = AMP * (tau * x1).sin();
                let d = 1.0 + delta;
                let v1 = delta; // cs * delta / d0
                let p = p0 + delta; // cs^2 * delta
                g.u[(k, j, i)] = CellState {
                    d,
                    m1: d * v1,
                    e: p / (GAMMA - 1.0) + 0.5 * d * v1 * v1,
                    ..Default::default()
                };
            }
        }
    }
    g
}

/// Propagate for one period and return the L1 density error against the
/// initial data.
fn run_one_period(n: usize) -> f64 {
    let eos = EquationOfState::Adiabatic { gamma: GAMMA };
    let mut g = wave_grid(n);
    let initial = wave_grid(n);
    let mut integ = Integrator3D::new(n, NT, NT, StepConfig::new(eos, false)).unwrap();
    let bounds = BoundarySet::periodic();

    // Fixed Δt proportional to Δx so time and space errors refine together.
    let dt = 0.25 * g.dx1;
    let steps = (1.0 / dt).round() as usize;
    g.dt = dt;
    for _ in 0..steps {
        boundary::apply(&mut g, &bounds);
        integ.step(&mut g).unwrap();
    }
    assert!((g.time - 1.0).abs() < 1e-12);

    let mut err = 0.0;
    let mut count = 0;
    for k in g.ks..=g.ke {
        for j in g.js..=g.je {
            for i in g.is..=g.ie {
                err += (g.u[(k, j, i)].d - initial.u[(k, j, i)].d).abs();
                count += 1;
            }
        }
    }
    err / count as f64
}

#[test]
fn test_sound_wave_second_order_convergence() {
    let err_coarse = run_one_period(16);
    let err_fine = run_one_period(32);

    println!("L1 errors: n=16 {err_coarse:.4e}, n=32 {err_fine:.4e}");
    assert!(err_coarse > 0.0 && err_fine > 0.0);
    // The error must be far below the wave amplitude...
    assert!(err_fine < 0.1 * AMP);
    // ...and fall at close to second order under refinement.
    let order = (err_coarse / err_fine).log2();
    assert!(
        order > 1.5,
        "expected near-second-order convergence, observed order {order:.2}"
    );
}
