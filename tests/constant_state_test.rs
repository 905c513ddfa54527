//! A uniform state on a periodic cube must be an exact fixed point of the
//! scheme: after many steps every cell equals the initial value to round-off.

use ctu_mhd::grid::boundary;
use ctu_mhd::{BoundarySet, CellState, EquationOfState, Grid, Integrator3D, StepConfig, NSCALARS};

const GAMMA: f64 = 5.0 / 3.0;

fn uniform_grid(state: CellState, b: (f64, f64, f64)) -> Grid {
    let mut g = Grid::new(8, 8, 8, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
    let (n3, n2, n1) = g.u.dims();
    for k in 0..n3 {
        for j in 0..n2 {
            for i in 0..n1 {
                g.u[(k, j, i)] = state;
                g.b1i[(k, j, i)] = b.0;
                g.b2i[(k, j, i)] = b.1;
                g.b3i[(k, j, i)] = b.2;
            }
        }
    }
    g
}

fn run_steps(g: &mut Grid, integ: &mut Integrator3D, dt: f64, n: usize) {
    let bounds = BoundarySet::periodic();
    g.dt = dt;
    for _ in 0..n {
        boundary::apply(g, &bounds);
        integ.step(g).unwrap();
    }
}

#[test]
fn test_constant_state_mhd_adiabatic() {
    let eos = EquationOfState::Adiabatic { gamma: GAMMA };
    let (b1, b2, b3) = (1.0, 0.7, -0.4);
    let state = CellState {
        d: 1.0,
        m1: 0.3,
        m2: -0.2,
        m3: 0.1,
        e: 1.0 / (GAMMA - 1.0)
            + 0.5 * (0.3 * 0.3 + 0.2 * 0.2 + 0.1 * 0.1)
            + 0.5 * (b1 * b1 + b2 * b2 + b3 * b3),
        b1c: b1,
        b2c: b2,
        b3c: b3,
        s: [0.5; NSCALARS],
    };
    let mut g = uniform_grid(state, (b1, b2, b3));
    let mut integ = Integrator3D::new(8, 8, 8, StepConfig::new(eos, true)).unwrap();

    run_steps(&mut g, &mut integ, 0.005, 100);

    for k in g.ks..=g.ke {
        for j in g.js..=g.je {
            for i in g.is..=g.ie {
                let u = &g.u[(k, j, i)];
                assert!((u.d - state.d).abs() < 1e-13, "density drifted");
                assert!((u.m1 - state.m1).abs() < 1e-13, "m1 drifted");
                assert!((u.m2 - state.m2).abs() < 1e-13, "m2 drifted");
                assert!((u.m3 - state.m3).abs() < 1e-13, "m3 drifted");
                assert!((u.e - state.e).abs() < 1e-12, "energy drifted");
                assert!((u.b1c - b1).abs() < 1e-13, "b1c drifted");
                assert!((u.b2c - b2).abs() < 1e-13, "b2c drifted");
                assert!((u.b3c - b3).abs() < 1e-13, "b3c drifted");
                assert!((u.s[0] - 0.5).abs() < 1e-13, "scalar drifted");
            }
        }
    }
}

#[test]
fn test_constant_state_hydro_isothermal() {
    let eos = EquationOfState::Isothermal { cs: 1.0 };
    let state = CellState {
        d: 2.0,
        m1: 0.5,
        m2: 0.0,
        m3: -0.3,
        ..Default::default()
    };
    let mut g = uniform_grid(state, (0.0, 0.0, 0.0));
    let mut integ = Integrator3D::new(8, 8, 8, StepConfig::new(eos, false)).unwrap();

    run_steps(&mut g, &mut integ, 0.005, 100);

    for k in g.ks..=g.ke {
        for j in g.js..=g.je {
            for i in g.is..=g.ie {
                let u = &g.u[(k, j, i)];
                assert!((u.d - state.d).abs() < 1e-13);
                assert!((u.m1 - state.m1).abs() < 1e-13);
                assert!((u.m2 - state.m2).abs() < 1e-13);
                assert!((u.m3 - state.m3).abs() < 1e-13);
            }
        }
    }
}
