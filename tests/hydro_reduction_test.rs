//! With MHD disabled the scheme must reduce exactly to the hydrodynamic CTU
//! update: whatever the face-field arrays contain, they have no observable
//! effect on the fluid state.

use ctu_mhd::grid::boundary;
use ctu_mhd::{BoundarySet, CellState, EquationOfState, Grid, Integrator3D, StepConfig, NSCALARS};

const GAMMA: f64 = 5.0 / 3.0;
const N: usize = 10;

fn hydro_grid() -> Grid {
    let mut g = Grid::new(N, N, N, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
    let tau = std::f64::consts::TAU;
    let (n3, n2, n1) = g.u.dims();
    for k in 0..n3 {
        for j in 0..n2 {
            for i in 0..n1 {
                let (x1, x2, x3) = g.cc_pos(i, j, k);
                let d = 1.0 + 0.2 * (tau * x1).sin() * (tau * x3).cos();
                let v1 = 0.3 * (tau * x2).cos();
                let v2 = -0.1 * (tau * x1).sin();
                let p = 0.8 + 0.1 * (tau * x2).sin();
                g.u[(k, j, i)] = CellState {
                    d,
                    m1: d * v1,
                    m2: d * v2,
                    m3: 0.0,
                    e: p / (GAMMA - 1.0) + 0.5 * d * (v1 * v1 + v2 * v2),
                    s: [0.3 * d; NSCALARS],
                    ..Default::default()
                };
            }
        }
    }
    g
}

#[test]
fn test_face_field_has_no_effect_when_mhd_is_off() {
    let eos = EquationOfState::Adiabatic { gamma: GAMMA };
    let bounds = BoundarySet::periodic();

    let mut clean = hydro_grid();
    let mut dirty = hydro_grid();
    // Plant garbage in the face-field arrays of one grid.
    let (n3, n2, n1) = dirty.u.dims();
    for k in 0..n3 {
        for j in 0..n2 {
            for i in 0..n1 {
                dirty.b1i[(k, j, i)] = 5.0 + (i as f64) * 0.1;
                dirty.b2i[(k, j, i)] = -3.0 + (j as f64) * 0.2;
                dirty.b3i[(k, j, i)] = (k as f64) - 2.0;
                dirty.u[(k, j, i)].b1c = 9.9;
                dirty.u[(k, j, i)].b2c = -9.9;
                dirty.u[(k, j, i)].b3c = 1.2;
            }
        }
    }

    let mut integ_a = Integrator3D::new(N, N, N, StepConfig::new(eos, false)).unwrap();
    let mut integ_b = Integrator3D::new(N, N, N, StepConfig::new(eos, false)).unwrap();

    clean.dt = 0.004;
    dirty.dt = 0.004;
    for _ in 0..10 {
        boundary::apply(&mut clean, &bounds);
        boundary::apply(&mut dirty, &bounds);
        integ_a.step(&mut clean).unwrap();
        integ_b.step(&mut dirty).unwrap();
    }

    for k in clean.ks..=clean.ke {
        for j in clean.js..=clean.je {
            for i in clean.is..=clean.ie {
                let a = &clean.u[(k, j, i)];
                let b = &dirty.u[(k, j, i)];
                assert_eq!(a.d, b.d, "density differs at ({i},{j},{k})");
                assert_eq!(a.m1, b.m1);
                assert_eq!(a.m2, b.m2);
                assert_eq!(a.m3, b.m3);
                assert_eq!(a.e, b.e);
                assert_eq!(a.s[0], b.s[0]);
            }
        }
    }
}
