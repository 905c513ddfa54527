//! Shearing-box source terms.
//!
//! For a spatially uniform isothermal flow the Coriolis forces reduce to the
//! epicyclic oscillation of `(M1, M2)`; the Crank-Nicholson update must
//! integrate it without secular drift, preserving the epicyclic invariant
//! `M1^2 + 4 M2^2` (FARGO frame) to round-off over many steps.

use ctu_mhd::grid::boundary;
use ctu_mhd::{
    total_mass, BoundarySet, CellState, EquationOfState, Grid, Integrator3D, ShearingBox,
    StepConfig,
};

const N: usize = 8;

fn uniform_grid(d: f64, m1: f64, m2: f64) -> Grid {
    let mut g = Grid::new(N, N, N, (-0.5, 0.5), (0.0, 1.0), (0.0, 1.0)).unwrap();
    let (n3, n2, n1) = g.u.dims();
    for k in 0..n3 {
        for j in 0..n2 {
            for i in 0..n1 {
                g.u[(k, j, i)] = CellState {
                    d,
                    m1,
                    m2,
                    ..Default::default()
                };
            }
        }
    }
    g
}

#[test]
fn test_fargo_epicyclic_invariant() {
    let eos = EquationOfState::Isothermal { cs: 1.0 };
    let omega = 1.0e-3;
    let cfg = StepConfig::new(eos, false).with_shearing_box(ShearingBox::new(omega, true));

    let (m1_init, m2_init) = (0.01, 0.005);
    let mut g = uniform_grid(1.0, m1_init, m2_init);
    let mut integ = Integrator3D::new(N, N, N, cfg).unwrap();
    let bounds = BoundarySet::periodic();

    let invariant0 = m1_init * m1_init + 4.0 * m2_init * m2_init;
    let mass0 = total_mass(&g);

    g.dt = 0.05;
    for _ in 0..200 {
        boundary::apply(&mut g, &bounds);
        integ.step(&mut g).unwrap();
    }

    // The state must stay uniform, so one cell stands for all.
    let u = g.u[(g.ks + 2, g.js + 3, g.is + 1)];
    for k in g.ks..=g.ke {
        for j in g.js..=g.je {
            for i in g.is..=g.ie {
                let v = &g.u[(k, j, i)];
                assert!((v.m1 - u.m1).abs() < 1e-13, "lost uniformity");
                assert!((v.m2 - u.m2).abs() < 1e-13, "lost uniformity");
                assert!((v.d - 1.0).abs() < 1e-13);
            }
        }
    }

    // The Crank-Nicholson rotation preserves the epicyclic invariant.
    let invariant = u.m1 * u.m1 + 4.0 * u.m2 * u.m2;
    assert!(
        (invariant - invariant0).abs() / invariant0 < 1e-12,
        "epicyclic invariant drifted: {invariant:e} vs {invariant0:e}"
    );

    // The phase must actually advance (the momenta rotate).
    assert!(
        (u.m1 - m1_init).abs() > 1e-5 || (u.m2 - m2_init).abs() > 1e-5,
        "momenta never rotated"
    );

    assert!((total_mass(&g) - mass0).abs() / mass0 < 1e-13);
}

#[test]
fn test_static_uniform_state_is_unaffected() {
    // With zero momenta the Coriolis forces vanish identically.
    let eos = EquationOfState::Isothermal { cs: 1.0 };
    let cfg = StepConfig::new(eos, false).with_shearing_box(ShearingBox::new(1.0e-3, true));

    let mut g = uniform_grid(1.5, 0.0, 0.0);
    let mut integ = Integrator3D::new(N, N, N, cfg).unwrap();
    let bounds = BoundarySet::periodic();

    g.dt = 0.05;
    for _ in 0..50 {
        boundary::apply(&mut g, &bounds);
        integ.step(&mut g).unwrap();
    }

    for k in g.ks..=g.ke {
        for j in g.js..=g.je {
            for i in g.is..=g.ie {
                let u = &g.u[(k, j, i)];
                assert!((u.d - 1.5).abs() < 1e-13);
                assert!(u.m1.abs() < 1e-13);
                assert!(u.m2.abs() < 1e-13);
                assert!(u.m3.abs() < 1e-13);
            }
        }
    }
}
