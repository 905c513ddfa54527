//! The three-dimensional unsplit corner-transport-upwind integrator with
//! constrained transport.
//!
//! One call to [`Integrator3D::step`] advances a grid block by `grid.dt`
//! through twelve phases executed in a fixed order:
//!
//! 1-3. Interface predictor sweeps along x1, x2, x3: first-pass left/right
//!      states and 1-D fluxes.
//! 4.   Cell-centered EMFs at t^n, corner integration, half-step CT update of
//!      the scratch face fields.
//! 5-7. Transverse-flux correction of each direction's interface states,
//!      with limited MHD source terms, gravity, and shearing-box terms.
//! 8.   Cell-centered density/momentum/pressure at the half step and the
//!      half-step cell-centered EMFs.
//! 9.   Optional H-correction dissipation widths, then the second-pass
//!      Riemann solves on the corrected states.
//! 10.  Corner EMFs at the half step, optional shearing-box Ey remap, and the
//!      full-step CT update of the grid's face fields.
//! 11.  Full-step source terms (static potential, Crank-Nicholson shearing
//!      box, self-gravity in momentum-flux form, cooling).
//! 12.  Flux-divergence update of the cell-centered state and the final
//!      face-to-center field averaging.
//!
//! References: Colella, JCP 87, 171 (1990); Gardiner & Stone, JCP 227, 4123
//! (2008); Sanders, Morano & Druguet, JCP 145, 511 (1998).

mod cell_update;
mod corrector;
mod ct;
mod emf;
mod half_step;
mod predictor;

use std::sync::Arc;

use log::debug;

use crate::eos::{cons1d_to_prim1d, EquationOfState};
use crate::error::IntegrateError;
use crate::grid::{Array2, Array3, Grid, NGHOST};
use crate::riemann::{self, RiemannSolver};
use crate::source::{CoolingFunction, GravityPotential, SelfGravity, ShearingBox};
use crate::state::{Cons1D, Prim1D};

/// Configuration of one integration run, evaluated once per step.
///
/// This is the runtime form of the scheme's build matrix: MHD on/off, the
/// thermodynamic closure, the entropy fix, and the optional source-term
/// subsystems.
#[derive(Clone)]
pub struct StepConfig {
    /// Thermodynamic closure. The isothermal closure suppresses all energy
    /// updates and cooling.
    pub eos: EquationOfState,
    /// Enable the magnetic field: face-centered B, EMF construction, CT
    /// updates and MHD source terms.
    pub mhd: bool,
    /// Enable the Sanders et al. multidimensional entropy fix.
    pub h_correction: bool,
    /// Riemann solver used by both flux passes.
    pub riemann: RiemannSolver,
    /// Static gravitational potential hook.
    pub gravity: Option<Arc<dyn GravityPotential>>,
    /// Optically thin cooling hook.
    pub cooling: Option<Arc<dyn CoolingFunction>>,
    /// Self-gravity coupling; requires `Grid::phi`.
    pub self_gravity: Option<SelfGravity>,
    /// Shearing-box Coriolis/tidal subsystem.
    pub shearing_box: Option<ShearingBox>,
}

impl StepConfig {
    /// Configuration with every optional subsystem disabled.
    pub fn new(eos: EquationOfState, mhd: bool) -> Self {
        Self {
            eos,
            mhd,
            h_correction: false,
            riemann: RiemannSolver::default(),
            gravity: None,
            cooling: None,
            self_gravity: None,
            shearing_box: None,
        }
    }

    /// Select the Riemann solver.
    pub fn with_riemann(mut self, solver: RiemannSolver) -> Self {
        self.riemann = solver;
        self
    }

    /// Enable the H-correction entropy fix.
    pub fn with_h_correction(mut self) -> Self {
        self.h_correction = true;
        self
    }

    /// Attach a static gravitational potential.
    pub fn with_gravity(mut self, gravity: Arc<dyn GravityPotential>) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Attach a cooling function.
    pub fn with_cooling(mut self, cooling: Arc<dyn CoolingFunction>) -> Self {
        self.cooling = Some(cooling);
        self
    }

    /// Enable self-gravity.
    pub fn with_self_gravity(mut self, sg: SelfGravity) -> Self {
        self.self_gravity = Some(sg);
        self
    }

    /// Enable the shearing box.
    pub fn with_shearing_box(mut self, sb: ShearingBox) -> Self {
        self.shearing_box = Some(sb);
        self
    }

    /// Whether the half-step density is needed.
    fn needs_dhalf(&self) -> bool {
        self.mhd || self.gravity.is_some() || self.cooling.is_some() || self.shearing_box.is_some()
    }

    /// Whether the half-step pressure and momenta are needed.
    fn needs_phalf(&self) -> bool {
        self.mhd || self.cooling.is_some()
    }
}

/// H-correction dissipation widths, one per face direction.
struct EtaFields {
    eta1: Array3<f64>,
    eta2: Array3<f64>,
    eta3: Array3<f64>,
}

/// The integrator and its step-scoped scratch storage.
///
/// Scratch arrays are allocated once for a fixed block size and reused for
/// every step; dropping the value releases them.
pub struct Integrator3D {
    cfg: StepConfig,
    nx1: usize,
    nx2: usize,
    nx3: usize,

    // Left/right interface conserved states, rotated per direction.
    ul_x1: Array3<Cons1D>,
    ur_x1: Array3<Cons1D>,
    ul_x2: Array3<Cons1D>,
    ur_x2: Array3<Cons1D>,
    ul_x3: Array3<Cons1D>,
    ur_x3: Array3<Cons1D>,
    // Interface fluxes, persisted between phases.
    x1_flux: Array3<Cons1D>,
    x2_flux: Array3<Cons1D>,
    x3_flux: Array3<Cons1D>,
    // Half-step predicted normal face fields.
    b1_x1: Array3<f64>,
    b2_x2: Array3<f64>,
    b3_x3: Array3<f64>,
    // Edge-centered and cell-centered EMFs.
    emf1: Array3<f64>,
    emf2: Array3<f64>,
    emf3: Array3<f64>,
    emf1_cc: Array3<f64>,
    emf2_cc: Array3<f64>,
    emf3_cc: Array3<f64>,
    // Half-step diagnostics; allocated only when a consumer is active.
    dhalf: Option<Array3<f64>>,
    phalf: Option<Array3<f64>>,
    // H-correction widths; allocated only when the fix is enabled.
    eta: Option<EtaFields>,
    // Shearing-box Ey remap planes.
    remap_ey_in: Option<Array2<f64>>,
    remap_ey_out: Option<Array2<f64>>,

    // 1-D sweep buffers.
    u1d: Vec<Cons1D>,
    w: Vec<Prim1D>,
    wl: Vec<Prim1D>,
    wr: Vec<Prim1D>,
    bxc: Vec<f64>,
    bxi: Vec<f64>,
}

impl Integrator3D {
    /// Allocate scratch storage for a block of interior size
    /// `(nx1, nx2, nx3)`.
    pub fn new(
        nx1: usize,
        nx2: usize,
        nx3: usize,
        cfg: StepConfig,
    ) -> Result<Self, IntegrateError> {
        if nx1 == 0 || nx2 == 0 || nx3 == 0 {
            return Err(IntegrateError::EmptyBlock { nx1, nx2, nx3 });
        }
        let n1 = nx1 + 2 * NGHOST;
        let n2 = nx2 + 2 * NGHOST;
        let n3 = nx3 + 2 * NGHOST;
        let nmax = n1.max(n2).max(n3);
        debug!("allocating CTU scratch for a {n1}x{n2}x{n3} padded block");

        let dhalf = if cfg.needs_dhalf() {
            Some(Array3::new(n3, n2, n1)?)
        } else {
            None
        };
        let phalf = if cfg.needs_phalf() && cfg.eos.is_adiabatic() {
            Some(Array3::new(n3, n2, n1)?)
        } else {
            None
        };
        let eta = if cfg.h_correction {
            Some(EtaFields {
                eta1: Array3::new(n3, n2, n1)?,
                eta2: Array3::new(n3, n2, n1)?,
                eta3: Array3::new(n3, n2, n1)?,
            })
        } else {
            None
        };
        let (remap_ey_in, remap_ey_out) = if cfg.shearing_box.is_some() {
            (Some(Array2::new(n3, n2)?), Some(Array2::new(n3, n2)?))
        } else {
            (None, None)
        };

        Ok(Self {
            cfg,
            nx1,
            nx2,
            nx3,
            ul_x1: Array3::new(n3, n2, n1)?,
            ur_x1: Array3::new(n3, n2, n1)?,
            ul_x2: Array3::new(n3, n2, n1)?,
            ur_x2: Array3::new(n3, n2, n1)?,
            ul_x3: Array3::new(n3, n2, n1)?,
            ur_x3: Array3::new(n3, n2, n1)?,
            x1_flux: Array3::new(n3, n2, n1)?,
            x2_flux: Array3::new(n3, n2, n1)?,
            x3_flux: Array3::new(n3, n2, n1)?,
            b1_x1: Array3::new(n3, n2, n1)?,
            b2_x2: Array3::new(n3, n2, n1)?,
            b3_x3: Array3::new(n3, n2, n1)?,
            emf1: Array3::new(n3, n2, n1)?,
            emf2: Array3::new(n3, n2, n1)?,
            emf3: Array3::new(n3, n2, n1)?,
            emf1_cc: Array3::new(n3, n2, n1)?,
            emf2_cc: Array3::new(n3, n2, n1)?,
            emf3_cc: Array3::new(n3, n2, n1)?,
            dhalf,
            phalf,
            eta,
            remap_ey_in,
            remap_ey_out,
            u1d: vec![Cons1D::default(); nmax],
            w: vec![Prim1D::default(); nmax],
            wl: vec![Prim1D::default(); nmax],
            wr: vec![Prim1D::default(); nmax],
            bxc: vec![0.0; nmax],
            bxi: vec![0.0; nmax],
        })
    }

    /// The configuration this integrator was built with.
    pub fn config(&self) -> &StepConfig {
        &self.cfg
    }

    /// Advance `grid` by one time step `grid.dt`.
    ///
    /// Ghost zones of the cell state, the face fields and (for self-gravity)
    /// the potential must be current on entry. The grid's face fields,
    /// cell-centered state and mass-flux arrays are updated in place;
    /// `grid.time` is advanced.
    pub fn step(&mut self, g: &mut Grid) -> Result<(), IntegrateError> {
        let (nx1, nx2, nx3) = g.interior();
        if (nx1, nx2, nx3) != (self.nx1, self.nx2, self.nx3) {
            return Err(IntegrateError::BlockMismatch {
                nx1,
                nx2,
                nx3,
                ex1: self.nx1,
                ex2: self.nx2,
                ex3: self.nx3,
            });
        }
        if self.cfg.self_gravity.is_some() {
            if g.phi.is_none() {
                return Err(IntegrateError::MissingPotential);
            }
            if g.mass_flux.is_none() {
                g.attach_mass_fluxes()?;
            }
        }

        // Phases 1-3: first-pass interface states and fluxes.
        self.predict_x1(g);
        self.predict_x2(g);
        self.predict_x3(g);

        // Phase 4: corner EMFs at t^n and the half-step CT update.
        if self.cfg.mhd {
            self.cell_centered_emfs(g);
            self.corner_emf1(g);
            self.corner_emf2(g);
            self.corner_emf3(g);
            self.ct_half_step(g);
        }

        // Phases 5-7: transverse-flux correction of the interface states.
        self.correct_x1(g);
        self.correct_x2(g);
        self.correct_x3(g);

        // Phase 8: half-step cell-centered state and EMFs.
        self.half_step_state(g);

        // Phase 9: dissipation widths and second-pass fluxes.
        if self.cfg.h_correction {
            self.compute_eta(g);
        }
        self.flux_pass2(g);

        // Phase 10: half-step corner EMFs and the full-step CT update.
        if self.cfg.mhd {
            self.corner_emf1(g);
            self.corner_emf2(g);
            self.corner_emf3(g);
            self.remap_shearing_ey(g);
            self.ct_full_step(g);
        }

        // Phase 11: full-step source terms on the cell-centered state.
        self.full_step_sources(g);

        // Phase 12: flux-divergence update and face-to-center averaging.
        self.cell_update(g);

        g.time += g.dt;
        Ok(())
    }

    /// Phase 6 of the design: per-face maximum wave-speed widths
    /// `eta = |lambda_r - lambda_l| / 2` for the entropy fix.
    fn compute_eta(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let mhd = self.cfg.mhd;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let Some(eta) = self.eta.as_mut() else {
            return;
        };

        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 2) {
                    let bx = self.b1_x1[(k, j, i)];
                    let ur = &self.ur_x1[(k, j, i)];
                    let ul = &self.ul_x1[(k, j, i)];
                    let lambda_r = ur.mx / ur.d + crate::eos::cfast(ur, bx, &eos, mhd);
                    let lambda_l = ul.mx / ul.d - crate::eos::cfast(ul, bx, &eos, mhd);
                    eta.eta1[(k, j, i)] = 0.5 * (lambda_r - lambda_l).abs();
                }
            }
        }
        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 2) {
                for i in (is - 1)..=(ie + 1) {
                    let bx = self.b2_x2[(k, j, i)];
                    let ur = &self.ur_x2[(k, j, i)];
                    let ul = &self.ul_x2[(k, j, i)];
                    let lambda_r = ur.mx / ur.d + crate::eos::cfast(ur, bx, &eos, mhd);
                    let lambda_l = ul.mx / ul.d - crate::eos::cfast(ul, bx, &eos, mhd);
                    eta.eta2[(k, j, i)] = 0.5 * (lambda_r - lambda_l).abs();
                }
            }
        }
        for k in (ks - 1)..=(ke + 2) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    let bx = self.b3_x3[(k, j, i)];
                    let ur = &self.ur_x3[(k, j, i)];
                    let ul = &self.ul_x3[(k, j, i)];
                    let lambda_r = ur.mx / ur.d + crate::eos::cfast(ur, bx, &eos, mhd);
                    let lambda_l = ul.mx / ul.d - crate::eos::cfast(ul, bx, &eos, mhd);
                    eta.eta3[(k, j, i)] = 0.5 * (lambda_r - lambda_l).abs();
                }
            }
        }
    }

    /// Phase 7: second-pass Riemann solves on the transverse-corrected
    /// states. The dissipation coefficient for each face is the maximum of
    /// the eight transverse neighbor widths plus the face's own.
    fn flux_pass2(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let mhd = self.cfg.mhd;
        let solver = self.cfg.riemann;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);

        // x1 faces
        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in is..=(ie + 1) {
                    let etah = match self.eta.as_ref() {
                        Some(eta) => eta.eta2[(k, j, i - 1)]
                            .max(eta.eta2[(k, j, i)])
                            .max(eta.eta2[(k, j + 1, i - 1)])
                            .max(eta.eta2[(k, j + 1, i)])
                            .max(eta.eta3[(k, j, i - 1)])
                            .max(eta.eta3[(k, j, i)])
                            .max(eta.eta3[(k + 1, j, i - 1)])
                            .max(eta.eta3[(k + 1, j, i)])
                            .max(eta.eta1[(k, j, i)]),
                        None => 0.0,
                    };
                    let bx = self.b1_x1[(k, j, i)];
                    let ul = self.ul_x1[(k, j, i)];
                    let ur = self.ur_x1[(k, j, i)];
                    let wl = cons1d_to_prim1d(&ul, bx, &eos, mhd);
                    let wr = cons1d_to_prim1d(&ur, bx, &eos, mhd);
                    self.x1_flux[(k, j, i)] =
                        riemann::solve(solver, &ul, &ur, &wl, &wr, bx, etah, &eos, mhd);
                }
            }
        }

        // x2 faces
        for k in (ks - 1)..=(ke + 1) {
            for j in js..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    let etah = match self.eta.as_ref() {
                        Some(eta) => eta.eta1[(k, j - 1, i)]
                            .max(eta.eta1[(k, j, i)])
                            .max(eta.eta1[(k, j - 1, i + 1)])
                            .max(eta.eta1[(k, j, i + 1)])
                            .max(eta.eta3[(k, j - 1, i)])
                            .max(eta.eta3[(k, j, i)])
                            .max(eta.eta3[(k + 1, j - 1, i)])
                            .max(eta.eta3[(k + 1, j, i)])
                            .max(eta.eta2[(k, j, i)]),
                        None => 0.0,
                    };
                    let bx = self.b2_x2[(k, j, i)];
                    let ul = self.ul_x2[(k, j, i)];
                    let ur = self.ur_x2[(k, j, i)];
                    let wl = cons1d_to_prim1d(&ul, bx, &eos, mhd);
                    let wr = cons1d_to_prim1d(&ur, bx, &eos, mhd);
                    self.x2_flux[(k, j, i)] =
                        riemann::solve(solver, &ul, &ur, &wl, &wr, bx, etah, &eos, mhd);
                }
            }
        }

        // x3 faces
        for k in ks..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    let etah = match self.eta.as_ref() {
                        Some(eta) => eta.eta1[(k - 1, j, i)]
                            .max(eta.eta1[(k, j, i)])
                            .max(eta.eta1[(k - 1, j, i + 1)])
                            .max(eta.eta1[(k, j, i + 1)])
                            .max(eta.eta2[(k - 1, j, i)])
                            .max(eta.eta2[(k, j, i)])
                            .max(eta.eta2[(k - 1, j + 1, i)])
                            .max(eta.eta2[(k, j + 1, i)])
                            .max(eta.eta3[(k, j, i)]),
                        None => 0.0,
                    };
                    let bx = self.b3_x3[(k, j, i)];
                    let ul = self.ul_x3[(k, j, i)];
                    let ur = self.ur_x3[(k, j, i)];
                    let wl = cons1d_to_prim1d(&ul, bx, &eos, mhd);
                    let wr = cons1d_to_prim1d(&ur, bx, &eos, mhd);
                    self.x3_flux[(k, j, i)] =
                        riemann::solve(solver, &ul, &ur, &wl, &wr, bx, etah, &eos, mhd);
                }
            }
        }
    }

    /// Average the remapped Ey into `emf2` at the shearing x1 boundaries to
    /// conserve the net vertical field.
    fn remap_shearing_ey(&mut self, g: &Grid) {
        let Some(sb) = self.cfg.shearing_box.clone() else {
            return;
        };
        let Some(remap) = sb.remap.as_ref() else {
            return;
        };
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);

        if sb.at_inner_x1() {
            if let Some(buf) = self.remap_ey_in.as_mut() {
                remap.remap_ix1(g, &self.emf2, buf);
                for k in ks..=(ke + 1) {
                    for j in js..=je {
                        self.emf2[(k, j, is)] = 0.5 * (self.emf2[(k, j, is)] + buf[(k, j)]);
                    }
                }
            }
        }
        if sb.at_outer_x1() {
            if let Some(buf) = self.remap_ey_out.as_mut() {
                remap.remap_ox1(g, &self.emf2, buf);
                for k in ks..=(ke + 1) {
                    for j in js..=je {
                        self.emf2[(k, j, ie + 1)] =
                            0.5 * (self.emf2[(k, j, ie + 1)] + buf[(k, j)]);
                    }
                }
            }
        }
    }
}

/// Sign-clamped limited slope used by the predictor's MHD source terms.
///
/// For a non-negative normal divergence the result is `max(0, min(db_d,
/// -db_t))`, otherwise `min(0, max(db_d, -db_t))`. This exact combination is
/// part of the scheme and must not be simplified.
#[inline]
pub(crate) fn predictor_limit(db_d: f64, db_t: f64) -> f64 {
    if db_d >= 0.0 {
        db_d.min(-db_t).max(0.0)
    } else {
        db_d.max(-db_t).min(0.0)
    }
}

/// `min_mod(-db_d, db_t)` as used by the transverse corrector: nonzero only
/// when the two arguments have the same sign, returning the one of smaller
/// magnitude.
#[inline]
pub(crate) fn min_mod_opposed(db_d: f64, db_t: f64) -> f64 {
    if db_d > 0.0 && db_t < 0.0 {
        db_t.max(-db_d)
    } else if db_d < 0.0 && db_t > 0.0 {
        db_t.min(-db_d)
    } else {
        0.0
    }
}
