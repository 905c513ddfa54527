//! Phases 1-3: first-pass interface states and 1-D fluxes.
//!
//! Each sweep loads the cell data into 1-D buffers in the rotated ordering of
//! its direction, reconstructs half-step left/right primitives, applies the
//! limited MHD source terms from the transverse field divergence, adds the
//! half-step gravity/cooling/shearing-box sources, and solves the first-pass
//! Riemann problems.
//!
//! Rotated component orderings:
//!
//! | sweep | Mx | My | Mz | By  | Bz  |
//! |-------|----|----|----|-----|-----|
//! | x1    | M1 | M2 | M3 | B2c | B3c |
//! | x2    | M2 | M3 | M1 | B3c | B1c |
//! | x3    | M3 | M1 | M2 | B1c | B2c |

use crate::eos::{cons1d_to_prim1d, prim1d_to_cons1d};
use crate::grid::{Grid, NGHOST};
use crate::reconstruct::lr_states;
use crate::riemann;
use crate::state::Cons1D;

use super::{predictor_limit, Integrator3D};

impl Integrator3D {
    /// x1 sweep over all transverse `(j, k)` lines.
    pub(super) fn predict_x1(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let mhd = self.cfg.mhd;
        let solver = self.cfg.riemann;
        let gravity = self.cfg.gravity.clone();
        let cooling = self.cfg.cooling.clone();
        let shearing = self.cfg.shearing_box.clone();
        let self_grav = self.cfg.self_gravity.is_some();

        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx1 = g.dt / g.dx1;
        let q1 = 0.5 * dtodx1;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        for k in (ks - 2)..=(ke + 2) {
            for j in (js - 2)..=(je + 2) {
                // Load the 1-D vector (d, M1, M2, M3, E, B2c, B3c, s).
                for i in (is - NGHOST)..=(ie + NGHOST) {
                    let u = &g.u[(k, j, i)];
                    self.u1d[i] = Cons1D {
                        d: u.d,
                        mx: u.m1,
                        my: u.m2,
                        mz: u.m3,
                        e: u.e,
                        by: if mhd { u.b2c } else { 0.0 },
                        bz: if mhd { u.b3c } else { 0.0 },
                        s: u.s,
                    };
                    self.bxc[i] = u.b1c;
                    self.bxi[i] = g.b1i[(k, j, i)];
                    self.b1_x1[(k, j, i)] = g.b1i[(k, j, i)];
                    self.w[i] = cons1d_to_prim1d(&self.u1d[i], self.bxc[i], &eos, mhd);
                }

                lr_states(
                    &self.w,
                    &self.bxc,
                    g.dt,
                    dtodx1,
                    is - 1,
                    ie + 1,
                    &mut self.wl,
                    &mut self.wr,
                    &eos,
                    mhd,
                );

                // MHD source terms from the transverse field divergence,
                // upwinded to zone i-1 for the left state and zone i for the
                // right state.
                if mhd {
                    for i in (is - 1)..=(ie + 2) {
                        let db1 = (g.b1i[(k, j, i)] - g.b1i[(k, j, i - 1)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i - 1)] - g.b2i[(k, j, i - 1)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i - 1)] - g.b3i[(k, j, i - 1)]) * dx3i;
                        let l2 = predictor_limit(db1, db2);
                        let l3 = predictor_limit(db1, db3);
                        let uz = &g.u[(k, j, i - 1)];
                        self.wl[i].by += hdt * (uz.m2 / uz.d) * l2;
                        self.wl[i].bz += hdt * (uz.m3 / uz.d) * l3;

                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let l2 = predictor_limit(db1, db2);
                        let l3 = predictor_limit(db1, db3);
                        let uz = &g.u[(k, j, i)];
                        self.wr[i].by += hdt * (uz.m2 / uz.d) * l2;
                        self.wr[i].bz += hdt * (uz.m3 / uz.d) * l3;
                    }
                }

                // Static potential: face-centered differences on the normal
                // velocity for dt/2.
                if let Some(grav) = gravity.as_ref() {
                    for i in (is - 1)..=(ie + 2) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let phicr = grav.phi(x1, x2, x3);
                        let phicl = grav.phi(x1 - g.dx1, x2, x3);
                        let phifc = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                        self.wl[i].vx -= dtodx1 * (phifc - phicl);
                        self.wr[i].vx -= dtodx1 * (phicr - phifc);
                    }
                }

                // Self-gravity for dt/2.
                if self_grav {
                    if let Some(phi) = g.phi.as_ref() {
                        for i in (is - 1)..=(ie + 2) {
                            let dphi = phi[(k, j, i)] - phi[(k, j, i - 1)];
                            self.wl[i].vx -= q1 * dphi;
                            self.wr[i].vx -= q1 * dphi;
                        }
                    }
                }

                // Optically thin cooling for dt/2.
                if eos.is_adiabatic() {
                    if let Some(cool) = cooling.as_ref() {
                        let gm1 = eos.gamma_1();
                        for i in (is - 1)..=(ie + 2) {
                            let coolfl = cool.rate(self.wl[i].d, self.wl[i].p, hdt);
                            let coolfr = cool.rate(self.wr[i].d, self.wr[i].p, hdt);
                            self.wl[i].p -= hdt * gm1 * coolfl;
                            self.wr[i].p -= hdt * gm1 * coolfr;
                        }
                    }
                }

                // Shearing-box Coriolis forces for dt/2.
                if let Some(sb) = shearing.as_ref() {
                    let om = sb.omega;
                    let vy_coef = if sb.fargo { 0.25 } else { 1.0 };
                    for i in (is - 1)..=(ie + 2) {
                        self.wl[i].vx += g.dt * om * self.w[i - 1].vy;
                        self.wl[i].vy -= vy_coef * g.dt * om * self.w[i - 1].vx;
                        self.wr[i].vx += g.dt * om * self.w[i].vy;
                        self.wr[i].vy -= vy_coef * g.dt * om * self.w[i].vx;
                    }
                }

                // First-pass fluxes.
                for i in (is - 1)..=(ie + 2) {
                    let bx = self.bxi[i];
                    let ul = prim1d_to_cons1d(&self.wl[i], bx, &eos, mhd);
                    let ur = prim1d_to_cons1d(&self.wr[i], bx, &eos, mhd);
                    self.ul_x1[(k, j, i)] = ul;
                    self.ur_x1[(k, j, i)] = ur;
                    self.x1_flux[(k, j, i)] = riemann::solve(
                        solver,
                        &ul,
                        &ur,
                        &self.wl[i],
                        &self.wr[i],
                        bx,
                        0.0,
                        &eos,
                        mhd,
                    );
                }
            }
        }
    }

    /// x2 sweep over all transverse `(i, k)` lines.
    pub(super) fn predict_x2(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let mhd = self.cfg.mhd;
        let solver = self.cfg.riemann;
        let gravity = self.cfg.gravity.clone();
        let cooling = self.cfg.cooling.clone();
        let self_grav = self.cfg.self_gravity.is_some();

        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx2 = g.dt / g.dx2;
        let q2 = 0.5 * dtodx2;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        for k in (ks - 2)..=(ke + 2) {
            for i in (is - 2)..=(ie + 2) {
                // Load the 1-D vector (d, M2, M3, M1, E, B3c, B1c, s).
                for j in (js - NGHOST)..=(je + NGHOST) {
                    let u = &g.u[(k, j, i)];
                    self.u1d[j] = Cons1D {
                        d: u.d,
                        mx: u.m2,
                        my: u.m3,
                        mz: u.m1,
                        e: u.e,
                        by: if mhd { u.b3c } else { 0.0 },
                        bz: if mhd { u.b1c } else { 0.0 },
                        s: u.s,
                    };
                    self.bxc[j] = u.b2c;
                    self.bxi[j] = g.b2i[(k, j, i)];
                    self.b2_x2[(k, j, i)] = g.b2i[(k, j, i)];
                    self.w[j] = cons1d_to_prim1d(&self.u1d[j], self.bxc[j], &eos, mhd);
                }

                lr_states(
                    &self.w,
                    &self.bxc,
                    g.dt,
                    dtodx2,
                    js - 1,
                    je + 1,
                    &mut self.wl,
                    &mut self.wr,
                    &eos,
                    mhd,
                );

                if mhd {
                    for j in (js - 1)..=(je + 2) {
                        let db1 = (g.b1i[(k, j - 1, i + 1)] - g.b1i[(k, j - 1, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j, i)] - g.b2i[(k, j - 1, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j - 1, i)] - g.b3i[(k, j - 1, i)]) * dx3i;
                        let l1 = predictor_limit(db2, db1);
                        let l3 = predictor_limit(db2, db3);
                        let uz = &g.u[(k, j - 1, i)];
                        self.wl[j].by += hdt * (uz.m3 / uz.d) * l3;
                        self.wl[j].bz += hdt * (uz.m1 / uz.d) * l1;

                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let l1 = predictor_limit(db2, db1);
                        let l3 = predictor_limit(db2, db3);
                        let uz = &g.u[(k, j, i)];
                        self.wr[j].by += hdt * (uz.m3 / uz.d) * l3;
                        self.wr[j].bz += hdt * (uz.m1 / uz.d) * l1;
                    }
                }

                if let Some(grav) = gravity.as_ref() {
                    for j in (js - 1)..=(je + 2) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let phicr = grav.phi(x1, x2, x3);
                        let phicl = grav.phi(x1, x2 - g.dx2, x3);
                        let phifc = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                        self.wl[j].vx -= dtodx2 * (phifc - phicl);
                        self.wr[j].vx -= dtodx2 * (phicr - phifc);
                    }
                }

                if self_grav {
                    if let Some(phi) = g.phi.as_ref() {
                        for j in (js - 1)..=(je + 2) {
                            let dphi = phi[(k, j, i)] - phi[(k, j - 1, i)];
                            self.wl[j].vx -= q2 * dphi;
                            self.wr[j].vx -= q2 * dphi;
                        }
                    }
                }

                if eos.is_adiabatic() {
                    if let Some(cool) = cooling.as_ref() {
                        let gm1 = eos.gamma_1();
                        for j in (js - 1)..=(je + 2) {
                            let coolfl = cool.rate(self.wl[j].d, self.wl[j].p, hdt);
                            let coolfr = cool.rate(self.wr[j].d, self.wr[j].p, hdt);
                            self.wl[j].p -= hdt * gm1 * coolfl;
                            self.wr[j].p -= hdt * gm1 * coolfr;
                        }
                    }
                }

                for j in (js - 1)..=(je + 2) {
                    let bx = self.bxi[j];
                    let ul = prim1d_to_cons1d(&self.wl[j], bx, &eos, mhd);
                    let ur = prim1d_to_cons1d(&self.wr[j], bx, &eos, mhd);
                    self.ul_x2[(k, j, i)] = ul;
                    self.ur_x2[(k, j, i)] = ur;
                    self.x2_flux[(k, j, i)] = riemann::solve(
                        solver,
                        &ul,
                        &ur,
                        &self.wl[j],
                        &self.wr[j],
                        bx,
                        0.0,
                        &eos,
                        mhd,
                    );
                }
            }
        }
    }

    /// x3 sweep over all transverse `(i, j)` lines.
    pub(super) fn predict_x3(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let mhd = self.cfg.mhd;
        let solver = self.cfg.riemann;
        let gravity = self.cfg.gravity.clone();
        let cooling = self.cfg.cooling.clone();
        let self_grav = self.cfg.self_gravity.is_some();

        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx3 = g.dt / g.dx3;
        let q3 = 0.5 * dtodx3;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        for j in (js - 2)..=(je + 2) {
            for i in (is - 2)..=(ie + 2) {
                // Load the 1-D vector (d, M3, M1, M2, E, B1c, B2c, s).
                for k in (ks - NGHOST)..=(ke + NGHOST) {
                    let u = &g.u[(k, j, i)];
                    self.u1d[k] = Cons1D {
                        d: u.d,
                        mx: u.m3,
                        my: u.m1,
                        mz: u.m2,
                        e: u.e,
                        by: if mhd { u.b1c } else { 0.0 },
                        bz: if mhd { u.b2c } else { 0.0 },
                        s: u.s,
                    };
                    self.bxc[k] = u.b3c;
                    self.bxi[k] = g.b3i[(k, j, i)];
                    self.b3_x3[(k, j, i)] = g.b3i[(k, j, i)];
                    self.w[k] = cons1d_to_prim1d(&self.u1d[k], self.bxc[k], &eos, mhd);
                }

                lr_states(
                    &self.w,
                    &self.bxc,
                    g.dt,
                    dtodx3,
                    ks - 1,
                    ke + 1,
                    &mut self.wl,
                    &mut self.wr,
                    &eos,
                    mhd,
                );

                if mhd {
                    for k in (ks - 1)..=(ke + 2) {
                        let db1 = (g.b1i[(k - 1, j, i + 1)] - g.b1i[(k - 1, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k - 1, j + 1, i)] - g.b2i[(k - 1, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k, j, i)] - g.b3i[(k - 1, j, i)]) * dx3i;
                        let l1 = predictor_limit(db3, db1);
                        let l2 = predictor_limit(db3, db2);
                        let uz = &g.u[(k - 1, j, i)];
                        self.wl[k].by += hdt * (uz.m1 / uz.d) * l1;
                        self.wl[k].bz += hdt * (uz.m2 / uz.d) * l2;

                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let l1 = predictor_limit(db3, db1);
                        let l2 = predictor_limit(db3, db2);
                        let uz = &g.u[(k, j, i)];
                        self.wr[k].by += hdt * (uz.m1 / uz.d) * l1;
                        self.wr[k].bz += hdt * (uz.m2 / uz.d) * l2;
                    }
                }

                if let Some(grav) = gravity.as_ref() {
                    for k in (ks - 1)..=(ke + 2) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let phicr = grav.phi(x1, x2, x3);
                        let phicl = grav.phi(x1, x2, x3 - g.dx3);
                        let phifc = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                        self.wl[k].vx -= dtodx3 * (phifc - phicl);
                        self.wr[k].vx -= dtodx3 * (phicr - phifc);
                    }
                }

                if self_grav {
                    if let Some(phi) = g.phi.as_ref() {
                        for k in (ks - 1)..=(ke + 2) {
                            let dphi = phi[(k, j, i)] - phi[(k - 1, j, i)];
                            self.wl[k].vx -= q3 * dphi;
                            self.wr[k].vx -= q3 * dphi;
                        }
                    }
                }

                if eos.is_adiabatic() {
                    if let Some(cool) = cooling.as_ref() {
                        let gm1 = eos.gamma_1();
                        for k in (ks - 1)..=(ke + 2) {
                            let coolfl = cool.rate(self.wl[k].d, self.wl[k].p, hdt);
                            let coolfr = cool.rate(self.wr[k].d, self.wr[k].p, hdt);
                            self.wl[k].p -= hdt * gm1 * coolfl;
                            self.wr[k].p -= hdt * gm1 * coolfr;
                        }
                    }
                }

                for k in (ks - 1)..=(ke + 2) {
                    let bx = self.bxi[k];
                    let ul = prim1d_to_cons1d(&self.wl[k], bx, &eos, mhd);
                    let ur = prim1d_to_cons1d(&self.wr[k], bx, &eos, mhd);
                    self.ul_x3[(k, j, i)] = ul;
                    self.ur_x3[(k, j, i)] = ur;
                    self.x3_flux[(k, j, i)] = riemann::solve(
                        solver,
                        &ul,
                        &ur,
                        &self.wl[k],
                        &self.wr[k],
                        bx,
                        0.0,
                        &eos,
                        mhd,
                    );
                }
            }
        }
    }
}
