//! Phase 8: cell-centered state at t^{n+1/2}.
//!
//! The half-step density is needed by the MHD EMFs, the full-step gravity
//! source and the cooling sink; the half-step momenta and pressure by the
//! MHD EMFs and cooling. All are formed by a centered divergence of the
//! first-pass fluxes plus the half-step source terms, mirroring the
//! predictor's forms.

use crate::grid::Grid;

use super::Integrator3D;

impl Integrator3D {
    pub(super) fn half_step_state(&mut self, g: &Grid) {
        let eos = self.cfg.eos;
        let adiabatic = eos.is_adiabatic();
        let mhd = self.cfg.mhd;
        let gravity = self.cfg.gravity.clone();
        let shearing = self.cfg.shearing_box.clone();
        let self_grav = self.cfg.self_gravity.is_some();
        let has_cooling = self.cfg.cooling.is_some();

        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let q1 = 0.5 * g.dt / g.dx1;
        let q2 = 0.5 * g.dt / g.dx2;
        let q3 = 0.5 * g.dt / g.dx3;

        // d^{n+1/2} from the first-pass mass fluxes.
        if let Some(dhalf) = self.dhalf.as_mut() {
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 1) {
                        dhalf[(k, j, i)] = g.u[(k, j, i)].d
                            - q1 * (self.x1_flux[(k, j, i + 1)].d - self.x1_flux[(k, j, i)].d)
                            - q2 * (self.x2_flux[(k, j + 1, i)].d - self.x2_flux[(k, j, i)].d)
                            - q3 * (self.x3_flux[(k + 1, j, i)].d - self.x3_flux[(k, j, i)].d);
                    }
                }
            }
        }

        // The momenta, pressure and cell-centered EMFs at the half step are
        // needed only with MHD or cooling.
        if !(mhd || has_cooling) {
            return;
        }
        let Some(dhalf) = self.dhalf.as_ref() else {
            return;
        };
        let mut phalf = self.phalf.as_mut();

        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    let u = &g.u[(k, j, i)];
                    let mut m1h = u.m1
                        - q1 * (self.x1_flux[(k, j, i + 1)].mx - self.x1_flux[(k, j, i)].mx)
                        - q2 * (self.x2_flux[(k, j + 1, i)].mz - self.x2_flux[(k, j, i)].mz)
                        - q3 * (self.x3_flux[(k + 1, j, i)].my - self.x3_flux[(k, j, i)].my);
                    let mut m2h = u.m2
                        - q1 * (self.x1_flux[(k, j, i + 1)].my - self.x1_flux[(k, j, i)].my)
                        - q2 * (self.x2_flux[(k, j + 1, i)].mx - self.x2_flux[(k, j, i)].mx)
                        - q3 * (self.x3_flux[(k + 1, j, i)].mz - self.x3_flux[(k, j, i)].mz);
                    let mut m3h = u.m3
                        - q1 * (self.x1_flux[(k, j, i + 1)].mz - self.x1_flux[(k, j, i)].mz)
                        - q2 * (self.x2_flux[(k, j + 1, i)].my - self.x2_flux[(k, j, i)].my)
                        - q3 * (self.x3_flux[(k + 1, j, i)].mx - self.x3_flux[(k, j, i)].mx);
                    let mut eh = 0.0;
                    if adiabatic {
                        eh = u.e
                            - q1 * (self.x1_flux[(k, j, i + 1)].e - self.x1_flux[(k, j, i)].e)
                            - q2 * (self.x2_flux[(k, j + 1, i)].e - self.x2_flux[(k, j, i)].e)
                            - q3 * (self.x3_flux[(k + 1, j, i)].e - self.x3_flux[(k, j, i)].e);
                    }

                    if let Some(grav) = gravity.as_ref() {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                        m1h -= q1 * (phir - phil) * u.d;

                        let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3);
                        let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                        m2h -= q2 * (phir - phil) * u.d;

                        let phir = grav.phi(x1, x2, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                        m3h -= q3 * (phir - phil) * u.d;
                    }

                    if self_grav {
                        if let Some(phi) = g.phi.as_ref() {
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j, i + 1)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j, i - 1)]);
                            m1h -= q1 * (phir - phil) * u.d;

                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j + 1, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j - 1, i)]);
                            m2h -= q2 * (phir - phil) * u.d;

                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k + 1, j, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k - 1, j, i)]);
                            m3h -= q3 * (phir - phil) * u.d;
                        }
                    }

                    // Coriolis terms; the tidal potential is carried by the
                    // static-potential hook above.
                    if let Some(sb) = shearing.as_ref() {
                        m1h += g.dt * sb.omega * u.m2;
                        let coef = if sb.fargo { 0.25 } else { 1.0 };
                        m2h -= coef * g.dt * sb.omega * u.m1;
                    }

                    let dh = dhalf[(k, j, i)];
                    let mut ph = 0.0;
                    if adiabatic {
                        ph = eh - 0.5 * (m1h * m1h + m2h * m2h + m3h * m3h) / dh;
                    }

                    if mhd {
                        let b1ch = 0.5 * (self.b1_x1[(k, j, i)] + self.b1_x1[(k, j, i + 1)]);
                        let b2ch = 0.5 * (self.b2_x2[(k, j, i)] + self.b2_x2[(k, j + 1, i)]);
                        let b3ch = 0.5 * (self.b3_x3[(k, j, i)] + self.b3_x3[(k + 1, j, i)]);
                        self.emf1_cc[(k, j, i)] = (b2ch * m3h - b3ch * m2h) / dh;
                        self.emf2_cc[(k, j, i)] = (b3ch * m1h - b1ch * m3h) / dh;
                        self.emf3_cc[(k, j, i)] = (b1ch * m2h - b2ch * m1h) / dh;
                        if adiabatic {
                            ph -= 0.5 * (b1ch * b1ch + b2ch * b2ch + b3ch * b3ch);
                        }
                    }

                    if adiabatic {
                        if let Some(phalf) = phalf.as_deref_mut() {
                            phalf[(k, j, i)] = ph * eos.gamma_1();
                        }
                    }
                }
            }
        }
    }
}
