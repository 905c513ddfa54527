//! Phases 11-12: full-step source terms and the cell-centered update.
//!
//! Source terms are applied first so that they read the time-n momenta; the
//! flux-divergence update and the final face-to-center field averaging
//! follow. The shearing-box momenta use a Crank-Nicholson discretization of
//! the epicyclic oscillation; self-gravity is applied in momentum-flux form
//! through the gravitational stress tensor so total momentum is conserved on
//! a periodic domain.

use crate::grid::Grid;
use crate::state::NSCALARS;

use super::Integrator3D;

impl Integrator3D {
    pub(super) fn full_step_sources(&mut self, g: &mut Grid) {
        let adiabatic = self.cfg.eos.is_adiabatic();
        let gravity = self.cfg.gravity.clone();
        let cooling = self.cfg.cooling.clone();
        let shearing = self.cfg.shearing_box.clone();
        let self_gravity = self.cfg.self_gravity;

        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx1 = g.dt / g.dx1;
        let dtodx2 = g.dt / g.dx2;
        let dtodx3 = g.dt / g.dx3;
        let q1 = 0.5 * dtodx1;
        let q2 = 0.5 * dtodx2;
        let q3 = 0.5 * dtodx3;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        if let Some(sb) = shearing.as_ref() {
            // Crank-Nicholson update of (M1, dM2) for the Coriolis and tidal
            // forces, using the y-momentum fluctuation so the epicyclic
            // oscillation is integrated without numerical damping.
            let om_dt = sb.omega * g.dt;
            let fact = om_dt / (1.0 + 0.25 * om_dt * om_dt);
            let th_om = 1.5 * sb.omega;

            for k in ks..=ke {
                for j in js..=je {
                    for i in is..=ie {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let u = g.u[(k, j, i)];

                        let m1n = u.m1;
                        let dm2n = if sb.fargo {
                            u.m2
                        } else {
                            u.m2 + u.d * th_om * x1
                        };

                        // Fluxes of the y-momentum fluctuation.
                        let mut frx1 = self.x1_flux[(k, j, i + 1)].my;
                        let mut flx1 = self.x1_flux[(k, j, i)].my;
                        let mut frx2 = self.x2_flux[(k, j + 1, i)].mx;
                        let mut flx2 = self.x2_flux[(k, j, i)].mx;
                        let mut frx3 = self.x3_flux[(k + 1, j, i)].mz;
                        let mut flx3 = self.x3_flux[(k, j, i)].mz;
                        if !sb.fargo {
                            frx1 += th_om * (x1 + 0.5 * g.dx1) * self.x1_flux[(k, j, i + 1)].d;
                            flx1 += th_om * (x1 - 0.5 * g.dx1) * self.x1_flux[(k, j, i)].d;
                            frx2 += th_om * x1 * self.x2_flux[(k, j + 1, i)].d;
                            flx2 += th_om * x1 * self.x2_flux[(k, j, i)].d;
                            frx3 += th_om * x1 * self.x3_flux[(k + 1, j, i)].d;
                            flx3 += th_om * x1 * self.x3_flux[(k, j, i)].d;
                        }

                        // Evolve M1 and dM2 to the half step by forward Euler.
                        let m1e = m1n
                            - q1 * (self.x1_flux[(k, j, i + 1)].mx - self.x1_flux[(k, j, i)].mx)
                            - q2 * (self.x2_flux[(k, j + 1, i)].mz - self.x2_flux[(k, j, i)].mz)
                            - q3 * (self.x3_flux[(k + 1, j, i)].my - self.x3_flux[(k, j, i)].my);
                        let dm2e =
                            dm2n - q1 * (frx1 - flx1) - q2 * (frx2 - flx2) - q3 * (frx3 - flx3);

                        {
                            let u = &mut g.u[(k, j, i)];
                            u.m1 += (2.0 * dm2e - 0.5 * om_dt * m1e) * fact;
                            u.m2 -= 0.5 * (m1e + om_dt * dm2e) * fact;
                            if !sb.fargo {
                                u.m2 -= 0.75
                                    * om_dt
                                    * (self.x1_flux[(k, j, i)].d
                                        + self.x1_flux[(k, j, i + 1)].d);
                            }
                        }

                        // Vertical component of the potential and the energy
                        // terms, identical to the non-shearing form below.
                        if let Some(grav) = gravity.as_ref() {
                            let phic = grav.phi(x1, x2, x3);
                            let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3);
                            let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                            if adiabatic {
                                g.u[(k, j, i)].e -= dtodx1
                                    * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                        + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                            }

                            let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3);
                            let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                            if adiabatic {
                                g.u[(k, j, i)].e -= dtodx2
                                    * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                        + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                            }
                            let phir = grav.phi(x1, x2, x3 + 0.5 * g.dx3);
                            let phil = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                            if let Some(dhalf) = self.dhalf.as_ref() {
                                g.u[(k, j, i)].m3 -=
                                    dtodx3 * (phir - phil) * dhalf[(k, j, i)];
                            }
                            if adiabatic {
                                g.u[(k, j, i)].e -= dtodx3
                                    * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                            }
                        }
                    }
                }
            }
        } else if let Some(grav) = gravity.as_ref() {
            // Static potential with the half-step density, energy terms
            // averaged over the adjacent mass fluxes.
            for k in ks..=ke {
                for j in js..=je {
                    for i in is..=ie {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);
                        let dh = match self.dhalf.as_ref() {
                            Some(dhalf) => dhalf[(k, j, i)],
                            None => g.u[(k, j, i)].d,
                        };

                        let phic = grav.phi(x1, x2, x3);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                        g.u[(k, j, i)].m1 -= dtodx1 * (phir - phil) * dh;
                        if adiabatic {
                            g.u[(k, j, i)].e -= dtodx1
                                * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                    + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                        }

                        let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3);
                        let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                        g.u[(k, j, i)].m2 -= dtodx2 * (phir - phil) * dh;
                        if adiabatic {
                            g.u[(k, j, i)].e -= dtodx2
                                * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                    + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                        }

                        let phir = grav.phi(x1, x2, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                        g.u[(k, j, i)].m3 -= dtodx3 * (phir - phil) * dh;
                        if adiabatic {
                            g.u[(k, j, i)].e -= dtodx3
                                * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                    + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                        }
                    }
                }
            }
        }

        // Self-gravity in momentum-flux form. A flux correction with the new
        // potential in the caller's loop makes these terms second order.
        if let Some(sg) = self_gravity {
            if let Some(phi) = g.phi.as_ref() {
                let inv_4pg = 1.0 / sg.four_pi_g;

                // d/dx1 terms.
                for k in ks..=ke {
                    for j in js..=je {
                        for i in is..=ie {
                            let phic = phi[(k, j, i)];
                            let phil = 0.5 * (phi[(k, j, i - 1)] + phi[(k, j, i)]);
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j, i + 1)]);

                            let gxl = (phi[(k, j, i - 1)] - phi[(k, j, i)]) * dx1i;
                            let gxr = (phi[(k, j, i)] - phi[(k, j, i + 1)]) * dx1i;
                            let gyl = 0.25
                                * ((phi[(k, j - 1, i - 1)] - phi[(k, j + 1, i - 1)])
                                    + (phi[(k, j - 1, i)] - phi[(k, j + 1, i)]))
                                * dx2i;
                            let gyr = 0.25
                                * ((phi[(k, j - 1, i)] - phi[(k, j + 1, i)])
                                    + (phi[(k, j - 1, i + 1)] - phi[(k, j + 1, i + 1)]))
                                * dx2i;
                            let gzl = 0.25
                                * ((phi[(k - 1, j, i - 1)] - phi[(k + 1, j, i - 1)])
                                    + (phi[(k - 1, j, i)] - phi[(k + 1, j, i)]))
                                * dx3i;
                            let gzr = 0.25
                                * ((phi[(k - 1, j, i)] - phi[(k + 1, j, i)])
                                    + (phi[(k - 1, j, i + 1)] - phi[(k + 1, j, i + 1)]))
                                * dx3i;

                            // The mean-density term realises the Jeans swindle.
                            let flx_m1l = 0.5 * (gxl * gxl - gyl * gyl - gzl * gzl) * inv_4pg
                                + sg.grav_mean_rho * phil;
                            let flx_m1r = 0.5 * (gxr * gxr - gyr * gyr - gzr * gzr) * inv_4pg
                                + sg.grav_mean_rho * phir;
                            let flx_m2l = gxl * gyl * inv_4pg;
                            let flx_m2r = gxr * gyr * inv_4pg;
                            let flx_m3l = gxl * gzl * inv_4pg;
                            let flx_m3r = gxr * gzr * inv_4pg;

                            let u = &mut g.u[(k, j, i)];
                            u.m1 -= dtodx1 * (flx_m1r - flx_m1l);
                            u.m2 -= dtodx1 * (flx_m2r - flx_m2l);
                            u.m3 -= dtodx1 * (flx_m3r - flx_m3l);
                            if adiabatic {
                                u.e -= dtodx1
                                    * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                        + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                            }
                        }
                    }
                }

                // d/dx2 terms.
                for k in ks..=ke {
                    for j in js..=je {
                        for i in is..=ie {
                            let phic = phi[(k, j, i)];
                            let phil = 0.5 * (phi[(k, j - 1, i)] + phi[(k, j, i)]);
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j + 1, i)]);

                            let gxl = 0.25
                                * ((phi[(k, j - 1, i - 1)] - phi[(k, j - 1, i + 1)])
                                    + (phi[(k, j, i - 1)] - phi[(k, j, i + 1)]))
                                * dx1i;
                            let gxr = 0.25
                                * ((phi[(k, j, i - 1)] - phi[(k, j, i + 1)])
                                    + (phi[(k, j + 1, i - 1)] - phi[(k, j + 1, i + 1)]))
                                * dx1i;
                            let gyl = (phi[(k, j - 1, i)] - phi[(k, j, i)]) * dx2i;
                            let gyr = (phi[(k, j, i)] - phi[(k, j + 1, i)]) * dx2i;
                            let gzl = 0.25
                                * ((phi[(k - 1, j - 1, i)] - phi[(k + 1, j - 1, i)])
                                    + (phi[(k - 1, j, i)] - phi[(k + 1, j, i)]))
                                * dx3i;
                            let gzr = 0.25
                                * ((phi[(k - 1, j, i)] - phi[(k + 1, j, i)])
                                    + (phi[(k - 1, j + 1, i)] - phi[(k + 1, j + 1, i)]))
                                * dx3i;

                            let flx_m1l = gyl * gxl * inv_4pg;
                            let flx_m1r = gyr * gxr * inv_4pg;
                            let flx_m2l = 0.5 * (gyl * gyl - gxl * gxl - gzl * gzl) * inv_4pg
                                + sg.grav_mean_rho * phil;
                            let flx_m2r = 0.5 * (gyr * gyr - gxr * gxr - gzr * gzr) * inv_4pg
                                + sg.grav_mean_rho * phir;
                            let flx_m3l = gyl * gzl * inv_4pg;
                            let flx_m3r = gyr * gzr * inv_4pg;

                            let u = &mut g.u[(k, j, i)];
                            u.m1 -= dtodx2 * (flx_m1r - flx_m1l);
                            u.m2 -= dtodx2 * (flx_m2r - flx_m2l);
                            u.m3 -= dtodx2 * (flx_m3r - flx_m3l);
                            if adiabatic {
                                u.e -= dtodx2
                                    * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                        + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                            }
                        }
                    }
                }

                // d/dx3 terms.
                for k in ks..=ke {
                    for j in js..=je {
                        for i in is..=ie {
                            let phic = phi[(k, j, i)];
                            let phil = 0.5 * (phi[(k - 1, j, i)] + phi[(k, j, i)]);
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k + 1, j, i)]);

                            let gxl = 0.25
                                * ((phi[(k - 1, j, i - 1)] - phi[(k - 1, j, i + 1)])
                                    + (phi[(k, j, i - 1)] - phi[(k, j, i + 1)]))
                                * dx1i;
                            let gxr = 0.25
                                * ((phi[(k, j, i - 1)] - phi[(k, j, i + 1)])
                                    + (phi[(k + 1, j, i - 1)] - phi[(k + 1, j, i + 1)]))
                                * dx1i;
                            let gyl = 0.25
                                * ((phi[(k - 1, j - 1, i)] - phi[(k - 1, j + 1, i)])
                                    + (phi[(k, j - 1, i)] - phi[(k, j + 1, i)]))
                                * dx2i;
                            let gyr = 0.25
                                * ((phi[(k, j - 1, i)] - phi[(k, j + 1, i)])
                                    + (phi[(k + 1, j - 1, i)] - phi[(k + 1, j + 1, i)]))
                                * dx2i;
                            let gzl = (phi[(k - 1, j, i)] - phi[(k, j, i)]) * dx3i;
                            let gzr = (phi[(k, j, i)] - phi[(k + 1, j, i)]) * dx3i;

                            let flx_m1l = gzl * gxl * inv_4pg;
                            let flx_m1r = gzr * gxr * inv_4pg;
                            let flx_m2l = gzl * gyl * inv_4pg;
                            let flx_m2r = gzr * gyr * inv_4pg;
                            let flx_m3l = 0.5 * (gzl * gzl - gxl * gxl - gyl * gyl) * inv_4pg
                                + sg.grav_mean_rho * phil;
                            let flx_m3r = 0.5 * (gzr * gzr - gxr * gxr - gyr * gyr) * inv_4pg
                                + sg.grav_mean_rho * phir;

                            let u = &mut g.u[(k, j, i)];
                            u.m1 -= dtodx3 * (flx_m1r - flx_m1l);
                            u.m2 -= dtodx3 * (flx_m2r - flx_m2l);
                            u.m3 -= dtodx3 * (flx_m3r - flx_m3l);
                            if adiabatic {
                                u.e -= dtodx3
                                    * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                            }
                        }
                    }
                }

                // Save the interface mass fluxes for the caller's
                // second-order flux correction with the new potential.
                if let Some(mf) = g.mass_flux.as_mut() {
                    for k in ks..=(ke + 1) {
                        for j in js..=(je + 1) {
                            for i in is..=(ie + 1) {
                                mf.x1[(k, j, i)] = self.x1_flux[(k, j, i)].d;
                                mf.x2[(k, j, i)] = self.x2_flux[(k, j, i)].d;
                                mf.x3[(k, j, i)] = self.x3_flux[(k, j, i)].d;
                            }
                        }
                    }
                }
            }
        }

        // Optically thin cooling with the half-step state.
        if adiabatic {
            if let Some(cool) = cooling.as_ref() {
                if let (Some(dhalf), Some(phalf)) = (self.dhalf.as_ref(), self.phalf.as_ref()) {
                    for k in ks..=ke {
                        for j in js..=je {
                            for i in is..=ie {
                                let coolf =
                                    cool.rate(dhalf[(k, j, i)], phalf[(k, j, i)], g.dt);
                                g.u[(k, j, i)].e -= g.dt * coolf;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Phase 12: flux-divergence update of the cell-centered state and the
    /// final averaging of the face fields to cell centers.
    pub(super) fn cell_update(&mut self, g: &mut Grid) {
        let adiabatic = self.cfg.eos.is_adiabatic();
        let mhd = self.cfg.mhd;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx1 = g.dt / g.dx1;
        let dtodx2 = g.dt / g.dx2;
        let dtodx3 = g.dt / g.dx3;

        // x1-fluxes.
        for k in ks..=ke {
            for j in js..=je {
                for i in is..=ie {
                    let fp = self.x1_flux[(k, j, i + 1)];
                    let fm = self.x1_flux[(k, j, i)];
                    let u = &mut g.u[(k, j, i)];
                    u.d -= dtodx1 * (fp.d - fm.d);
                    u.m1 -= dtodx1 * (fp.mx - fm.mx);
                    u.m2 -= dtodx1 * (fp.my - fm.my);
                    u.m3 -= dtodx1 * (fp.mz - fm.mz);
                    if adiabatic {
                        u.e -= dtodx1 * (fp.e - fm.e);
                    }
                    for n in 0..NSCALARS {
                        u.s[n] -= dtodx1 * (fp.s[n] - fm.s[n]);
                    }
                }
            }
        }

        // x2-fluxes: (x,y,z) on the sweep frame maps to (M2, M3, M1).
        for k in ks..=ke {
            for j in js..=je {
                for i in is..=ie {
                    let fp = self.x2_flux[(k, j + 1, i)];
                    let fm = self.x2_flux[(k, j, i)];
                    let u = &mut g.u[(k, j, i)];
                    u.d -= dtodx2 * (fp.d - fm.d);
                    u.m1 -= dtodx2 * (fp.mz - fm.mz);
                    u.m2 -= dtodx2 * (fp.mx - fm.mx);
                    u.m3 -= dtodx2 * (fp.my - fm.my);
                    if adiabatic {
                        u.e -= dtodx2 * (fp.e - fm.e);
                    }
                    for n in 0..NSCALARS {
                        u.s[n] -= dtodx2 * (fp.s[n] - fm.s[n]);
                    }
                }
            }
        }

        // x3-fluxes: (x,y,z) on the sweep frame maps to (M3, M1, M2).
        for k in ks..=ke {
            for j in js..=je {
                for i in is..=ie {
                    let fp = self.x3_flux[(k + 1, j, i)];
                    let fm = self.x3_flux[(k, j, i)];
                    let u = &mut g.u[(k, j, i)];
                    u.d -= dtodx3 * (fp.d - fm.d);
                    u.m1 -= dtodx3 * (fp.my - fm.my);
                    u.m2 -= dtodx3 * (fp.mz - fm.mz);
                    u.m3 -= dtodx3 * (fp.mx - fm.mx);
                    if adiabatic {
                        u.e -= dtodx3 * (fp.e - fm.e);
                    }
                    for n in 0..NSCALARS {
                        u.s[n] -= dtodx3 * (fp.s[n] - fm.s[n]);
                    }
                }
            }
        }

        // Set the cell-centered field to the average of the updated face
        // fields. This must come after the full-step CT update.
        if mhd {
            for k in ks..=ke {
                for j in js..=je {
                    for i in is..=ie {
                        let b1c = 0.5 * (g.b1i[(k, j, i)] + g.b1i[(k, j, i + 1)]);
                        let b2c = 0.5 * (g.b2i[(k, j, i)] + g.b2i[(k, j + 1, i)]);
                        let b3c = 0.5 * (g.b3i[(k, j, i)] + g.b3i[(k + 1, j, i)]);
                        let u = &mut g.u[(k, j, i)];
                        u.b1c = b1c;
                        u.b2c = b2c;
                        u.b3c = b3c;
                    }
                }
            }
        }
    }
}
