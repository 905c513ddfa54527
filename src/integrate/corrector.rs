//! Phases 5-7: transverse-flux correction of the interface states.
//!
//! Each direction's left/right states are corrected by Δt/2 of the transverse
//! flux gradients from the other two directions. The conserved components on
//! a face are in that face's rotated frame while the transverse fluxes are in
//! their own, so the momentum components are remapped through the fixed
//! cyclic permutation; scalars and density map directly. The transverse face
//! field components are advanced from the corner EMFs, the limited MHD source
//! terms of Gardiner & Stone (2008) are added, and the gravity and
//! shearing-box half-step sources are applied with flux-weighted energy
//! averaging.

use crate::grid::Grid;
use crate::state::NSCALARS;

use super::{min_mod_opposed, Integrator3D};

impl Integrator3D {
    /// Correct the x1-interface states with x2- and x3-flux gradients.
    pub(super) fn correct_x1(&mut self, g: &Grid) {
        let adiabatic = self.cfg.eos.is_adiabatic();
        let mhd = self.cfg.mhd;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let q2 = 0.5 * g.dt / g.dx2;
        let q3 = 0.5 * g.dt / g.dx3;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        // x2-flux gradients: sweep frame (x,y,z) -> x1 frame (z,x,y).
        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 2) {
                    {
                        let fp = self.x2_flux[(k, j + 1, i - 1)];
                        let fm = self.x2_flux[(k, j, i - 1)];
                        let ul = &mut self.ul_x1[(k, j, i)];
                        ul.d -= q2 * (fp.d - fm.d);
                        ul.mx -= q2 * (fp.mz - fm.mz);
                        ul.my -= q2 * (fp.mx - fm.mx);
                        ul.mz -= q2 * (fp.my - fm.my);
                        if adiabatic {
                            ul.e -= q2 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q2 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x1[(k, j, i)].bz += q2
                            * 0.5
                            * ((self.emf1[(k, j + 1, i - 1)] - self.emf1[(k, j, i - 1)])
                                + (self.emf1[(k + 1, j + 1, i - 1)]
                                    - self.emf1[(k + 1, j, i - 1)]));
                    }

                    {
                        let fp = self.x2_flux[(k, j + 1, i)];
                        let fm = self.x2_flux[(k, j, i)];
                        let ur = &mut self.ur_x1[(k, j, i)];
                        ur.d -= q2 * (fp.d - fm.d);
                        ur.mx -= q2 * (fp.mz - fm.mz);
                        ur.my -= q2 * (fp.mx - fm.mx);
                        ur.mz -= q2 * (fp.my - fm.my);
                        if adiabatic {
                            ur.e -= q2 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q2 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x1[(k, j, i)].bz += q2
                            * 0.5
                            * ((self.emf1[(k, j + 1, i)] - self.emf1[(k, j, i)])
                                + (self.emf1[(k + 1, j + 1, i)] - self.emf1[(k + 1, j, i)]));
                    }

                    // x3-flux gradients: sweep frame (x,y,z) -> x1 frame (y,z,x).
                    {
                        let fp = self.x3_flux[(k + 1, j, i - 1)];
                        let fm = self.x3_flux[(k, j, i - 1)];
                        let ul = &mut self.ul_x1[(k, j, i)];
                        ul.d -= q3 * (fp.d - fm.d);
                        ul.mx -= q3 * (fp.my - fm.my);
                        ul.my -= q3 * (fp.mz - fm.mz);
                        ul.mz -= q3 * (fp.mx - fm.mx);
                        if adiabatic {
                            ul.e -= q3 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q3 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x1[(k, j, i)].by -= q3
                            * 0.5
                            * ((self.emf1[(k + 1, j, i - 1)] - self.emf1[(k, j, i - 1)])
                                + (self.emf1[(k + 1, j + 1, i - 1)]
                                    - self.emf1[(k, j + 1, i - 1)]));
                    }

                    {
                        let fp = self.x3_flux[(k + 1, j, i)];
                        let fm = self.x3_flux[(k, j, i)];
                        let ur = &mut self.ur_x1[(k, j, i)];
                        ur.d -= q3 * (fp.d - fm.d);
                        ur.mx -= q3 * (fp.my - fm.my);
                        ur.my -= q3 * (fp.mz - fm.mz);
                        ur.mz -= q3 * (fp.mx - fm.mx);
                        if adiabatic {
                            ur.e -= q3 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q3 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x1[(k, j, i)].by -= q3
                            * 0.5
                            * ((self.emf1[(k + 1, j, i)] - self.emf1[(k, j, i)])
                                + (self.emf1[(k + 1, j + 1, i)] - self.emf1[(k, j + 1, i)]));
                    }
                }
            }
        }

        // Limited MHD source terms from the transverse flux gradients.
        if mhd {
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 2) {
                        // Left state: zone i-1.
                        let db1 = (g.b1i[(k, j, i)] - g.b1i[(k, j, i - 1)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i - 1)] - g.b2i[(k, j, i - 1)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i - 1)] - g.b3i[(k, j, i - 1)]) * dx3i;
                        let uz = &g.u[(k, j, i - 1)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v2 = uz.m2 / uz.d;
                        let v3 = uz.m3 / uz.d;
                        let mdb2 = min_mod_opposed(db1, db2);
                        let mdb3 = min_mod_opposed(db1, db3);

                        let ul = &mut self.ul_x1[(k, j, i)];
                        ul.mx += hdt * b1 * db1;
                        ul.my += hdt * b2 * db1;
                        ul.mz += hdt * b3 * db1;
                        ul.by += hdt * v2 * (-mdb3);
                        ul.bz += hdt * v3 * (-mdb2);
                        if adiabatic {
                            ul.e += hdt * (b2 * v2 * (-mdb3) + b3 * v3 * (-mdb2));
                        }

                        // Right state: zone i.
                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let uz = &g.u[(k, j, i)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v2 = uz.m2 / uz.d;
                        let v3 = uz.m3 / uz.d;
                        let mdb2 = min_mod_opposed(db1, db2);
                        let mdb3 = min_mod_opposed(db1, db3);

                        let ur = &mut self.ur_x1[(k, j, i)];
                        ur.mx += hdt * b1 * db1;
                        ur.my += hdt * b2 * db1;
                        ur.mz += hdt * b3 * db1;
                        ur.by += hdt * v2 * (-mdb3);
                        ur.bz += hdt * v3 * (-mdb2);
                        if adiabatic {
                            ur.e += hdt * (b2 * v2 * (-mdb3) + b3 * v3 * (-mdb2));
                        }
                    }
                }
            }
        }

        // Static potential: transverse momentum sources, with the energy
        // terms averaged over the adjacent mass fluxes for conservation.
        if let Some(grav) = self.cfg.gravity.clone() {
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 2) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);

                        // Right state (cell i): x2 and x3 gradients.
                        let phic = grav.phi(x1, x2, x3);
                        let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3);
                        let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                        {
                            let ur = &mut self.ur_x1[(k, j, i)];
                            ur.my -= q2 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q2
                                    * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                        + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1, x2, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                        {
                            let ur = &mut self.ur_x1[(k, j, i)];
                            ur.mz -= q3 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q3
                                    * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                            }
                        }

                        // Left state (cell i-1).
                        let x1l = x1 - g.dx1;
                        let phic = grav.phi(x1l, x2, x3);
                        let phir = grav.phi(x1l, x2 + 0.5 * g.dx2, x3);
                        let phil = grav.phi(x1l, x2 - 0.5 * g.dx2, x3);
                        {
                            let ul = &mut self.ul_x1[(k, j, i)];
                            ul.my -= q2 * (phir - phil) * g.u[(k, j, i - 1)].d;
                            if adiabatic {
                                ul.e -= q2
                                    * (self.x2_flux[(k, j, i - 1)].d * (phic - phil)
                                        + self.x2_flux[(k, j + 1, i - 1)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1l, x2, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1l, x2, x3 - 0.5 * g.dx3);
                        {
                            let ul = &mut self.ul_x1[(k, j, i)];
                            ul.mz -= q3 * (phir - phil) * g.u[(k, j, i - 1)].d;
                            if adiabatic {
                                ul.e -= q3
                                    * (self.x3_flux[(k, j, i - 1)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j, i - 1)].d * (phir - phic));
                            }
                        }
                    }
                }
            }
        }

        // Self-gravity: same structure with face-averaged potentials.
        if self.cfg.self_gravity.is_some() {
            if let Some(phi) = g.phi.as_ref() {
                for k in (ks - 1)..=(ke + 1) {
                    for j in (js - 1)..=(je + 1) {
                        for i in (is - 1)..=(ie + 2) {
                            let phic = phi[(k, j, i)];
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j + 1, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j - 1, i)]);
                            {
                                let ur = &mut self.ur_x1[(k, j, i)];
                                ur.my -= q2 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q2
                                        * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                            + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k + 1, j, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k - 1, j, i)]);
                            {
                                let ur = &mut self.ur_x1[(k, j, i)];
                                ur.mz -= q3 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q3
                                        * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                            + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                                }
                            }

                            let phic = phi[(k, j, i - 1)];
                            let phir = 0.5 * (phi[(k, j, i - 1)] + phi[(k, j + 1, i - 1)]);
                            let phil = 0.5 * (phi[(k, j, i - 1)] + phi[(k, j - 1, i - 1)]);
                            {
                                let ul = &mut self.ul_x1[(k, j, i)];
                                ul.my -= q2 * (phir - phil) * g.u[(k, j, i - 1)].d;
                                if adiabatic {
                                    ul.e -= q2
                                        * (self.x2_flux[(k, j, i - 1)].d * (phic - phil)
                                            + self.x2_flux[(k, j + 1, i - 1)].d
                                                * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k, j, i - 1)] + phi[(k + 1, j, i - 1)]);
                            let phil = 0.5 * (phi[(k, j, i - 1)] + phi[(k - 1, j, i - 1)]);
                            {
                                let ul = &mut self.ul_x1[(k, j, i)];
                                ul.mz -= q3 * (phir - phil) * g.u[(k, j, i - 1)].d;
                                if adiabatic {
                                    ul.e -= q3
                                        * (self.x3_flux[(k, j, i - 1)].d * (phic - phil)
                                            + self.x3_flux[(k + 1, j, i - 1)].d
                                                * (phir - phic));
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Correct the x2-interface states with x1- and x3-flux gradients.
    pub(super) fn correct_x2(&mut self, g: &Grid) {
        let adiabatic = self.cfg.eos.is_adiabatic();
        let mhd = self.cfg.mhd;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let q1 = 0.5 * g.dt / g.dx1;
        let q3 = 0.5 * g.dt / g.dx3;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        // x1-flux gradients: sweep frame (x,y,z) -> x2 frame (y,z,x).
        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 2) {
                for i in (is - 1)..=(ie + 1) {
                    {
                        let fp = self.x1_flux[(k, j - 1, i + 1)];
                        let fm = self.x1_flux[(k, j - 1, i)];
                        let ul = &mut self.ul_x2[(k, j, i)];
                        ul.d -= q1 * (fp.d - fm.d);
                        ul.mx -= q1 * (fp.my - fm.my);
                        ul.my -= q1 * (fp.mz - fm.mz);
                        ul.mz -= q1 * (fp.mx - fm.mx);
                        if adiabatic {
                            ul.e -= q1 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q1 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x2[(k, j, i)].by -= q1
                            * 0.5
                            * ((self.emf2[(k, j - 1, i + 1)] - self.emf2[(k, j - 1, i)])
                                + (self.emf2[(k + 1, j - 1, i + 1)]
                                    - self.emf2[(k + 1, j - 1, i)]));
                    }

                    {
                        let fp = self.x1_flux[(k, j, i + 1)];
                        let fm = self.x1_flux[(k, j, i)];
                        let ur = &mut self.ur_x2[(k, j, i)];
                        ur.d -= q1 * (fp.d - fm.d);
                        ur.mx -= q1 * (fp.my - fm.my);
                        ur.my -= q1 * (fp.mz - fm.mz);
                        ur.mz -= q1 * (fp.mx - fm.mx);
                        if adiabatic {
                            ur.e -= q1 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q1 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x2[(k, j, i)].by -= q1
                            * 0.5
                            * ((self.emf2[(k, j, i + 1)] - self.emf2[(k, j, i)])
                                + (self.emf2[(k + 1, j, i + 1)] - self.emf2[(k + 1, j, i)]));
                    }

                    // x3-flux gradients: sweep frame (x,y,z) -> x2 frame (z,x,y).
                    {
                        let fp = self.x3_flux[(k + 1, j - 1, i)];
                        let fm = self.x3_flux[(k, j - 1, i)];
                        let ul = &mut self.ul_x2[(k, j, i)];
                        ul.d -= q3 * (fp.d - fm.d);
                        ul.mx -= q3 * (fp.mz - fm.mz);
                        ul.my -= q3 * (fp.mx - fm.mx);
                        ul.mz -= q3 * (fp.my - fm.my);
                        if adiabatic {
                            ul.e -= q3 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q3 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x2[(k, j, i)].bz += q3
                            * 0.5
                            * ((self.emf2[(k + 1, j - 1, i)] - self.emf2[(k, j - 1, i)])
                                + (self.emf2[(k + 1, j - 1, i + 1)]
                                    - self.emf2[(k, j - 1, i + 1)]));
                    }

                    {
                        let fp = self.x3_flux[(k + 1, j, i)];
                        let fm = self.x3_flux[(k, j, i)];
                        let ur = &mut self.ur_x2[(k, j, i)];
                        ur.d -= q3 * (fp.d - fm.d);
                        ur.mx -= q3 * (fp.mz - fm.mz);
                        ur.my -= q3 * (fp.mx - fm.mx);
                        ur.mz -= q3 * (fp.my - fm.my);
                        if adiabatic {
                            ur.e -= q3 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q3 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x2[(k, j, i)].bz += q3
                            * 0.5
                            * ((self.emf2[(k + 1, j, i)] - self.emf2[(k, j, i)])
                                + (self.emf2[(k + 1, j, i + 1)] - self.emf2[(k, j, i + 1)]));
                    }
                }
            }
        }

        if mhd {
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 2) {
                    for i in (is - 1)..=(ie + 1) {
                        // Left state: zone j-1.
                        let db1 = (g.b1i[(k, j - 1, i + 1)] - g.b1i[(k, j - 1, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j, i)] - g.b2i[(k, j - 1, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j - 1, i)] - g.b3i[(k, j - 1, i)]) * dx3i;
                        let uz = &g.u[(k, j - 1, i)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v1 = uz.m1 / uz.d;
                        let v3 = uz.m3 / uz.d;
                        let mdb1 = min_mod_opposed(db2, db1);
                        let mdb3 = min_mod_opposed(db2, db3);

                        let ul = &mut self.ul_x2[(k, j, i)];
                        ul.mz += hdt * b1 * db2;
                        ul.mx += hdt * b2 * db2;
                        ul.my += hdt * b3 * db2;
                        ul.by += hdt * v3 * (-mdb1);
                        ul.bz += hdt * v1 * (-mdb3);
                        if adiabatic {
                            ul.e += hdt * (b3 * v3 * (-mdb1) + b1 * v1 * (-mdb3));
                        }

                        // Right state: zone j.
                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let uz = &g.u[(k, j, i)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v1 = uz.m1 / uz.d;
                        let v3 = uz.m3 / uz.d;
                        let mdb1 = min_mod_opposed(db2, db1);
                        let mdb3 = min_mod_opposed(db2, db3);

                        let ur = &mut self.ur_x2[(k, j, i)];
                        ur.mz += hdt * b1 * db2;
                        ur.mx += hdt * b2 * db2;
                        ur.my += hdt * b3 * db2;
                        ur.by += hdt * v3 * (-mdb1);
                        ur.bz += hdt * v1 * (-mdb3);
                        if adiabatic {
                            ur.e += hdt * (b3 * v3 * (-mdb1) + b1 * v1 * (-mdb3));
                        }
                    }
                }
            }
        }

        if let Some(grav) = self.cfg.gravity.clone() {
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 2) {
                    for i in (is - 1)..=(ie + 1) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);

                        // Right state (cell j): x1 and x3 gradients.
                        let phic = grav.phi(x1, x2, x3);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                        {
                            let ur = &mut self.ur_x2[(k, j, i)];
                            ur.mz -= q1 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q1
                                    * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                        + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1, x2, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1, x2, x3 - 0.5 * g.dx3);
                        {
                            let ur = &mut self.ur_x2[(k, j, i)];
                            ur.my -= q3 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q3
                                    * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                            }
                        }

                        // Left state (cell j-1).
                        let x2l = x2 - g.dx2;
                        let phic = grav.phi(x1, x2l, x3);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2l, x3);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2l, x3);
                        {
                            let ul = &mut self.ul_x2[(k, j, i)];
                            ul.mz -= q1 * (phir - phil) * g.u[(k, j - 1, i)].d;
                            if adiabatic {
                                ul.e -= q1
                                    * (self.x1_flux[(k, j - 1, i)].d * (phic - phil)
                                        + self.x1_flux[(k, j - 1, i + 1)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1, x2l, x3 + 0.5 * g.dx3);
                        let phil = grav.phi(x1, x2l, x3 - 0.5 * g.dx3);
                        {
                            let ul = &mut self.ul_x2[(k, j, i)];
                            ul.my -= q3 * (phir - phil) * g.u[(k, j - 1, i)].d;
                            if adiabatic {
                                ul.e -= q3
                                    * (self.x3_flux[(k, j - 1, i)].d * (phic - phil)
                                        + self.x3_flux[(k + 1, j - 1, i)].d * (phir - phic));
                            }
                        }
                    }
                }
            }
        }

        if self.cfg.self_gravity.is_some() {
            if let Some(phi) = g.phi.as_ref() {
                for k in (ks - 1)..=(ke + 1) {
                    for j in (js - 1)..=(je + 2) {
                        for i in (is - 1)..=(ie + 1) {
                            let phic = phi[(k, j, i)];
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j, i + 1)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j, i - 1)]);
                            {
                                let ur = &mut self.ur_x2[(k, j, i)];
                                ur.mz -= q1 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q1
                                        * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                            + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k + 1, j, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k - 1, j, i)]);
                            {
                                let ur = &mut self.ur_x2[(k, j, i)];
                                ur.my -= q3 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q3
                                        * (self.x3_flux[(k, j, i)].d * (phic - phil)
                                            + self.x3_flux[(k + 1, j, i)].d * (phir - phic));
                                }
                            }

                            let phic = phi[(k, j - 1, i)];
                            let phir = 0.5 * (phi[(k, j - 1, i)] + phi[(k, j - 1, i + 1)]);
                            let phil = 0.5 * (phi[(k, j - 1, i)] + phi[(k, j - 1, i - 1)]);
                            {
                                let ul = &mut self.ul_x2[(k, j, i)];
                                ul.mz -= q1 * (phir - phil) * g.u[(k, j - 1, i)].d;
                                if adiabatic {
                                    ul.e -= q1
                                        * (self.x1_flux[(k, j - 1, i)].d * (phic - phil)
                                            + self.x1_flux[(k, j - 1, i + 1)].d
                                                * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k, j - 1, i)] + phi[(k + 1, j - 1, i)]);
                            let phil = 0.5 * (phi[(k, j - 1, i)] + phi[(k - 1, j - 1, i)]);
                            {
                                let ul = &mut self.ul_x2[(k, j, i)];
                                ul.my -= q3 * (phir - phil) * g.u[(k, j - 1, i)].d;
                                if adiabatic {
                                    ul.e -= q3
                                        * (self.x3_flux[(k, j - 1, i)].d * (phic - phil)
                                            + self.x3_flux[(k + 1, j - 1, i)].d
                                                * (phir - phic));
                                }
                            }
                        }
                    }
                }
            }
        }

        // Shearing-box Coriolis terms; on an x2 face the rotated Mz is the
        // x1-momentum and Mx the x2-momentum.
        if let Some(sb) = self.cfg.shearing_box.clone() {
            let om = sb.omega;
            let coef = if sb.fargo { 0.25 } else { 1.0 };
            for k in (ks - 1)..=(ke + 1) {
                for j in (js - 1)..=(je + 2) {
                    for i in (is - 1)..=(ie + 1) {
                        {
                            let ur = &mut self.ur_x2[(k, j, i)];
                            ur.mz += g.dt * om * g.u[(k, j, i)].m2;
                            ur.mx -= coef * g.dt * om * g.u[(k, j, i)].m1;
                        }
                        {
                            let ul = &mut self.ul_x2[(k, j, i)];
                            ul.mz += g.dt * om * g.u[(k, j - 1, i)].m2;
                            ul.mx -= coef * g.dt * om * g.u[(k, j - 1, i)].m1;
                        }
                    }
                }
            }
        }
    }

    /// Correct the x3-interface states with x1- and x2-flux gradients.
    pub(super) fn correct_x3(&mut self, g: &Grid) {
        let adiabatic = self.cfg.eos.is_adiabatic();
        let mhd = self.cfg.mhd;
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let q1 = 0.5 * g.dt / g.dx1;
        let q2 = 0.5 * g.dt / g.dx2;
        let hdt = 0.5 * g.dt;
        let (dx1i, dx2i, dx3i) = (1.0 / g.dx1, 1.0 / g.dx2, 1.0 / g.dx3);

        // x1-flux gradients: sweep frame (x,y,z) -> x3 frame (z,x,y).
        for k in (ks - 1)..=(ke + 2) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    {
                        let fp = self.x1_flux[(k - 1, j, i + 1)];
                        let fm = self.x1_flux[(k - 1, j, i)];
                        let ul = &mut self.ul_x3[(k, j, i)];
                        ul.d -= q1 * (fp.d - fm.d);
                        ul.mx -= q1 * (fp.mz - fm.mz);
                        ul.my -= q1 * (fp.mx - fm.mx);
                        ul.mz -= q1 * (fp.my - fm.my);
                        if adiabatic {
                            ul.e -= q1 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q1 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x3[(k, j, i)].bz += q1
                            * 0.5
                            * ((self.emf3[(k - 1, j, i + 1)] - self.emf3[(k - 1, j, i)])
                                + (self.emf3[(k - 1, j + 1, i + 1)]
                                    - self.emf3[(k - 1, j + 1, i)]));
                    }

                    {
                        let fp = self.x1_flux[(k, j, i + 1)];
                        let fm = self.x1_flux[(k, j, i)];
                        let ur = &mut self.ur_x3[(k, j, i)];
                        ur.d -= q1 * (fp.d - fm.d);
                        ur.mx -= q1 * (fp.mz - fm.mz);
                        ur.my -= q1 * (fp.mx - fm.mx);
                        ur.mz -= q1 * (fp.my - fm.my);
                        if adiabatic {
                            ur.e -= q1 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q1 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x3[(k, j, i)].bz += q1
                            * 0.5
                            * ((self.emf3[(k, j, i + 1)] - self.emf3[(k, j, i)])
                                + (self.emf3[(k, j + 1, i + 1)] - self.emf3[(k, j + 1, i)]));
                    }

                    // x2-flux gradients: sweep frame (x,y,z) -> x3 frame (y,z,x).
                    {
                        let fp = self.x2_flux[(k - 1, j + 1, i)];
                        let fm = self.x2_flux[(k - 1, j, i)];
                        let ul = &mut self.ul_x3[(k, j, i)];
                        ul.d -= q2 * (fp.d - fm.d);
                        ul.mx -= q2 * (fp.my - fm.my);
                        ul.my -= q2 * (fp.mz - fm.mz);
                        ul.mz -= q2 * (fp.mx - fm.mx);
                        if adiabatic {
                            ul.e -= q2 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ul.s[n] -= q2 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ul_x3[(k, j, i)].by -= q2
                            * 0.5
                            * ((self.emf3[(k - 1, j + 1, i)] - self.emf3[(k - 1, j, i)])
                                + (self.emf3[(k - 1, j + 1, i + 1)]
                                    - self.emf3[(k - 1, j, i + 1)]));
                    }

                    {
                        let fp = self.x2_flux[(k, j + 1, i)];
                        let fm = self.x2_flux[(k, j, i)];
                        let ur = &mut self.ur_x3[(k, j, i)];
                        ur.d -= q2 * (fp.d - fm.d);
                        ur.mx -= q2 * (fp.my - fm.my);
                        ur.my -= q2 * (fp.mz - fm.mz);
                        ur.mz -= q2 * (fp.mx - fm.mx);
                        if adiabatic {
                            ur.e -= q2 * (fp.e - fm.e);
                        }
                        for n in 0..NSCALARS {
                            ur.s[n] -= q2 * (fp.s[n] - fm.s[n]);
                        }
                    }
                    if mhd {
                        self.ur_x3[(k, j, i)].by -= q2
                            * 0.5
                            * ((self.emf3[(k, j + 1, i)] - self.emf3[(k, j, i)])
                                + (self.emf3[(k, j + 1, i + 1)] - self.emf3[(k, j, i + 1)]));
                    }
                }
            }
        }

        if mhd {
            for k in (ks - 1)..=(ke + 2) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 1) {
                        // Left state: zone k-1.
                        let db1 = (g.b1i[(k - 1, j, i + 1)] - g.b1i[(k - 1, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k - 1, j + 1, i)] - g.b2i[(k - 1, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k, j, i)] - g.b3i[(k - 1, j, i)]) * dx3i;
                        let uz = &g.u[(k - 1, j, i)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v1 = uz.m1 / uz.d;
                        let v2 = uz.m2 / uz.d;
                        let mdb1 = min_mod_opposed(db3, db1);
                        let mdb2 = min_mod_opposed(db3, db2);

                        let ul = &mut self.ul_x3[(k, j, i)];
                        ul.my += hdt * b1 * db3;
                        ul.mz += hdt * b2 * db3;
                        ul.mx += hdt * b3 * db3;
                        ul.by += hdt * v1 * (-mdb2);
                        ul.bz += hdt * v2 * (-mdb1);
                        if adiabatic {
                            ul.e += hdt * (b1 * v1 * (-mdb2) + b2 * v2 * (-mdb1));
                        }

                        // Right state: zone k.
                        let db1 = (g.b1i[(k, j, i + 1)] - g.b1i[(k, j, i)]) * dx1i;
                        let db2 = (g.b2i[(k, j + 1, i)] - g.b2i[(k, j, i)]) * dx2i;
                        let db3 = (g.b3i[(k + 1, j, i)] - g.b3i[(k, j, i)]) * dx3i;
                        let uz = &g.u[(k, j, i)];
                        let (b1, b2, b3) = (uz.b1c, uz.b2c, uz.b3c);
                        let v1 = uz.m1 / uz.d;
                        let v2 = uz.m2 / uz.d;
                        let mdb1 = min_mod_opposed(db3, db1);
                        let mdb2 = min_mod_opposed(db3, db2);

                        let ur = &mut self.ur_x3[(k, j, i)];
                        ur.my += hdt * b1 * db3;
                        ur.mz += hdt * b2 * db3;
                        ur.mx += hdt * b3 * db3;
                        ur.by += hdt * v1 * (-mdb2);
                        ur.bz += hdt * v2 * (-mdb1);
                        if adiabatic {
                            ur.e += hdt * (b1 * v1 * (-mdb2) + b2 * v2 * (-mdb1));
                        }
                    }
                }
            }
        }

        if let Some(grav) = self.cfg.gravity.clone() {
            for k in (ks - 1)..=(ke + 2) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 1) {
                        let (x1, x2, x3) = g.cc_pos(i, j, k);

                        // Right state (cell k): x1 and x2 gradients.
                        let phic = grav.phi(x1, x2, x3);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3);
                        {
                            let ur = &mut self.ur_x3[(k, j, i)];
                            ur.my -= q1 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q1
                                    * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                        + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3);
                        let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3);
                        {
                            let ur = &mut self.ur_x3[(k, j, i)];
                            ur.mz -= q2 * (phir - phil) * g.u[(k, j, i)].d;
                            if adiabatic {
                                ur.e -= q2
                                    * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                        + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                            }
                        }

                        // Left state (cell k-1).
                        let x3l = x3 - g.dx3;
                        let phic = grav.phi(x1, x2, x3l);
                        let phir = grav.phi(x1 + 0.5 * g.dx1, x2, x3l);
                        let phil = grav.phi(x1 - 0.5 * g.dx1, x2, x3l);
                        {
                            let ul = &mut self.ul_x3[(k, j, i)];
                            ul.my -= q1 * (phir - phil) * g.u[(k - 1, j, i)].d;
                            if adiabatic {
                                ul.e -= q1
                                    * (self.x1_flux[(k - 1, j, i)].d * (phic - phil)
                                        + self.x1_flux[(k - 1, j, i + 1)].d * (phir - phic));
                            }
                        }
                        let phir = grav.phi(x1, x2 + 0.5 * g.dx2, x3l);
                        let phil = grav.phi(x1, x2 - 0.5 * g.dx2, x3l);
                        {
                            let ul = &mut self.ul_x3[(k, j, i)];
                            ul.mz -= q2 * (phir - phil) * g.u[(k - 1, j, i)].d;
                            if adiabatic {
                                ul.e -= q2
                                    * (self.x2_flux[(k - 1, j, i)].d * (phic - phil)
                                        + self.x2_flux[(k - 1, j + 1, i)].d * (phir - phic));
                            }
                        }
                    }
                }
            }
        }

        if self.cfg.self_gravity.is_some() {
            if let Some(phi) = g.phi.as_ref() {
                for k in (ks - 1)..=(ke + 2) {
                    for j in (js - 1)..=(je + 1) {
                        for i in (is - 1)..=(ie + 1) {
                            let phic = phi[(k, j, i)];
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j, i + 1)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j, i - 1)]);
                            {
                                let ur = &mut self.ur_x3[(k, j, i)];
                                ur.my -= q1 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q1
                                        * (self.x1_flux[(k, j, i)].d * (phic - phil)
                                            + self.x1_flux[(k, j, i + 1)].d * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k, j, i)] + phi[(k, j + 1, i)]);
                            let phil = 0.5 * (phi[(k, j, i)] + phi[(k, j - 1, i)]);
                            {
                                let ur = &mut self.ur_x3[(k, j, i)];
                                ur.mz -= q2 * (phir - phil) * g.u[(k, j, i)].d;
                                if adiabatic {
                                    ur.e -= q2
                                        * (self.x2_flux[(k, j, i)].d * (phic - phil)
                                            + self.x2_flux[(k, j + 1, i)].d * (phir - phic));
                                }
                            }

                            let phic = phi[(k - 1, j, i)];
                            let phir = 0.5 * (phi[(k - 1, j, i)] + phi[(k - 1, j, i + 1)]);
                            let phil = 0.5 * (phi[(k - 1, j, i)] + phi[(k - 1, j, i - 1)]);
                            {
                                let ul = &mut self.ul_x3[(k, j, i)];
                                ul.my -= q1 * (phir - phil) * g.u[(k - 1, j, i)].d;
                                if adiabatic {
                                    ul.e -= q1
                                        * (self.x1_flux[(k - 1, j, i)].d * (phic - phil)
                                            + self.x1_flux[(k - 1, j, i + 1)].d
                                                * (phir - phic));
                                }
                            }
                            let phir = 0.5 * (phi[(k - 1, j, i)] + phi[(k - 1, j + 1, i)]);
                            let phil = 0.5 * (phi[(k - 1, j, i)] + phi[(k - 1, j - 1, i)]);
                            {
                                let ul = &mut self.ul_x3[(k, j, i)];
                                ul.mz -= q2 * (phir - phil) * g.u[(k - 1, j, i)].d;
                                if adiabatic {
                                    ul.e -= q2
                                        * (self.x2_flux[(k - 1, j, i)].d * (phic - phil)
                                            + self.x2_flux[(k - 1, j + 1, i)].d
                                                * (phir - phic));
                                }
                            }
                        }
                    }
                }
            }
        }

        // Shearing-box Coriolis terms; on an x3 face the rotated My is the
        // x1-momentum and Mz the x2-momentum.
        if let Some(sb) = self.cfg.shearing_box.clone() {
            let om = sb.omega;
            let coef = if sb.fargo { 0.25 } else { 1.0 };
            for k in (ks - 1)..=(ke + 2) {
                for j in (js - 1)..=(je + 1) {
                    for i in (is - 1)..=(ie + 1) {
                        {
                            let ur = &mut self.ur_x3[(k, j, i)];
                            ur.my += g.dt * om * g.u[(k, j, i)].m2;
                            ur.mz -= coef * g.dt * om * g.u[(k, j, i)].m1;
                        }
                        {
                            let ul = &mut self.ul_x3[(k, j, i)];
                            ul.my += g.dt * om * g.u[(k - 1, j, i)].m2;
                            ul.mz -= coef * g.dt * om * g.u[(k - 1, j, i)].m1;
                        }
                    }
                }
            }
        }
    }
}
