//! Edge-centered EMF construction (Gardiner & Stone 2005/2008 upwind CT).
//!
//! Each edge EMF is the average of the four neighboring face-flux EMFs plus
//! four upwind-selected corrections `de`, each the difference between a face
//! EMF and the adjacent cell-centered EMF, chosen by the sign of the
//! transverse mass flux (averaged when it vanishes).
//!
//! Sign conventions of the fluxes of B in the rotated frames:
//!
//! ```text
//! x1Flux.by = -E3    x1Flux.bz = +E2
//! x2Flux.by = -E1    x2Flux.bz = +E3
//! x3Flux.by = -E2    x3Flux.bz = +E1
//! ```

use crate::grid::Grid;

use super::Integrator3D;

impl Integrator3D {
    /// Cell-centered EMFs `e = -v x B` from the current cell state.
    pub(super) fn cell_centered_emfs(&mut self, g: &Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        for k in (ks - 2)..=(ke + 2) {
            for j in (js - 2)..=(je + 2) {
                for i in (is - 2)..=(ie + 2) {
                    let u = &g.u[(k, j, i)];
                    let di = 1.0 / u.d;
                    self.emf1_cc[(k, j, i)] = (u.b2c * u.m3 - u.b3c * u.m2) * di;
                    self.emf2_cc[(k, j, i)] = (u.b3c * u.m1 - u.b1c * u.m3) * di;
                    self.emf3_cc[(k, j, i)] = (u.b1c * u.m2 - u.b2c * u.m1) * di;
                }
            }
        }
    }

    /// Integrate `emf1` (x1-edges) from the x2/x3 face fluxes.
    pub(super) fn corner_emf1(&mut self, g: &Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        for k in (ks - 1)..=(ke + 2) {
            for j in (js - 1)..=(je + 2) {
                for i in (is - 2)..=(ie + 2) {
                    // The x2-flux of By is -E1; the x3-flux of Bz is +E1.
                    let de1_l3 = if self.x2_flux[(k - 1, j, i)].d > 0.0 {
                        self.x3_flux[(k, j - 1, i)].bz - self.emf1_cc[(k - 1, j - 1, i)]
                    } else if self.x2_flux[(k - 1, j, i)].d < 0.0 {
                        self.x3_flux[(k, j, i)].bz - self.emf1_cc[(k - 1, j, i)]
                    } else {
                        0.5 * (self.x3_flux[(k, j - 1, i)].bz - self.emf1_cc[(k - 1, j - 1, i)]
                            + self.x3_flux[(k, j, i)].bz
                            - self.emf1_cc[(k - 1, j, i)])
                    };

                    let de1_r3 = if self.x2_flux[(k, j, i)].d > 0.0 {
                        self.x3_flux[(k, j - 1, i)].bz - self.emf1_cc[(k, j - 1, i)]
                    } else if self.x2_flux[(k, j, i)].d < 0.0 {
                        self.x3_flux[(k, j, i)].bz - self.emf1_cc[(k, j, i)]
                    } else {
                        0.5 * (self.x3_flux[(k, j - 1, i)].bz - self.emf1_cc[(k, j - 1, i)]
                            + self.x3_flux[(k, j, i)].bz
                            - self.emf1_cc[(k, j, i)])
                    };

                    let de1_l2 = if self.x3_flux[(k, j - 1, i)].d > 0.0 {
                        -self.x2_flux[(k - 1, j, i)].by - self.emf1_cc[(k - 1, j - 1, i)]
                    } else if self.x3_flux[(k, j - 1, i)].d < 0.0 {
                        -self.x2_flux[(k, j, i)].by - self.emf1_cc[(k, j - 1, i)]
                    } else {
                        0.5 * (-self.x2_flux[(k - 1, j, i)].by
                            - self.emf1_cc[(k - 1, j - 1, i)]
                            - self.x2_flux[(k, j, i)].by
                            - self.emf1_cc[(k, j - 1, i)])
                    };

                    let de1_r2 = if self.x3_flux[(k, j, i)].d > 0.0 {
                        -self.x2_flux[(k - 1, j, i)].by - self.emf1_cc[(k - 1, j, i)]
                    } else if self.x3_flux[(k, j, i)].d < 0.0 {
                        -self.x2_flux[(k, j, i)].by - self.emf1_cc[(k, j, i)]
                    } else {
                        0.5 * (-self.x2_flux[(k - 1, j, i)].by - self.emf1_cc[(k - 1, j, i)]
                            - self.x2_flux[(k, j, i)].by
                            - self.emf1_cc[(k, j, i)])
                    };

                    self.emf1[(k, j, i)] = 0.25
                        * (self.x3_flux[(k, j, i)].bz + self.x3_flux[(k, j - 1, i)].bz
                            - self.x2_flux[(k, j, i)].by
                            - self.x2_flux[(k - 1, j, i)].by
                            + de1_l2
                            + de1_r2
                            + de1_l3
                            + de1_r3);
                }
            }
        }
    }

    /// Integrate `emf2` (x2-edges) from the x1/x3 face fluxes.
    pub(super) fn corner_emf2(&mut self, g: &Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        for k in (ks - 1)..=(ke + 2) {
            for j in (js - 2)..=(je + 2) {
                for i in (is - 1)..=(ie + 2) {
                    // The x1-flux of Bz is +E2; the x3-flux of By is -E2.
                    let de2_l3 = if self.x1_flux[(k - 1, j, i)].d > 0.0 {
                        -self.x3_flux[(k, j, i - 1)].by - self.emf2_cc[(k - 1, j, i - 1)]
                    } else if self.x1_flux[(k - 1, j, i)].d < 0.0 {
                        -self.x3_flux[(k, j, i)].by - self.emf2_cc[(k - 1, j, i)]
                    } else {
                        0.5 * (-self.x3_flux[(k, j, i - 1)].by
                            - self.emf2_cc[(k - 1, j, i - 1)]
                            - self.x3_flux[(k, j, i)].by
                            - self.emf2_cc[(k - 1, j, i)])
                    };

                    let de2_r3 = if self.x1_flux[(k, j, i)].d > 0.0 {
                        -self.x3_flux[(k, j, i - 1)].by - self.emf2_cc[(k, j, i - 1)]
                    } else if self.x1_flux[(k, j, i)].d < 0.0 {
                        -self.x3_flux[(k, j, i)].by - self.emf2_cc[(k, j, i)]
                    } else {
                        0.5 * (-self.x3_flux[(k, j, i - 1)].by - self.emf2_cc[(k, j, i - 1)]
                            - self.x3_flux[(k, j, i)].by
                            - self.emf2_cc[(k, j, i)])
                    };

                    let de2_l1 = if self.x3_flux[(k, j, i - 1)].d > 0.0 {
                        self.x1_flux[(k - 1, j, i)].bz - self.emf2_cc[(k - 1, j, i - 1)]
                    } else if self.x3_flux[(k, j, i - 1)].d < 0.0 {
                        self.x1_flux[(k, j, i)].bz - self.emf2_cc[(k, j, i - 1)]
                    } else {
                        0.5 * (self.x1_flux[(k - 1, j, i)].bz - self.emf2_cc[(k - 1, j, i - 1)]
                            + self.x1_flux[(k, j, i)].bz
                            - self.emf2_cc[(k, j, i - 1)])
                    };

                    let de2_r1 = if self.x3_flux[(k, j, i)].d > 0.0 {
                        self.x1_flux[(k - 1, j, i)].bz - self.emf2_cc[(k - 1, j, i)]
                    } else if self.x3_flux[(k, j, i)].d < 0.0 {
                        self.x1_flux[(k, j, i)].bz - self.emf2_cc[(k, j, i)]
                    } else {
                        0.5 * (self.x1_flux[(k - 1, j, i)].bz - self.emf2_cc[(k - 1, j, i)]
                            + self.x1_flux[(k, j, i)].bz
                            - self.emf2_cc[(k, j, i)])
                    };

                    self.emf2[(k, j, i)] = 0.25
                        * (self.x1_flux[(k, j, i)].bz + self.x1_flux[(k - 1, j, i)].bz
                            - self.x3_flux[(k, j, i)].by
                            - self.x3_flux[(k, j, i - 1)].by
                            + de2_l1
                            + de2_r1
                            + de2_l3
                            + de2_r3);
                }
            }
        }
    }

    /// Integrate `emf3` (x3-edges) from the x1/x2 face fluxes.
    pub(super) fn corner_emf3(&mut self, g: &Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        for k in (ks - 2)..=(ke + 2) {
            for j in (js - 1)..=(je + 2) {
                for i in (is - 1)..=(ie + 2) {
                    // The x1-flux of By is -E3; the x2-flux of Bz is +E3.
                    let de3_l2 = if self.x1_flux[(k, j - 1, i)].d > 0.0 {
                        self.x2_flux[(k, j, i - 1)].bz - self.emf3_cc[(k, j - 1, i - 1)]
                    } else if self.x1_flux[(k, j - 1, i)].d < 0.0 {
                        self.x2_flux[(k, j, i)].bz - self.emf3_cc[(k, j - 1, i)]
                    } else {
                        0.5 * (self.x2_flux[(k, j, i - 1)].bz - self.emf3_cc[(k, j - 1, i - 1)]
                            + self.x2_flux[(k, j, i)].bz
                            - self.emf3_cc[(k, j - 1, i)])
                    };

                    let de3_r2 = if self.x1_flux[(k, j, i)].d > 0.0 {
                        self.x2_flux[(k, j, i - 1)].bz - self.emf3_cc[(k, j, i - 1)]
                    } else if self.x1_flux[(k, j, i)].d < 0.0 {
                        self.x2_flux[(k, j, i)].bz - self.emf3_cc[(k, j, i)]
                    } else {
                        0.5 * (self.x2_flux[(k, j, i - 1)].bz - self.emf3_cc[(k, j, i - 1)]
                            + self.x2_flux[(k, j, i)].bz
                            - self.emf3_cc[(k, j, i)])
                    };

                    let de3_l1 = if self.x2_flux[(k, j, i - 1)].d > 0.0 {
                        -self.x1_flux[(k, j - 1, i)].by - self.emf3_cc[(k, j - 1, i - 1)]
                    } else if self.x2_flux[(k, j, i - 1)].d < 0.0 {
                        -self.x1_flux[(k, j, i)].by - self.emf3_cc[(k, j, i - 1)]
                    } else {
                        0.5 * (-self.x1_flux[(k, j - 1, i)].by
                            - self.emf3_cc[(k, j - 1, i - 1)]
                            - self.x1_flux[(k, j, i)].by
                            - self.emf3_cc[(k, j, i - 1)])
                    };

                    let de3_r1 = if self.x2_flux[(k, j, i)].d > 0.0 {
                        -self.x1_flux[(k, j - 1, i)].by - self.emf3_cc[(k, j - 1, i)]
                    } else if self.x2_flux[(k, j, i)].d < 0.0 {
                        -self.x1_flux[(k, j, i)].by - self.emf3_cc[(k, j, i)]
                    } else {
                        0.5 * (-self.x1_flux[(k, j - 1, i)].by - self.emf3_cc[(k, j - 1, i)]
                            - self.x1_flux[(k, j, i)].by
                            - self.emf3_cc[(k, j, i)])
                    };

                    self.emf3[(k, j, i)] = 0.25
                        * (self.x2_flux[(k, j, i - 1)].bz + self.x2_flux[(k, j, i)].bz
                            - self.x1_flux[(k, j - 1, i)].by
                            - self.x1_flux[(k, j, i)].by
                            + de3_l1
                            + de3_r1
                            + de3_l2
                            + de3_r2);
                }
            }
        }
    }
}
