//! Constrained-transport face-field updates (Stokes' theorem per face).
//!
//! The half-step update advances the scratch face fields by Δt/2 with the
//! t^n corner EMFs; the full-step update writes directly into the grid's
//! face fields with the half-step corner EMFs. The extra boundary faces at
//! `ie+2`, `je+2`, `ke+2` (half step) and `ie+1`, `je+1`, `ke+1` (full step)
//! are updated one layer outside the loop body so the discrete divergence is
//! preserved across the whole interior.

use crate::grid::Grid;

use super::Integrator3D;

impl Integrator3D {
    /// Advance the scratch face fields by Δt/2.
    pub(super) fn ct_half_step(&mut self, g: &Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let q1 = 0.5 * g.dt / g.dx1;
        let q2 = 0.5 * g.dt / g.dx2;
        let q3 = 0.5 * g.dt / g.dx3;

        for k in (ks - 1)..=(ke + 1) {
            for j in (js - 1)..=(je + 1) {
                for i in (is - 1)..=(ie + 1) {
                    self.b1_x1[(k, j, i)] += q3
                        * (self.emf2[(k + 1, j, i)] - self.emf2[(k, j, i)])
                        - q2 * (self.emf3[(k, j + 1, i)] - self.emf3[(k, j, i)]);
                    self.b2_x2[(k, j, i)] += q1
                        * (self.emf3[(k, j, i + 1)] - self.emf3[(k, j, i)])
                        - q3 * (self.emf1[(k + 1, j, i)] - self.emf1[(k, j, i)]);
                    self.b3_x3[(k, j, i)] += q2
                        * (self.emf1[(k, j + 1, i)] - self.emf1[(k, j, i)])
                        - q1 * (self.emf2[(k, j, i + 1)] - self.emf2[(k, j, i)]);
                }
                self.b1_x1[(k, j, ie + 2)] += q3
                    * (self.emf2[(k + 1, j, ie + 2)] - self.emf2[(k, j, ie + 2)])
                    - q2 * (self.emf3[(k, j + 1, ie + 2)] - self.emf3[(k, j, ie + 2)]);
            }
            for i in (is - 1)..=(ie + 1) {
                self.b2_x2[(k, je + 2, i)] += q1
                    * (self.emf3[(k, je + 2, i + 1)] - self.emf3[(k, je + 2, i)])
                    - q3 * (self.emf1[(k + 1, je + 2, i)] - self.emf1[(k, je + 2, i)]);
            }
        }
        for j in (js - 1)..=(je + 1) {
            for i in (is - 1)..=(ie + 1) {
                self.b3_x3[(ke + 2, j, i)] += q2
                    * (self.emf1[(ke + 2, j + 1, i)] - self.emf1[(ke + 2, j, i)])
                    - q1 * (self.emf2[(ke + 2, j, i + 1)] - self.emf2[(ke + 2, j, i)]);
            }
        }
    }

    /// Advance the grid's face fields by the full Δt.
    pub(super) fn ct_full_step(&mut self, g: &mut Grid) {
        let (is, ie, js, je, ks, ke) = (g.is, g.ie, g.js, g.je, g.ks, g.ke);
        let dtodx1 = g.dt / g.dx1;
        let dtodx2 = g.dt / g.dx2;
        let dtodx3 = g.dt / g.dx3;

        for k in ks..=ke {
            for j in js..=je {
                for i in is..=ie {
                    g.b1i[(k, j, i)] += dtodx3
                        * (self.emf2[(k + 1, j, i)] - self.emf2[(k, j, i)])
                        - dtodx2 * (self.emf3[(k, j + 1, i)] - self.emf3[(k, j, i)]);
                    g.b2i[(k, j, i)] += dtodx1
                        * (self.emf3[(k, j, i + 1)] - self.emf3[(k, j, i)])
                        - dtodx3 * (self.emf1[(k + 1, j, i)] - self.emf1[(k, j, i)]);
                    g.b3i[(k, j, i)] += dtodx2
                        * (self.emf1[(k, j + 1, i)] - self.emf1[(k, j, i)])
                        - dtodx1 * (self.emf2[(k, j, i + 1)] - self.emf2[(k, j, i)]);
                }
                g.b1i[(k, j, ie + 1)] += dtodx3
                    * (self.emf2[(k + 1, j, ie + 1)] - self.emf2[(k, j, ie + 1)])
                    - dtodx2 * (self.emf3[(k, j + 1, ie + 1)] - self.emf3[(k, j, ie + 1)]);
            }
            for i in is..=ie {
                g.b2i[(k, je + 1, i)] += dtodx1
                    * (self.emf3[(k, je + 1, i + 1)] - self.emf3[(k, je + 1, i)])
                    - dtodx3 * (self.emf1[(k + 1, je + 1, i)] - self.emf1[(k, je + 1, i)]);
            }
        }
        for j in js..=je {
            for i in is..=ie {
                g.b3i[(ke + 1, j, i)] += dtodx2
                    * (self.emf1[(ke + 1, j + 1, i)] - self.emf1[(ke + 1, j, i)])
                    - dtodx1 * (self.emf2[(ke + 1, j, i + 1)] - self.emf2[(ke + 1, j, i)]);
            }
        }
    }
}
