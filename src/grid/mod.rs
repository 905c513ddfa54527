//! Uniform logically-Cartesian grid block.
//!
//! A [`Grid`] holds one rectangular block of cells: the cell-centered
//! conserved state, the face-centered magnetic fields of the constrained
//! transport scheme, and the optional self-gravity data. Interior cells span
//! `[is..=ie] × [js..=je] × [ks..=ke]`; [`NGHOST`] ghost layers surround the
//! block on every face and are filled by [`boundary`] (or by an outer
//! domain-decomposition exchange) before each step.

mod array;
pub mod boundary;

pub use array::{Array2, Array3};

use crate::error::IntegrateError;
use crate::state::CellState;

/// Ghost layers on each face.
///
/// The interface predictor consumes `NGHOST` cells along the sweep and two
/// transverse layers; four layers satisfy every stage of the scheme with
/// second-order reconstruction.
pub const NGHOST: usize = 4;

/// One block of a uniform Cartesian domain.
#[derive(Clone, Debug)]
pub struct Grid {
    /// Cell-centered conserved state, padded extents `(N3, N2, N1)`.
    pub u: Array3<CellState>,
    /// x1-face magnetic field; `b1i[(k,j,i)]` sits on the left x1-face of
    /// cell `(i,j,k)`.
    pub b1i: Array3<f64>,
    /// x2-face magnetic field.
    pub b2i: Array3<f64>,
    /// x3-face magnetic field.
    pub b3i: Array3<f64>,
    /// Gravitational potential from the self-gravity solver, if attached.
    pub phi: Option<Array3<f64>>,
    /// Interface mass fluxes written back by the step when self-gravity is
    /// active, for the caller's second-order flux correction.
    pub mass_flux: Option<MassFluxes>,

    /// First interior index, x1 (equals [`NGHOST`]).
    pub is: usize,
    /// Last interior index, x1.
    pub ie: usize,
    /// First interior index, x2.
    pub js: usize,
    /// Last interior index, x2.
    pub je: usize,
    /// First interior index, x3.
    pub ks: usize,
    /// Last interior index, x3.
    pub ke: usize,

    /// Cell spacing along x1.
    pub dx1: f64,
    /// Cell spacing along x2.
    pub dx2: f64,
    /// Cell spacing along x3.
    pub dx3: f64,
    /// Coordinate of the low x1 edge of the first interior cell.
    pub x1min: f64,
    /// Coordinate of the low x2 edge of the first interior cell.
    pub x2min: f64,
    /// Coordinate of the low x3 edge of the first interior cell.
    pub x3min: f64,

    /// Current time.
    pub time: f64,
    /// Time step to advance by on the next call to the integrator.
    pub dt: f64,
}

/// Interface mass-flux arrays saved for the self-gravity flux correction.
#[derive(Clone, Debug)]
pub struct MassFluxes {
    /// x1-interface mass flux.
    pub x1: Array3<f64>,
    /// x2-interface mass flux.
    pub x2: Array3<f64>,
    /// x3-interface mass flux.
    pub x3: Array3<f64>,
}

impl Grid {
    /// Create a zeroed block of interior extents `(nx1, nx2, nx3)` covering
    /// the box `[x1min, x1max] × [x2min, x2max] × [x3min, x3max]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nx1: usize,
        nx2: usize,
        nx3: usize,
        x1: (f64, f64),
        x2: (f64, f64),
        x3: (f64, f64),
    ) -> Result<Self, IntegrateError> {
        if nx1 == 0 || nx2 == 0 || nx3 == 0 {
            return Err(IntegrateError::EmptyBlock { nx1, nx2, nx3 });
        }
        let n1 = nx1 + 2 * NGHOST;
        let n2 = nx2 + 2 * NGHOST;
        let n3 = nx3 + 2 * NGHOST;
        Ok(Self {
            u: Array3::new(n3, n2, n1)?,
            b1i: Array3::new(n3, n2, n1)?,
            b2i: Array3::new(n3, n2, n1)?,
            b3i: Array3::new(n3, n2, n1)?,
            phi: None,
            mass_flux: None,
            is: NGHOST,
            ie: NGHOST + nx1 - 1,
            js: NGHOST,
            je: NGHOST + nx2 - 1,
            ks: NGHOST,
            ke: NGHOST + nx3 - 1,
            dx1: (x1.1 - x1.0) / nx1 as f64,
            dx2: (x2.1 - x2.0) / nx2 as f64,
            dx3: (x3.1 - x3.0) / nx3 as f64,
            x1min: x1.0,
            x2min: x2.0,
            x3min: x3.0,
            time: 0.0,
            dt: 0.0,
        })
    }

    /// Interior extents `(nx1, nx2, nx3)`.
    #[inline]
    pub fn interior(&self) -> (usize, usize, usize) {
        (
            self.ie - self.is + 1,
            self.je - self.js + 1,
            self.ke - self.ks + 1,
        )
    }

    /// Cell-center coordinates of cell `(i, j, k)` (ghost cells included).
    #[inline]
    pub fn cc_pos(&self, i: usize, j: usize, k: usize) -> (f64, f64, f64) {
        (
            self.x1min + (i as f64 - self.is as f64 + 0.5) * self.dx1,
            self.x2min + (j as f64 - self.js as f64 + 0.5) * self.dx2,
            self.x3min + (k as f64 - self.ks as f64 + 0.5) * self.dx3,
        )
    }

    /// Attach a zeroed gravitational-potential array (required for
    /// self-gravity).
    pub fn attach_potential(&mut self) -> Result<(), IntegrateError> {
        let (n3, n2, n1) = self.u.dims();
        self.phi = Some(Array3::new(n3, n2, n1)?);
        Ok(())
    }

    /// Attach zeroed mass-flux write-back arrays (required for
    /// self-gravity).
    pub fn attach_mass_fluxes(&mut self) -> Result<(), IntegrateError> {
        let (n3, n2, n1) = self.u.dims();
        self.mass_flux = Some(MassFluxes {
            x1: Array3::new(n3, n2, n1)?,
            x2: Array3::new(n3, n2, n1)?,
            x3: Array3::new(n3, n2, n1)?,
        });
        Ok(())
    }

    /// Synchronise the cell-centered magnetic field with the average of the
    /// face fields. Used when seeding initial conditions from face data.
    pub fn sync_cell_centered_field(&mut self) {
        for k in 0..=self.ke + NGHOST - 1 {
            for j in 0..=self.je + NGHOST - 1 {
                for i in 0..=self.ie + NGHOST - 1 {
                    let u = &mut self.u[(k, j, i)];
                    u.b1c = 0.5 * (self.b1i[(k, j, i)] + self.b1i[(k, j, i + 1)]);
                    u.b2c = 0.5 * (self.b2i[(k, j, i)] + self.b2i[(k, j + 1, i)]);
                    u.b3c = 0.5 * (self.b3i[(k, j, i)] + self.b3i[(k + 1, j, i)]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_extents() {
        let g = Grid::new(8, 6, 4, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
        assert_eq!(g.interior(), (8, 6, 4));
        assert_eq!(g.is, NGHOST);
        assert_eq!(g.ie, NGHOST + 7);
        assert_eq!(g.u.dims(), (4 + 2 * NGHOST, 6 + 2 * NGHOST, 8 + 2 * NGHOST));
        assert!((g.dx1 - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_zero_extent_rejected() {
        assert!(Grid::new(0, 4, 4, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_cc_pos_centers() {
        let g = Grid::new(4, 4, 4, (0.0, 1.0), (-1.0, 1.0), (0.0, 2.0)).unwrap();
        let (x1, x2, x3) = g.cc_pos(g.is, g.js, g.ks);
        assert!((x1 - 0.125).abs() < 1e-15);
        assert!((x2 + 0.75).abs() < 1e-15);
        assert!((x3 - 0.25).abs() < 1e-15);
        // Last interior cell center sits half a cell inside the upper edge.
        let (x1e, _, _) = g.cc_pos(g.ie, g.js, g.ks);
        assert!((x1e - 0.875).abs() < 1e-15);
    }

    #[test]
    fn test_sync_cell_centered_field() {
        let mut g = Grid::new(4, 4, 4, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
        let (n3, n2, n1) = g.u.dims();
        for k in 0..n3 {
            for j in 0..n2 {
                for i in 0..n1 {
                    g.b1i[(k, j, i)] = i as f64;
                }
            }
        }
        g.sync_cell_centered_field();
        assert!((g.u[(g.ks, g.js, g.is)].b1c - (g.is as f64 + 0.5)).abs() < 1e-14);
    }
}
