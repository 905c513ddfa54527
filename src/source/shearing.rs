//! Shearing-box parameters and the Ey boundary remap hook.
//!
//! The local shearing-box approximation adds Coriolis and tidal forces for a
//! frame rotating at `omega`. With the FARGO option the background orbital
//! shear is subtracted before integration, which changes the Coriolis
//! coefficients and removes the tidal flux terms.
//!
//! On a shearing-periodic domain the y-EMF must be remapped across the x1
//! boundaries and averaged with the local value to conserve the net vertical
//! flux. The remap itself (a conservative reconstruction in the sheared
//! y-coordinate) is the caller's, exposed through [`EyRemap`].

use std::sync::Arc;

use crate::grid::{Array2, Array3, Grid};

/// Remap of the y-component of the EMF across the shearing x1 boundaries.
pub trait EyRemap: Send + Sync {
    /// Fill `buf[(k, j)]` with the remapped Ey for the inner x1 boundary
    /// (face `is`), from the opposite side of the domain.
    fn remap_ix1(&self, grid: &Grid, ey: &Array3<f64>, buf: &mut Array2<f64>);

    /// Fill `buf[(k, j)]` with the remapped Ey for the outer x1 boundary
    /// (face `ie + 1`).
    fn remap_ox1(&self, grid: &Grid, ey: &Array3<f64>, buf: &mut Array2<f64>);
}

/// Shearing-box configuration.
#[derive(Clone)]
pub struct ShearingBox {
    /// Orbital frequency of the local frame.
    pub omega: f64,
    /// Whether the background shear is subtracted before integration.
    pub fargo: bool,
    /// Ey remap for the shearing x1 boundaries; `None` skips the averaging
    /// (adequate for a non-shearing-periodic test domain).
    pub remap: Option<Arc<dyn EyRemap>>,
    /// Position of this block along x1 in the domain decomposition.
    pub my_iproc: usize,
    /// Number of blocks along x1.
    pub ngrid_x1: usize,
}

impl ShearingBox {
    /// Single-block configuration without an Ey remap.
    pub fn new(omega: f64, fargo: bool) -> Self {
        Self {
            omega,
            fargo,
            remap: None,
            my_iproc: 0,
            ngrid_x1: 1,
        }
    }

    /// Whether this block touches the inner x1 boundary.
    #[inline]
    pub fn at_inner_x1(&self) -> bool {
        self.my_iproc == 0
    }

    /// Whether this block touches the outer x1 boundary.
    #[inline]
    pub fn at_outer_x1(&self) -> bool {
        self.my_iproc == self.ngrid_x1 - 1
    }
}

impl std::fmt::Debug for ShearingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShearingBox")
            .field("omega", &self.omega)
            .field("fargo", &self.fargo)
            .field("remap", &self.remap.is_some())
            .field("my_iproc", &self.my_iproc)
            .field("ngrid_x1", &self.ngrid_x1)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block_touches_both_boundaries() {
        let sb = ShearingBox::new(1e-3, true);
        assert!(sb.at_inner_x1());
        assert!(sb.at_outer_x1());
        assert!(sb.remap.is_none());
    }

    #[test]
    fn test_interior_block_touches_neither() {
        let mut sb = ShearingBox::new(1.0, false);
        sb.my_iproc = 1;
        sb.ngrid_x1 = 3;
        assert!(!sb.at_inner_x1());
        assert!(!sb.at_outer_x1());
    }
}
