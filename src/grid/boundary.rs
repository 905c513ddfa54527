//! Physical boundary conditions for a single grid block.
//!
//! Ghost layers of the cell-centered state and the face-centered magnetic
//! fields are filled per axis, in the order x1, x2, x3, so that edge and
//! corner ghosts are populated transitively. In a domain-decomposed run the
//! outer exchange replaces this module; the self-gravity potential is always
//! the caller's responsibility.

use crate::grid::{Grid, NGHOST};

/// Boundary treatment applied to both faces of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Wrap-around: ghost cells copy the opposite interior edge.
    #[default]
    Periodic,
    /// Zero-gradient: ghost cells copy the nearest interior cell.
    Outflow,
}

/// Boundary selection for the three axes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundarySet {
    /// x1 faces
    pub x1: BoundaryKind,
    /// x2 faces
    pub x2: BoundaryKind,
    /// x3 faces
    pub x3: BoundaryKind,
}

impl BoundarySet {
    /// Periodic on every axis.
    pub fn periodic() -> Self {
        Self::default()
    }

    /// Outflow on every axis.
    pub fn outflow() -> Self {
        Self {
            x1: BoundaryKind::Outflow,
            x2: BoundaryKind::Outflow,
            x3: BoundaryKind::Outflow,
        }
    }
}

/// Fill all ghost layers of `grid` according to `bounds`.
pub fn apply(grid: &mut Grid, bounds: &BoundarySet) {
    apply_x1(grid, bounds.x1);
    apply_x2(grid, bounds.x2);
    apply_x3(grid, bounds.x3);
}

fn apply_x1(g: &mut Grid, kind: BoundaryKind) {
    let (n3, n2, n1) = g.u.dims();
    let (nx1, _, _) = g.interior();
    let (is, ie) = (g.is, g.ie);

    for k in 0..n3 {
        for j in 0..n2 {
            match kind {
                BoundaryKind::Periodic => {
                    for i in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(k, j, i + nx1)];
                        g.b1i[(k, j, i)] = g.b1i[(k, j, i + nx1)];
                        g.b2i[(k, j, i)] = g.b2i[(k, j, i + nx1)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j, i + nx1)];
                    }
                    for i in (ie + 1)..n1 {
                        g.u[(k, j, i)] = g.u[(k, j, i - nx1)];
                        g.b2i[(k, j, i)] = g.b2i[(k, j, i - nx1)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j, i - nx1)];
                    }
                    // The face ie+1 is evolved by the CT update; only the
                    // layers beyond it are ghosts.
                    for i in (ie + 2)..n1 {
                        g.b1i[(k, j, i)] = g.b1i[(k, j, i - nx1)];
                    }
                }
                BoundaryKind::Outflow => {
                    for i in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(k, j, is)];
                        g.b1i[(k, j, i)] = g.b1i[(k, j, is)];
                        g.b2i[(k, j, i)] = g.b2i[(k, j, is)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j, is)];
                    }
                    for i in (ie + 1)..n1 {
                        g.u[(k, j, i)] = g.u[(k, j, ie)];
                        g.b2i[(k, j, i)] = g.b2i[(k, j, ie)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j, ie)];
                    }
                    for i in (ie + 2)..n1 {
                        g.b1i[(k, j, i)] = g.b1i[(k, j, ie + 1)];
                    }
                }
            }
        }
    }
}

fn apply_x2(g: &mut Grid, kind: BoundaryKind) {
    let (n3, n2, n1) = g.u.dims();
    let (_, nx2, _) = g.interior();
    let (js, je) = (g.js, g.je);

    for k in 0..n3 {
        for i in 0..n1 {
            match kind {
                BoundaryKind::Periodic => {
                    for j in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(k, j + nx2, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k, j + nx2, i)];
                        g.b2i[(k, j, i)] = g.b2i[(k, j + nx2, i)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j + nx2, i)];
                    }
                    for j in (je + 1)..n2 {
                        g.u[(k, j, i)] = g.u[(k, j - nx2, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k, j - nx2, i)];
                        g.b3i[(k, j, i)] = g.b3i[(k, j - nx2, i)];
                    }
                    for j in (je + 2)..n2 {
                        g.b2i[(k, j, i)] = g.b2i[(k, j - nx2, i)];
                    }
                }
                BoundaryKind::Outflow => {
                    for j in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(k, js, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k, js, i)];
                        g.b2i[(k, j, i)] = g.b2i[(k, js, i)];
                        g.b3i[(k, j, i)] = g.b3i[(k, js, i)];
                    }
                    for j in (je + 1)..n2 {
                        g.u[(k, j, i)] = g.u[(k, je, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k, je, i)];
                        g.b3i[(k, j, i)] = g.b3i[(k, je, i)];
                    }
                    for j in (je + 2)..n2 {
                        g.b2i[(k, j, i)] = g.b2i[(k, je + 1, i)];
                    }
                }
            }
        }
    }
}

fn apply_x3(g: &mut Grid, kind: BoundaryKind) {
    let (n3, n2, n1) = g.u.dims();
    let (_, _, nx3) = g.interior();
    let (ks, ke) = (g.ks, g.ke);

    for j in 0..n2 {
        for i in 0..n1 {
            match kind {
                BoundaryKind::Periodic => {
                    for k in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(k + nx3, j, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k + nx3, j, i)];
                        g.b2i[(k, j, i)] = g.b2i[(k + nx3, j, i)];
                        g.b3i[(k, j, i)] = g.b3i[(k + nx3, j, i)];
                    }
                    for k in (ke + 1)..n3 {
                        g.u[(k, j, i)] = g.u[(k - nx3, j, i)];
                        g.b1i[(k, j, i)] = g.b1i[(k - nx3, j, i)];
                        g.b2i[(k, j, i)] = g.b2i[(k - nx3, j, i)];
                    }
                    for k in (ke + 2)..n3 {
                        g.b3i[(k, j, i)] = g.b3i[(k - nx3, j, i)];
                    }
                }
                BoundaryKind::Outflow => {
                    for k in 0..NGHOST {
                        g.u[(k, j, i)] = g.u[(ks, j, i)];
                        g.b1i[(k, j, i)] = g.b1i[(ks, j, i)];
                        g.b2i[(k, j, i)] = g.b2i[(ks, j, i)];
                        g.b3i[(k, j, i)] = g.b3i[(ks, j, i)];
                    }
                    for k in (ke + 1)..n3 {
                        g.u[(k, j, i)] = g.u[(ke, j, i)];
                        g.b1i[(k, j, i)] = g.b1i[(ke, j, i)];
                        g.b2i[(k, j, i)] = g.b2i[(ke, j, i)];
                    }
                    for k in (ke + 2)..n3 {
                        g.b3i[(k, j, i)] = g.b3i[(ke + 1, j, i)];
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_grid() -> Grid {
        let mut g = Grid::new(4, 4, 4, (0.0, 1.0), (0.0, 1.0), (0.0, 1.0)).unwrap();
        for k in g.ks..=g.ke {
            for j in g.js..=g.je {
                for i in g.is..=g.ie {
                    g.u[(k, j, i)].d = (100 * k + 10 * j + i) as f64;
                    g.b1i[(k, j, i)] = (i + j + k) as f64;
                }
            }
        }
        g
    }

    #[test]
    fn test_periodic_wraps_cells() {
        let mut g = tagged_grid();
        apply(&mut g, &BoundarySet::periodic());
        let (nx1, _, _) = g.interior();
        // Left ghost column copies the right interior edge.
        assert_eq!(g.u[(g.ks, g.js, g.is - 1)].d, g.u[(g.ks, g.js, g.is - 1 + nx1)].d);
        assert_eq!(g.u[(g.ks, g.js, 0)].d, g.u[(g.ks, g.js, nx1)].d);
        // Right ghost column copies the left interior edge.
        assert_eq!(g.u[(g.ks, g.js, g.ie + 1)].d, g.u[(g.ks, g.js, g.is)].d);
    }

    #[test]
    fn test_outflow_copies_edge() {
        let mut g = tagged_grid();
        apply(&mut g, &BoundarySet::outflow());
        assert_eq!(g.u[(g.ks, g.js, 0)].d, g.u[(g.ks, g.js, g.is)].d);
        assert_eq!(
            g.u[(g.ks, g.js, g.ie + 2)].d,
            g.u[(g.ks, g.js, g.ie)].d
        );
    }

    #[test]
    fn test_corner_ghosts_filled() {
        let mut g = tagged_grid();
        apply(&mut g, &BoundarySet::periodic());
        let (nx1, nx2, nx3) = g.interior();
        // The (0,0,0) corner ghost must hold the periodic image of the
        // opposite interior corner.
        assert_eq!(
            g.u[(0, 0, 0)].d,
            g.u[(nx3, nx2, nx1)].d
        );
    }

    #[test]
    fn test_periodic_preserves_evolved_face() {
        let mut g = tagged_grid();
        let marker = 123.456;
        g.b1i[(g.ks, g.js, g.ie + 1)] = marker;
        apply(&mut g, &BoundarySet::periodic());
        assert_eq!(g.b1i[(g.ks, g.js, g.ie + 1)], marker);
    }
}
