//! Conserved and primitive state types.
//!
//! Two frames are used throughout the crate:
//!
//! - The Cartesian grid frame `(x1, x2, x3)`, in which [`CellState`] stores the
//!   cell-centered conserved variables.
//! - The rotated 1-D sweep frame `(x, y, z)`, in which [`Cons1D`] and
//!   [`Prim1D`] store interface states and fluxes. A sweep along direction `d`
//!   maps the axes cyclically: d=1 ⇒ (1,2,3), d=2 ⇒ (2,3,1), d=3 ⇒ (3,1,2).
//!   `Mx` is always the momentum normal to the face under consideration.
//!
//! The normal magnetic-field component is constant along a 1-D sweep and is
//! carried separately (`bxi`/`bxc` arrays), so the 1-D states hold only the
//! two transverse components `by`, `bz`.

/// Number of passively advected scalar fields carried by every state.
pub const NSCALARS: usize = 1;

/// Cell-centered conserved variables in the Cartesian grid frame.
///
/// `e` is meaningful only for an adiabatic equation of state; `b1c..b3c` only
/// when MHD is enabled. Both are carried unconditionally so that a single
/// build covers the whole configuration matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellState {
    /// Mass density
    pub d: f64,
    /// x1-momentum density
    pub m1: f64,
    /// x2-momentum density
    pub m2: f64,
    /// x3-momentum density
    pub m3: f64,
    /// Total energy density (kinetic + thermal + magnetic)
    pub e: f64,
    /// Cell-centered x1 magnetic field
    pub b1c: f64,
    /// Cell-centered x2 magnetic field
    pub b2c: f64,
    /// Cell-centered x3 magnetic field
    pub b3c: f64,
    /// Passive scalar densities (d * concentration)
    pub s: [f64; NSCALARS],
}

impl CellState {
    /// Velocity components `(v1, v2, v3)`.
    #[inline(always)]
    pub fn velocity(&self) -> (f64, f64, f64) {
        let di = 1.0 / self.d;
        (self.m1 * di, self.m2 * di, self.m3 * di)
    }

    /// Kinetic energy density `|M|^2 / (2 d)`.
    #[inline(always)]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * (self.m1 * self.m1 + self.m2 * self.m2 + self.m3 * self.m3) / self.d
    }

    /// Magnetic energy density from the cell-centered field.
    #[inline(always)]
    pub fn magnetic_energy(&self) -> f64 {
        0.5 * (self.b1c * self.b1c + self.b2c * self.b2c + self.b3c * self.b3c)
    }
}

/// Conserved variables of a 1-D sweep, in the rotated frame.
///
/// Also used for interface fluxes, which share the same component layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cons1D {
    /// Mass density
    pub d: f64,
    /// Momentum normal to the face
    pub mx: f64,
    /// First transverse momentum
    pub my: f64,
    /// Second transverse momentum
    pub mz: f64,
    /// Total energy density
    pub e: f64,
    /// First transverse magnetic field
    pub by: f64,
    /// Second transverse magnetic field
    pub bz: f64,
    /// Passive scalar densities
    pub s: [f64; NSCALARS],
}

/// Primitive variables of a 1-D sweep, in the rotated frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Prim1D {
    /// Mass density
    pub d: f64,
    /// Velocity normal to the face
    pub vx: f64,
    /// First transverse velocity
    pub vy: f64,
    /// Second transverse velocity
    pub vz: f64,
    /// Gas pressure (`cs^2 * d` for an isothermal equation of state)
    pub p: f64,
    /// First transverse magnetic field
    pub by: f64,
    /// Second transverse magnetic field
    pub bz: f64,
    /// Passive scalar concentrations (s / d)
    pub r: [f64; NSCALARS],
}
