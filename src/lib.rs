//! # ctu-mhd
//!
//! An unsplit corner-transport-upwind (CTU) integrator for the ideal MHD
//! equations on a uniform Cartesian grid, with a constrained-transport (CT)
//! update of the face-centered magnetic field that preserves ∇·B = 0 to
//! machine precision.
//!
//! This crate provides the core building blocks of the scheme:
//! - Conserved/primitive state types in the Cartesian and rotated 1-D frames
//! - Equation-of-state closures (adiabatic, isothermal) and conversions
//! - Piecewise-linear half-step interface reconstruction
//! - HLLE and HLLD approximate Riemann solvers
//! - A single-block grid container with periodic/outflow ghost fill
//! - The twelve-phase CTU/CT step with optional static-potential,
//!   self-gravity, cooling, and shearing-box source terms and the
//!   H-correction entropy fix
//! - Conserved-quantity diagnostics and a CFL time-step estimate
//!
//! The grid's ghost zones must be filled before every step (see
//! [`grid::boundary`] for the single-block physical boundaries); in a
//! domain-decomposed run the caller's exchange takes that role.
//!
//! References: Colella, JCP 87, 171 (1990); Gardiner & Stone, JCP 227, 4123
//! (2008); Stone et al., ApJS 178, 137 (2008).

pub mod diagnostics;
pub mod eos;
pub mod error;
pub mod grid;
pub mod integrate;
pub mod reconstruct;
pub mod riemann;
pub mod source;
pub mod state;

// Re-export the main types for convenience.
pub use diagnostics::{
    compute_dt, max_div_b, total_energy, total_mass, total_momentum, total_scalar,
};
pub use eos::{cfast, cons1d_to_prim1d, prim1d_to_cons1d, EquationOfState};
pub use error::IntegrateError;
pub use grid::boundary::{BoundaryKind, BoundarySet};
pub use grid::{Array2, Array3, Grid, MassFluxes, NGHOST};
pub use integrate::{Integrator3D, StepConfig};
pub use reconstruct::lr_states;
pub use riemann::{hlld_flux, hlle_flux, RiemannSolver};
pub use source::{CoolingFunction, EyRemap, GravityPotential, SelfGravity, ShearingBox};
pub use state::{CellState, Cons1D, Prim1D, NSCALARS};

#[cfg(feature = "parallel")]
pub use diagnostics::total_mass_parallel;
