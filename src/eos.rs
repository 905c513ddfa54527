//! Equation of state, variable conversions, and MHD wave speeds.
//!
//! The integrator supports two closures:
//!
//! - Adiabatic (ideal gas): `p = (γ - 1) (E - E_kin - E_mag)`, total energy is
//!   evolved.
//! - Isothermal (barotropic): `p = cs² ρ`, no energy equation.
//!
//! Conversions operate on the rotated 1-D frame of [`Cons1D`] / [`Prim1D`];
//! the normal field component is passed separately since it is constant along
//! a sweep.
//!
//! No pressure or density floors are applied here: transient negative values
//! are tolerated by design and are the caller's responsibility to detect.

use crate::state::{Cons1D, Prim1D, NSCALARS};

/// Thermodynamic closure of the fluid equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EquationOfState {
    /// Ideal gas with adiabatic index `gamma`; evolves total energy.
    Adiabatic {
        /// Ratio of specific heats (γ > 1)
        gamma: f64,
    },
    /// Isothermal gas with sound speed `cs`; no energy equation.
    Isothermal {
        /// Isothermal sound speed
        cs: f64,
    },
}

impl EquationOfState {
    /// Whether this closure evolves an energy equation.
    #[inline]
    pub fn is_adiabatic(&self) -> bool {
        matches!(self, EquationOfState::Adiabatic { .. })
    }

    /// γ - 1 for the adiabatic closure, zero otherwise.
    #[inline]
    pub fn gamma_1(&self) -> f64 {
        match *self {
            EquationOfState::Adiabatic { gamma } => gamma - 1.0,
            EquationOfState::Isothermal { .. } => 0.0,
        }
    }

    /// Gas pressure for a given density and internal state.
    ///
    /// For the isothermal closure this is `cs² d` regardless of `p_adiabatic`.
    #[inline]
    pub fn pressure(&self, d: f64, p_adiabatic: f64) -> f64 {
        match *self {
            EquationOfState::Adiabatic { .. } => p_adiabatic,
            EquationOfState::Isothermal { cs } => cs * cs * d,
        }
    }

    /// Adiabatic sound speed squared `γ p / d` (or `cs²`).
    #[inline]
    pub fn sound_speed_sq(&self, d: f64, p: f64) -> f64 {
        match *self {
            EquationOfState::Adiabatic { gamma } => gamma * p / d,
            EquationOfState::Isothermal { cs } => cs * cs,
        }
    }
}

/// Convert a rotated-frame conserved state to primitives.
///
/// `bx` is the normal field on the same face (ignored unless `mhd`).
pub fn cons1d_to_prim1d(u: &Cons1D, bx: f64, eos: &EquationOfState, mhd: bool) -> Prim1D {
    let di = 1.0 / u.d;
    let vx = u.mx * di;
    let vy = u.my * di;
    let vz = u.mz * di;

    let p = match *eos {
        EquationOfState::Adiabatic { gamma } => {
            let mut p = u.e - 0.5 * (u.mx * u.mx + u.my * u.my + u.mz * u.mz) * di;
            if mhd {
                p -= 0.5 * (bx * bx + u.by * u.by + u.bz * u.bz);
            }
            (gamma - 1.0) * p
        }
        EquationOfState::Isothermal { cs } => cs * cs * u.d,
    };

    let mut r = [0.0; NSCALARS];
    for n in 0..NSCALARS {
        r[n] = u.s[n] * di;
    }

    Prim1D {
        d: u.d,
        vx,
        vy,
        vz,
        p,
        by: if mhd { u.by } else { 0.0 },
        bz: if mhd { u.bz } else { 0.0 },
        r,
    }
}

/// Convert rotated-frame primitives to a conserved state.
pub fn prim1d_to_cons1d(w: &Prim1D, bx: f64, eos: &EquationOfState, mhd: bool) -> Cons1D {
    let e = match *eos {
        EquationOfState::Adiabatic { gamma } => {
            let mut e = w.p / (gamma - 1.0)
                + 0.5 * w.d * (w.vx * w.vx + w.vy * w.vy + w.vz * w.vz);
            if mhd {
                e += 0.5 * (bx * bx + w.by * w.by + w.bz * w.bz);
            }
            e
        }
        EquationOfState::Isothermal { .. } => 0.0,
    };

    let mut s = [0.0; NSCALARS];
    for n in 0..NSCALARS {
        s[n] = w.r[n] * w.d;
    }

    Cons1D {
        d: w.d,
        mx: w.d * w.vx,
        my: w.d * w.vy,
        mz: w.d * w.vz,
        e,
        by: if mhd { w.by } else { 0.0 },
        bz: if mhd { w.bz } else { 0.0 },
        s,
    }
}

/// Fast magnetosonic speed in the sweep direction.
///
/// With MHD off this reduces to the sound speed. The argument is a conserved
/// state so the interface states of the corrector can be used directly.
pub fn cfast(u: &Cons1D, bx: f64, eos: &EquationOfState, mhd: bool) -> f64 {
    let w = cons1d_to_prim1d(u, bx, eos, mhd);
    let asq = eos.sound_speed_sq(w.d, w.p).max(0.0);
    if !mhd {
        return asq.sqrt();
    }
    let bsq = bx * bx + w.by * w.by + w.bz * w.bz;
    let vaxsq = bx * bx / w.d;
    let ct2 = (asq + bsq / w.d) * (asq + bsq / w.d) - 4.0 * asq * vaxsq;
    let cfsq = 0.5 * (asq + bsq / w.d + ct2.max(0.0).sqrt());
    cfsq.sqrt()
}
