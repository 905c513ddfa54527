//! Source-term hooks and parameters shared by the predictor, corrector, and
//! full-step phases.
//!
//! Two caller-provided capabilities are modeled as optional trait objects
//! (absent ≡ skipped): a static gravitational potential and an optically thin
//! cooling rate. Self-gravity and the shearing box are parameter structs
//! because the integrator itself owns their update formulas; the potential
//! for self-gravity lives on the grid and is produced by an external Poisson
//! solver before each step.
//!
//! Implementations must be `Send + Sync` so a caller may share them across
//! blocks.

mod shearing;

pub use shearing::{EyRemap, ShearingBox};

/// Time-independent gravitational potential Φ(x1, x2, x3).
///
/// Evaluated at cell centers and cell faces; the potential differences enter
/// as momentum and energy source terms in three distinct finite-difference
/// forms across the phases of the step.
pub trait GravityPotential: Send + Sync {
    /// Potential at a point.
    fn phi(&self, x1: f64, x2: f64, x3: f64) -> f64;
}

impl<F> GravityPotential for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    fn phi(&self, x1: f64, x2: f64, x3: f64) -> f64 {
        self(x1, x2, x3)
    }
}

/// Optically thin cooling rate Λ(d, P, Δt).
///
/// The returned rate has units of energy density per time; the integrator
/// applies `(γ-1) Λ` to the pressure at the half step and `Λ` to the total
/// energy over the full step. Never called for a barotropic closure.
pub trait CoolingFunction: Send + Sync {
    /// Cooling rate for the given density and pressure over the interval
    /// `dt`.
    fn rate(&self, d: f64, p: f64, dt: f64) -> f64;
}

impl<F> CoolingFunction for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    fn rate(&self, d: f64, p: f64, dt: f64) -> f64 {
        self(d, p, dt)
    }
}

/// Self-gravity coupling constants.
///
/// The potential itself is `Grid::phi`, updated by the caller's Poisson
/// solver before the step. The momentum update uses the gravitational stress
/// tensor, so total momentum is conserved to round-off on a periodic domain;
/// `grav_mean_rho` is the Jeans-swindle background density subtracted by the
/// solver.
#[derive(Clone, Copy, Debug)]
pub struct SelfGravity {
    /// 4πG in code units.
    pub four_pi_g: f64,
    /// Mean density subtracted by the Poisson solve (Jeans swindle).
    pub grav_mean_rho: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_as_potential() {
        let pot: &dyn GravityPotential = &|x1: f64, _x2: f64, _x3: f64| 2.0 * x1;
        assert!((pot.phi(1.5, 0.0, 0.0) - 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_closure_as_cooling() {
        let cool: &dyn CoolingFunction = &|d: f64, p: f64, _dt: f64| d * p;
        assert!((cool.rate(2.0, 3.0, 0.1) - 6.0).abs() < 1e-14);
    }
}
