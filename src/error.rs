//! Crate error types.

use thiserror::Error;

/// Errors raised while setting up the integrator or the grid.
///
/// The step itself performs no runtime checks: numerical breakdown
/// (non-positive density or pressure) is tolerated by the scheme and left to
/// the caller to detect, per the integrator's failure contract.
#[derive(Debug, Error)]
pub enum IntegrateError {
    /// Scratch or field allocation failed or would overflow `usize`.
    #[error("failed to allocate a {n3}x{n2}x{n1} field array")]
    Allocation {
        /// x1 extent (fastest index)
        n1: usize,
        /// x2 extent
        n2: usize,
        /// x3 extent
        n3: usize,
    },

    /// A block extent was zero.
    #[error("interior block extents must be positive, got ({nx1}, {nx2}, {nx3})")]
    EmptyBlock {
        /// Interior x1 extent
        nx1: usize,
        /// Interior x2 extent
        nx2: usize,
        /// Interior x3 extent
        nx3: usize,
    },

    /// The grid handed to `step` does not match the extents the scratch
    /// arrays were allocated for.
    #[error("grid block ({nx1}, {nx2}, {nx3}) does not match integrator extents ({ex1}, {ex2}, {ex3})")]
    BlockMismatch {
        /// Grid interior x1 extent
        nx1: usize,
        /// Grid interior x2 extent
        nx2: usize,
        /// Grid interior x3 extent
        nx3: usize,
        /// Integrator x1 extent
        ex1: usize,
        /// Integrator x2 extent
        ex2: usize,
        /// Integrator x3 extent
        ex3: usize,
    },

    /// Self-gravity is enabled but the grid carries no potential array.
    #[error("self-gravity requires a gravitational potential on the grid")]
    MissingPotential,
}
