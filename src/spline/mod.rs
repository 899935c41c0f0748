// src/spline/mod.rs - Cubic spline fitting used by the shape fitter

pub mod banded;
mod periodic;
mod piecewise;
mod smoothing;

use thiserror::Error;

pub use periodic::periodic_interpolant;
pub use piecewise::{Extension, PiecewiseCubic};
pub use smoothing::smoothing_spline;

/// Reasons a spline system cannot be set up or solved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("need at least {needed} knots, got {got}")]
    TooFewKnots { needed: usize, got: usize },

    #[error("knot sites must be strictly increasing (segment {0} has non-positive length)")]
    NonIncreasingKnots(usize),

    #[error("knot sites and values differ in length ({sites} vs {values})")]
    LengthMismatch { sites: usize, values: usize },

    #[error("smoothing parameter must lie in (0, 1], got {0}")]
    InvalidSmoothing(f64),

    #[error("spline system is singular or ill-conditioned")]
    Singular,
}

/// Segment lengths of a knot sequence, rejecting repeated or decreasing sites
fn knot_spacing(x: &[f64]) -> Result<Vec<f64>, SplineError> {
    x.windows(2)
        .enumerate()
        .map(|(i, w)| {
            let h = w[1] - w[0];
            if h > 0.0 && h.is_finite() {
                Ok(h)
            } else {
                Err(SplineError::NonIncreasingKnots(i))
            }
        })
        .collect()
}
