// src/spline/piecewise.rs - Evaluable piecewise cubic curves

use nalgebra::Vector2;

use crate::Point;

/// Behaviour outside the breakpoint range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extension<const D: usize> {
    /// End polynomials continue past the range
    Extrapolate,
    /// Parameter wraps by the period; each full period adds `offset` to the value
    Periodic { offset: [f64; D] },
}

/// Piecewise cubic polynomial with `D` output channels.
///
/// Segment `i` covers `[breaks[i], breaks[i + 1]]` and evaluates
/// `c0 + c1·t + c2·t² + c3·t³` with `t` local to the segment start.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseCubic<const D: usize> {
    breaks: Vec<f64>,
    coefs: Vec<[[f64; 4]; D]>,
    extension: Extension<D>,
}

impl<const D: usize> PiecewiseCubic<D> {
    pub(crate) fn new(breaks: Vec<f64>, coefs: Vec<[[f64; 4]; D]>, extension: Extension<D>) -> Self {
        debug_assert_eq!(breaks.len(), coefs.len() + 1);
        Self { breaks, coefs, extension }
    }

    pub fn extension(&self) -> Extension<D> {
        self.extension
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.extension, Extension::Periodic { .. })
    }

    /// (start, end) of the breakpoint range
    pub fn domain(&self) -> (f64, f64) {
        (self.breaks[0], self.breaks[self.breaks.len() - 1])
    }

    pub fn period(&self) -> f64 {
        let (start, end) = self.domain();
        end - start
    }

    fn segment_index(&self, t: f64) -> usize {
        let upper = self.breaks.partition_point(|&b| b <= t);
        upper.saturating_sub(1).min(self.coefs.len() - 1)
    }

    /// Evaluate every channel at `t`
    pub fn evaluate(&self, t: f64) -> [f64; D] {
        let (start, end) = self.domain();
        let (t, turns) = match self.extension {
            Extension::Periodic { .. } if t < start || t > end => {
                let turns = ((t - start) / (end - start)).floor();
                (t - turns * (end - start), turns)
            }
            _ => (t, 0.0),
        };

        let index = self.segment_index(t);
        let local = t - self.breaks[index];
        let mut out = [0.0; D];
        for (value, c) in out.iter_mut().zip(self.coefs[index].iter()) {
            *value = c[0] + local * (c[1] + local * (c[2] + local * c[3]));
        }

        if let Extension::Periodic { offset } = self.extension {
            if turns != 0.0 {
                for (value, shift) in out.iter_mut().zip(offset.iter()) {
                    *value += turns * shift;
                }
            }
        }

        out
    }

    /// First derivative. The derivative of a periodic curve is periodic with no offset.
    pub fn derivative(&self) -> Self {
        let coefs = self
            .coefs
            .iter()
            .map(|segment| segment.map(|c| [c[1], 2.0 * c[2], 3.0 * c[3], 0.0]))
            .collect();
        let extension = match self.extension {
            Extension::Extrapolate => Extension::Extrapolate,
            Extension::Periodic { .. } => Extension::Periodic { offset: [0.0; D] },
        };
        Self::new(self.breaks.clone(), coefs, extension)
    }
}

impl PiecewiseCubic<1> {
    pub fn value(&self, t: f64) -> f64 {
        self.evaluate(t)[0]
    }
}

impl PiecewiseCubic<2> {
    /// Evaluate as a point in the plane
    pub fn point(&self, t: f64) -> Point {
        let [x, y] = self.evaluate(t);
        Point::new(x, y)
    }

    /// Evaluate as a vector (useful on derivative curves)
    pub fn vector(&self, t: f64) -> Vector2<f64> {
        let [x, y] = self.evaluate(t);
        Vector2::new(x, y)
    }
}
