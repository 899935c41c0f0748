// src/spline/periodic.rs - Periodic cubic interpolation

use super::banded::solve_cyclic_tridiagonal;
use super::{knot_spacing, Extension, PiecewiseCubic, SplineError};

/// Interpolate `(x[i], y[i])`, i = 0..=n, with a cubic spline whose first and
/// second derivatives match at both ends of the range.
///
/// For a closed curve `y[n] == y[0]` and the result is truly periodic. When the
/// end values differ (an unwrapped angle, say) the difference becomes the
/// per-period offset, so the derivative is still periodic. Needs n >= 3 segments.
pub fn periodic_interpolant<const D: usize>(
    x: &[f64],
    y: &[[f64; D]],
) -> Result<PiecewiseCubic<D>, SplineError> {
    if y.len() != x.len() {
        return Err(SplineError::LengthMismatch { sites: x.len(), values: y.len() });
    }
    if x.len() < 4 {
        return Err(SplineError::TooFewKnots { needed: 4, got: x.len() });
    }

    let h = knot_spacing(x)?;
    let n = h.len();

    let sub: Vec<f64> = (0..n).map(|i| h[(i + n - 1) % n]).collect();
    let sup = h.clone();
    let diag: Vec<f64> = (0..n).map(|i| 2.0 * (sub[i] + sup[i])).collect();

    let mut coefs = vec![[[0.0; 4]; D]; n];
    let mut offset = [0.0; D];

    for channel in 0..D {
        let slopes: Vec<f64> = (0..n)
            .map(|i| (y[i + 1][channel] - y[i][channel]) / h[i])
            .collect();
        let rhs: Vec<f64> = (0..n)
            .map(|i| 6.0 * (slopes[i] - slopes[(i + n - 1) % n]))
            .collect();

        // Second derivatives at the knots; the last one wraps onto the first
        let moments = solve_cyclic_tridiagonal(&sub, &diag, &sup, &rhs).ok_or(SplineError::Singular)?;

        for i in 0..n {
            let (m0, m1) = (moments[i], moments[(i + 1) % n]);
            coefs[i][channel] = [
                y[i][channel],
                slopes[i] - h[i] * (2.0 * m0 + m1) / 6.0,
                m0 / 2.0,
                (m1 - m0) / (6.0 * h[i]),
            ];
        }
        offset[channel] = y[n][channel] - y[0][channel];
    }

    Ok(PiecewiseCubic::new(x.to_vec(), coefs, Extension::Periodic { offset }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::PI;

    fn circle_knots(count: usize) -> (Vec<f64>, Vec<[f64; 2]>) {
        let x: Vec<f64> = (0..=count).map(|i| 2.0 * PI * i as f64 / count as f64).collect();
        let y = x.iter().map(|t| [t.cos(), t.sin()]).collect();
        (x, y)
    }

    #[test]
    fn test_interpolates_knots() {
        let (x, y) = circle_knots(12);
        let spline = periodic_interpolant(&x, &y).unwrap();
        for (t, v) in x.iter().zip(y.iter()) {
            let p = spline.evaluate(*t);
            assert_approx_eq!(p[0], v[0], 1e-12);
            assert_approx_eq!(p[1], v[1], 1e-12);
        }
    }

    #[test]
    fn test_continuity_across_wrap() {
        let (x, y) = circle_knots(9);
        let spline = periodic_interpolant(&x, &y).unwrap();
        let end = spline.period();
        let first = spline.derivative();
        let second = first.derivative();
        for curve in [&spline, &first, &second] {
            let a = curve.evaluate(0.0);
            let b = curve.evaluate(end);
            assert_approx_eq!(a[0], b[0], 1e-10);
            assert_approx_eq!(a[1], b[1], 1e-10);
        }
    }

    #[test]
    fn test_close_to_circle_between_knots() {
        let (x, y) = circle_knots(24);
        let spline = periodic_interpolant(&x, &y).unwrap();
        for k in 0..100 {
            let t = k as f64 * 0.0637;
            let p = spline.point(t);
            assert_approx_eq!(p.coords.norm(), 1.0, 2e-4);
        }
    }

    #[test]
    fn test_offset_keeps_derivative_periodic() {
        // Unwrapped angle of a unit circle: θ(s) = s on [0, 2π]
        let x: Vec<f64> = (0..=8).map(|i| 2.0 * PI * i as f64 / 8.0).collect();
        let y: Vec<[f64; 1]> = x.iter().map(|&t| [t]).collect();
        let spline = periodic_interpolant(&x, &y).unwrap();

        assert_eq!(spline.extension(), Extension::Periodic { offset: [2.0 * PI] });
        assert_approx_eq!(spline.value(2.0 * PI + 1.0), 2.0 * PI + 1.0, 1e-9);

        let rate = spline.derivative();
        for k in 0..20 {
            assert_approx_eq!(rate.value(k as f64 * 0.5), 1.0, 1e-9);
        }
    }

    #[test]
    fn test_too_few_segments() {
        let x = [0.0, 1.0, 2.0];
        let y = [[0.0], [1.0], [0.0]];
        assert!(matches!(
            periodic_interpolant(&x, &y),
            Err(SplineError::TooFewKnots { .. })
        ));
    }
}
