// src/spline/smoothing.rs - Roughness-penalized cubic smoothing spline (Reinsch)

use super::banded::SymmetricPentadiagonal;
use super::{knot_spacing, Extension, PiecewiseCubic, SplineError};

/// Fit a natural cubic smoothing spline through `(x[j], y[j])`.
///
/// Minimizes `p·Σ|y[j] − f(x[j])|² + (1 − p)·∫|f''|²`, so `p = 1` interpolates
/// and `p → 0` approaches the least-squares straight line. Each channel is fitted
/// independently against the same knots.
pub fn smoothing_spline<const D: usize>(
    x: &[f64],
    y: &[[f64; D]],
    p: f64,
) -> Result<PiecewiseCubic<D>, SplineError> {
    let n = x.len();
    if y.len() != n {
        return Err(SplineError::LengthMismatch { sites: n, values: y.len() });
    }
    if n < 3 {
        return Err(SplineError::TooFewKnots { needed: 3, got: n });
    }
    if !(p > 0.0 && p <= 1.0) {
        return Err(SplineError::InvalidSmoothing(p));
    }

    let h = knot_spacing(x)?;
    let inv_h: Vec<f64> = h.iter().map(|v| 1.0 / v).collect();
    let m = n - 2;

    // Row i of Qᵀ holds second divided difference weights at columns i, i+1, i+2
    let q_left: Vec<f64> = (0..m).map(|i| inv_h[i]).collect();
    let q_mid: Vec<f64> = (0..m).map(|i| -(inv_h[i] + inv_h[i + 1])).collect();
    let q_right: Vec<f64> = (0..m).map(|i| inv_h[i + 1]).collect();

    // A = 6(1 − p)·QᵀQ + p·R
    let w = 6.0 * (1.0 - p);
    let mut diag = vec![0.0; m];
    let mut upper1 = vec![0.0; m];
    let mut upper2 = vec![0.0; m];
    for i in 0..m {
        diag[i] = w * (q_left[i].powi(2) + q_mid[i].powi(2) + q_right[i].powi(2))
            + p * 2.0 * (h[i] + h[i + 1]);
        if i + 1 < m {
            upper1[i] = w * (q_mid[i] * q_left[i + 1] + q_right[i] * q_mid[i + 1]) + p * h[i + 1];
        }
        if i + 2 < m {
            upper2[i] = w * q_right[i] * q_left[i + 2];
        }
    }

    let system = SymmetricPentadiagonal::factor(&diag, &upper1, &upper2).ok_or(SplineError::Singular)?;

    let mut coefs = vec![[[0.0; 4]; D]; n - 1];
    for channel in 0..D {
        let slopes: Vec<f64> = (0..n - 1)
            .map(|i| (y[i + 1][channel] - y[i][channel]) * inv_h[i])
            .collect();
        let rhs: Vec<f64> = slopes.windows(2).map(|s| s[1] - s[0]).collect();
        let u = system.solve(&rhs);

        // Smoothed values at the sites: y − 6(1 − p)·Q·u
        let mut fitted: Vec<f64> = y.iter().map(|v| v[channel]).collect();
        for i in 0..m {
            fitted[i] -= w * q_left[i] * u[i];
            fitted[i + 1] -= w * q_mid[i] * u[i];
            fitted[i + 2] -= w * q_right[i] * u[i];
        }

        // Second derivative / 6 at each site; natural ends
        let mut c3 = vec![0.0; n];
        for i in 0..m {
            c3[i + 1] = p * u[i];
        }

        for i in 0..n - 1 {
            let slope = (fitted[i + 1] - fitted[i]) * inv_h[i];
            coefs[i][channel] = [
                fitted[i],
                slope - h[i] * (2.0 * c3[i] + c3[i + 1]),
                3.0 * c3[i],
                (c3[i + 1] - c3[i]) * inv_h[i],
            ];
        }
    }

    if coefs.iter().flatten().flatten().any(|c| !c.is_finite()) {
        return Err(SplineError::Singular);
    }

    Ok(PiecewiseCubic::new(x.to_vec(), coefs, Extension::Extrapolate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const SITES: [f64; 6] = [0.0, 1.0, 2.5, 3.0, 4.2, 5.0];
    const VALUES: [f64; 6] = [0.0, 1.0, 0.5, 2.0, 1.0, 0.0];

    fn channel() -> Vec<[f64; 1]> {
        VALUES.iter().map(|&v| [v]).collect()
    }

    #[test]
    fn test_full_weight_interpolates() {
        let spline = smoothing_spline(&SITES, &channel(), 1.0).unwrap();
        for (&x, &y) in SITES.iter().zip(VALUES.iter()) {
            assert_approx_eq!(spline.value(x), y, 1e-10);
        }
    }

    #[test]
    fn test_natural_end_conditions() {
        let spline = smoothing_spline(&SITES, &channel(), 0.7).unwrap();
        let second = spline.derivative().derivative();
        assert_approx_eq!(second.value(SITES[0]), 0.0, 1e-9);
        assert_approx_eq!(second.value(SITES[5]), 0.0, 1e-9);
    }

    #[test]
    fn test_heavy_smoothing_tends_to_regression_line() {
        let spline = smoothing_spline(&SITES, &channel(), 1e-9).unwrap();
        let fitted: Vec<f64> = SITES.iter().map(|&x| spline.value(x)).collect();

        let mean_x = SITES.iter().sum::<f64>() / 6.0;
        let mean_y = VALUES.iter().sum::<f64>() / 6.0;
        let cov: f64 = SITES.iter().zip(VALUES.iter()).map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();
        let var: f64 = SITES.iter().map(|x| (x - mean_x).powi(2)).sum();
        let slope = cov / var;

        for (&x, f) in SITES.iter().zip(fitted) {
            assert_approx_eq!(f, mean_y + slope * (x - mean_x), 1e-4);
        }
    }

    #[test]
    fn test_smoothing_reduces_roughness() {
        let loose = smoothing_spline(&SITES, &channel(), 1.0).unwrap();
        let tight = smoothing_spline(&SITES, &channel(), 0.05).unwrap();
        let bend = |s: &PiecewiseCubic<1>| {
            let second = s.derivative().derivative();
            (0..=50).map(|k| second.value(k as f64 * 0.1).powi(2)).sum::<f64>()
        };
        assert!(bend(&tight) < bend(&loose));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            smoothing_spline(&[0.0, 1.0], &[[0.0], [1.0]], 0.5),
            Err(SplineError::TooFewKnots { needed: 3, got: 2 })
        );
        assert_eq!(
            smoothing_spline(&[0.0, 1.0, 1.0], &[[0.0], [1.0], [2.0]], 0.5),
            Err(SplineError::NonIncreasingKnots(1))
        );
        assert_eq!(
            smoothing_spline(&SITES, &channel(), 0.0),
            Err(SplineError::InvalidSmoothing(0.0))
        );
    }
}
