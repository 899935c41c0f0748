// src/shape_fit.rs - Smooth periodic arclength fit of a closed contour

use log::debug;
use nalgebra::distance;
use std::collections::HashSet;
use std::f64::consts::PI;

use crate::arclength::{cumulative_length, total_length};
use crate::errors::{ContourShapeError, FitStage, Result};
use crate::spline::{periodic_interpolant, smoothing_spline, PiecewiseCubic};
use crate::Point;

/// Number of uniformly spaced output samples
pub const DEFAULT_SAMPLES: usize = 200;

/// Constant in the smoothing heuristic `λ = 1 / (1 + d̄³ / scale)`.
/// Tuned empirically for pixel-spaced contours.
pub const DEFAULT_SMOOTHING_SCALE: f64 = 0.06;

/// Points wrapped around each end of the contour before the open smoothing fit.
/// The smoothing kernel spans about two samples at any point spacing.
pub const DEFAULT_SEAM_PADDING: usize = 24;

const MIN_DISTINCT_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub samples: usize,
    pub smoothing_scale: f64,
    /// Wrapped points added to each end for the smoothing fit, capped at one period.
    /// Zero smooths the contour as a plain open curve.
    pub seam_padding: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            smoothing_scale: DEFAULT_SMOOTHING_SCALE,
            seam_padding: DEFAULT_SEAM_PADDING,
        }
    }
}

/// Resampled geometry of a closed contour plus the curves it was sampled from
#[derive(Debug, Clone)]
pub struct ShapeFit {
    /// True polyline arclength of the samples, starting at 0
    pub arclength: Vec<f64>,
    pub position: Vec<Point>,
    /// Unwrapped tangent angle in radians
    pub tangent_angle: Vec<f64>,
    /// Signed curvature, positive for counter-clockwise turning in the x/y frame
    pub curvature: Vec<f64>,
    pub position_curve: PiecewiseCubic<2>,
    pub angle_curve: PiecewiseCubic<1>,
    pub curvature_curve: PiecewiseCubic<1>,
}

impl ShapeFit {
    pub fn sample_count(&self) -> usize {
        self.arclength.len()
    }

    /// Length of the resampled polygon
    pub fn perimeter(&self) -> f64 {
        self.arclength.last().copied().unwrap_or(0.0)
    }

    /// Net tangent angle change over one period (±2π for a simple closed curve)
    pub fn net_turning(&self) -> f64 {
        match (self.tangent_angle.first(), self.tangent_angle.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    pub fn mean_curvature(&self) -> f64 {
        if self.curvature.is_empty() {
            return 0.0;
        }
        self.curvature.iter().sum::<f64>() / self.curvature.len() as f64
    }
}

/// Smoothing strength for a given mean point spacing
pub fn smoothing_strength(mean_spacing: f64, scale: f64) -> f64 {
    1.0 / (1.0 + mean_spacing.powi(3) / scale)
}

/// Unwrap an angle sequence so consecutive values never jump by more than π
pub fn unwrap_angles(angles: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(angles.len());
    let Some(&first) = angles.first() else {
        return unwrapped;
    };

    unwrapped.push(first);
    let mut current = first;
    for pair in angles.windows(2) {
        let mut delta = pair[1] - pair[0];
        delta -= 2.0 * PI * (delta / (2.0 * PI)).round();
        current += delta;
        unwrapped.push(current);
    }

    unwrapped
}

/// Fit with the default options (200 samples, smoothing scale 0.06)
pub fn fit(raw_points: &[Point]) -> Result<ShapeFit> {
    fit_with_options(raw_points, &FitOptions::default())
}

/// Smooth, close and resample an ordered closed point sequence.
///
/// The sequence is closed implicitly when its first and last points differ.
pub fn fit_with_options(raw_points: &[Point], options: &FitOptions) -> Result<ShapeFit> {
    if options.samples < MIN_DISTINCT_POINTS {
        return Err(ContourShapeError::InvalidInput(format!(
            "at least {} output samples are required, got {}",
            MIN_DISTINCT_POINTS, options.samples
        )));
    }
    if !(options.smoothing_scale > 0.0) {
        return Err(ContourShapeError::InvalidInput(format!(
            "smoothing scale must be > 0, got {}",
            options.smoothing_scale
        )));
    }

    let closed = prepare_contour(raw_points)?;

    // Stage A: open smoothing spline against raw arclength. The contour is
    // extended with wrapped points on both sides so the free ends of the
    // open fit lie outside the closed curve.
    let open = &closed[..closed.len() - 1];
    let mean_spacing = total_length(open) / (open.len() - 1) as f64;
    let strength = smoothing_strength(mean_spacing, options.smoothing_scale);
    let padding = options.seam_padding.min(open.len());
    debug!(
        "Fitting {} points: mean spacing {:.4}, smoothing strength {:.5}, padding {}",
        open.len(),
        mean_spacing,
        strength,
        padding
    );

    let padded = wrap_padded(open, padding);
    let padded_arclength = cumulative_length(&padded);
    let smoother = smoothing_spline(&padded_arclength, &to_channels(&padded), strength)
        .map_err(|e| ContourShapeError::fitting(FitStage::Smoothing, e.to_string()))?;
    let raw_arclength = &padded_arclength[padding..padding + closed.len()];
    let smoothed: Vec<Point> = raw_arclength.iter().map(|&s| smoother.point(s)).collect();

    // Stage B: move the seam off the start by dropping both ends and re-closing
    let mut seamless = smoothed[1..smoothed.len() - 1].to_vec();
    seamless.push(seamless[0]);

    // Stage C: exact periodic interpolation
    let knot_arclength = cumulative_length(&seamless);
    let position_curve = periodic_interpolant(&knot_arclength, &to_channels(&seamless))
        .map_err(|e| ContourShapeError::fitting(FitStage::PeriodicInterpolation, e.to_string()))?;
    let on_knots: Vec<Point> = knot_arclength.iter().map(|&s| position_curve.point(s)).collect();
    let total = total_length(&on_knots);

    // Stage D: uniform resampling
    let samples = options.samples;
    let targets: Vec<f64> = (0..samples)
        .map(|i| total * i as f64 / (samples - 1) as f64)
        .collect();
    let position: Vec<Point> = targets.iter().map(|&t| position_curve.point(t)).collect();
    let arclength = cumulative_length(&position);

    // Stage E: tangent angle and curvature
    let tangent_curve = position_curve.derivative();
    let mut headings = Vec::with_capacity(samples);
    for &t in &targets {
        let tangent = tangent_curve.vector(t);
        let norm = tangent.norm();
        if !(norm > f64::EPSILON) || !norm.is_finite() {
            return Err(ContourShapeError::fitting(
                FitStage::Differentiation,
                format!("vanishing tangent at arclength {:.4}", t),
            ));
        }
        let unit = tangent / norm;
        headings.push(unit.y.atan2(unit.x));
    }
    let tangent_angle = unwrap_angles(&headings);

    let angle_channels: Vec<[f64; 1]> = tangent_angle.iter().map(|&a| [a]).collect();
    let angle_curve = periodic_interpolant(&arclength, &angle_channels)
        .map_err(|e| ContourShapeError::fitting(FitStage::Differentiation, e.to_string()))?;
    let curvature_curve = angle_curve.derivative();
    let curvature: Vec<f64> = arclength.iter().map(|&s| curvature_curve.value(s)).collect();

    if curvature.iter().any(|k| !k.is_finite()) {
        return Err(ContourShapeError::fitting(
            FitStage::Differentiation,
            "non-finite curvature",
        ));
    }

    Ok(ShapeFit {
        arclength,
        position,
        tangent_angle,
        curvature,
        position_curve,
        angle_curve,
        curvature_curve,
    })
}

/// The closed contour `open[0], .., open[n - 1], open[0]` with `padding` (at most n)
/// wrapped points in front and behind
fn wrap_padded(open: &[Point], padding: usize) -> Vec<Point> {
    let n = open.len();
    (0..n + 1 + 2 * padding)
        .map(|i| open[(i + n - padding) % n])
        .collect()
}

fn to_channels(points: &[Point]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

/// Drop consecutive duplicates, close the sequence and reject degenerate input
fn prepare_contour(raw_points: &[Point]) -> Result<Vec<Point>> {
    if raw_points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ContourShapeError::InvalidInput(
            "contour contains non-finite coordinates".to_string(),
        ));
    }

    let mut closed: Vec<Point> = Vec::with_capacity(raw_points.len() + 1);
    for &point in raw_points {
        if closed.last() != Some(&point) {
            closed.push(point);
        }
    }
    if let (Some(&first), Some(&last)) = (closed.first(), closed.last()) {
        if first != last {
            closed.push(first);
        }
    }

    let open = &closed[..closed.len().saturating_sub(1)];
    let distinct: HashSet<(u64, u64)> = open.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect();
    if distinct.len() < MIN_DISTINCT_POINTS {
        return Err(ContourShapeError::InvalidInput(format!(
            "at least {} distinct points are required, got {}",
            MIN_DISTINCT_POINTS,
            distinct.len()
        )));
    }

    if total_length(&closed) <= 0.0 {
        return Err(ContourShapeError::InvalidInput(
            "contour has zero length".to_string(),
        ));
    }

    if is_collinear(open) {
        return Err(ContourShapeError::InvalidInput(
            "contour points are collinear".to_string(),
        ));
    }

    Ok(closed)
}

fn is_collinear(points: &[Point]) -> bool {
    let origin = points[0];
    let far = points
        .iter()
        .copied()
        .max_by(|a, b| distance(&origin, a).total_cmp(&distance(&origin, b)))
        .unwrap_or(origin);
    let axis = far - origin;
    let span = axis.norm();
    if span <= 0.0 {
        return true;
    }

    let max_offset = points
        .iter()
        .map(|p| axis.perp(&(*p - origin)).abs() / span)
        .fold(0.0, f64::max);

    max_offset <= 1e-9 * span
}
