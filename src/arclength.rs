// src/arclength.rs - Cumulative polyline length

use nalgebra::distance;

use crate::Point;

/// Cumulative Euclidean distance along an ordered point sequence.
///
/// The output has one entry per input point and starts at 0. Every arclength
/// in the shape fit goes through this function so the stages stay consistent.
pub fn cumulative_length(points: &[Point]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len());
    if points.is_empty() {
        return lengths;
    }

    let mut total = 0.0;
    lengths.push(total);
    for pair in points.windows(2) {
        total += distance(&pair[0], &pair[1]);
        lengths.push(total);
    }

    lengths
}

/// Total polyline length (0 for fewer than two points)
pub fn total_length(points: &[Point]) -> f64 {
    cumulative_length(points).last().copied().unwrap_or(0.0)
}
