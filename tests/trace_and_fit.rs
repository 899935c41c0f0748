use std::f64::consts::PI;

use assert_approx_eq::assert_approx_eq;
use contour_shape_rust_lib::{fit, trace, total_length, BinaryMask, TraceSelector};

fn pixel_disk(size: usize, radius: f64) -> BinaryMask {
    let center = (size as f64 - 1.0) / 2.0;
    BinaryMask::from_fn(size, size, |r, c| {
        let dr = r as f64 - center;
        let dc = c as f64 - center;
        dr * dr + dc * dc <= radius * radius
    })
}

#[test]
fn square_boundary_yields_two_chains() {
    let mask = BinaryMask::from_fn(7, 7, |r, c| (1..6).contains(&r) && (1..6).contains(&c));

    let first = trace(&mask, 0, usize::MAX, TraceSelector::First);
    let second = trace(&mask, 0, usize::MAX, TraceSelector::Second);

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].pixel_count(), 16);
    assert_eq!(second[0].pixel_count(), 16);
}

#[test]
fn traced_disk_fits_closed_curve() {
    let mask = pixel_disk(48, 15.0);
    let chains = trace(&mask, 20, 1000, TraceSelector::Second);
    assert_eq!(chains.len(), 1);

    let points = chains[0].to_points();
    let shape = fit(&points).unwrap();

    assert_eq!(shape.sample_count(), 200);
    assert_approx_eq!(shape.net_turning(), 2.0 * PI, 1e-6);
    for &k in &shape.curvature {
        assert!(k * 15.0 > 0.6 && k * 15.0 < 1.5, "curvature {}", k);
    }

    // the smoothed outline stays close to the pixel polygon
    let polygon = total_length(&points);
    assert!((shape.perimeter() - polygon).abs() / polygon < 0.15);

    let start = shape.position[0];
    let end = shape.position[199];
    assert_approx_eq!(start.x, end.x, 1e-9);
    assert_approx_eq!(start.y, end.y, 1e-9);
}

#[test]
fn selectors_flip_curvature_sign() {
    let mask = pixel_disk(40, 12.0);

    let cw = trace(&mask, 4, usize::MAX, TraceSelector::First);
    let ccw = trace(&mask, 4, usize::MAX, TraceSelector::Second);
    let cw_fit = fit(&cw[0].to_points()).unwrap();
    let ccw_fit = fit(&ccw[0].to_points()).unwrap();

    assert_approx_eq!(cw_fit.net_turning(), -2.0 * PI, 1e-6);
    assert_approx_eq!(ccw_fit.net_turning(), 2.0 * PI, 1e-6);
    assert_approx_eq!(cw_fit.perimeter(), ccw_fit.perimeter(), 0.5);
    assert!(cw_fit.curvature.iter().all(|&k| k < 0.0));
    assert!(ccw_fit.curvature.iter().all(|&k| k > 0.0));
}

#[test]
fn large_disk_keeps_one_sign_around_the_seam() {
    let radius = 30.0;
    let mask = pixel_disk(70, radius);
    let chains = trace(&mask, 4, usize::MAX, TraceSelector::Second);
    assert_eq!(chains.len(), 1);

    let shape = fit(&chains[0].to_points()).unwrap();
    for (i, &k) in shape.curvature.iter().enumerate() {
        assert!(k * radius > 0.3 && k * radius < 1.8, "sample {}: curvature {}", i, k);
    }
    assert_approx_eq!(shape.mean_curvature() * radius, 1.0, 0.1);
}
