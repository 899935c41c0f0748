// src/pipeline.rs - Mask, trace, fit and write results for one image

use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::boundary::{trace, PixelChain};
use crate::config::Config;
use crate::errors::{ContourShapeError, Result};
use crate::image_io::{save_image, InputImage};
use crate::mask::BinaryMask;
use crate::output::{write_contour_csv, write_summary_json, ContourSummary, ImageSummary};
use crate::segmentation::segment_with_config;
use crate::shape_fit::{fit_with_options, FitOptions, ShapeFit};

/// A traced boundary together with its fitted shape
#[derive(Debug, Clone)]
pub struct FittedContour {
    /// Position of the chain among the selected traces
    pub index: usize,
    pub chain: PixelChain,
    pub fit: ShapeFit,
}

fn fit_chain(index: usize, chain: PixelChain, options: &FitOptions) -> Option<FittedContour> {
    match fit_with_options(&chain.to_points(), options) {
        Ok(fit) => Some(FittedContour { index, chain, fit }),
        Err(e) => {
            warn!("Skipping contour {} ({} pixels): {}", index, chain.pixel_count(), e);
            None
        }
    }
}

/// Trace the mask and fit every selected chain.
///
/// Returns the number of chains selected by the tracer and the contours that
/// fitted; a chain that fails to fit is logged and skipped.
pub fn fit_mask_contours(mask: &BinaryMask, config: &Config) -> (usize, Vec<FittedContour>) {
    let chains = trace(
        mask,
        config.min_chain_length,
        config.max_chain_length_or_unbounded(),
        config.trace_selector,
    );
    let traced = chains.len();
    debug!("Traced {} chains with selector {:?}", traced, config.trace_selector);

    if chains.is_empty() {
        warn!(
            "No boundary survived the length filter ({} < length < {:?})",
            config.min_chain_length, config.max_chain_length
        );
        return (0, Vec::new());
    }

    let options = config.fit_options();
    let fitted: Vec<FittedContour> = if config.use_parallel {
        chains
            .into_par_iter()
            .enumerate()
            .filter_map(|(index, chain)| fit_chain(index, chain, &options))
            .collect()
    } else {
        chains
            .into_iter()
            .enumerate()
            .filter_map(|(index, chain)| fit_chain(index, chain, &options))
            .collect()
    };

    (traced, fitted)
}

/// Process a single image: segment, trace, fit and write CSV/JSON results
pub fn process_image(
    input_image: InputImage,
    config: &Config,
    debug: bool,
) -> Result<ImageSummary> {
    let InputImage { image, path, filename } = input_image;
    let output_base = PathBuf::from(&config.output_base_dir);

    let mask = segment_with_config(&image, config);
    debug!(
        "{}: {}x{} mask with {} foreground pixels",
        path.display(),
        mask.width(),
        mask.height(),
        mask.foreground_count()
    );

    if debug {
        let debug_dir = output_base.join("debug");
        fs::create_dir_all(&debug_dir)?;
        save_image(&mask.to_gray_image(), debug_dir.join(format!("{}_mask.png", filename)))?;
    }

    if mask.is_empty() {
        return Err(ContourShapeError::InvalidInput(format!(
            "{}: mask has no foreground pixels",
            filename
        )));
    }

    let (traced, contours) = fit_mask_contours(&mask, config);

    let mut summaries = Vec::with_capacity(contours.len());
    for contour in &contours {
        write_contour_csv(&contour.fit, &output_base, &filename, contour.index)?;
        summaries.push(ContourSummary::from_fit(
            contour.index,
            contour.chain.pixel_count(),
            &contour.fit,
        ));
    }

    let summary = ImageSummary {
        image: filename,
        chains_traced: traced,
        contours_fitted: summaries.len(),
        contours: summaries,
    };
    write_summary_json(&summary, &output_base)?;

    info!(
        "{}: fitted {} of {} contours",
        summary.image, summary.contours_fitted, summary.chains_traced
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::path::Path;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "contour_shape_pipeline_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn disk_image(size: u32, radius: f64) -> GrayImage {
        let center = (size as f64 - 1.0) / 2.0;
        GrayImage::from_fn(size, size, |x, y| {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            if dx * dx + dy * dy <= radius * radius {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    fn input(image: GrayImage, name: &str) -> InputImage {
        InputImage {
            image,
            path: Path::new(name).with_extension("png"),
            filename: name.to_string(),
        }
    }

    fn config_for(dir: &Path) -> Config {
        Config {
            input_path: dir.display().to_string(),
            output_base_dir: dir.display().to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_disk_writes_contour_and_summary() {
        let dir = scratch_dir("disk");
        let config = config_for(&dir);

        let summary = process_image(input(disk_image(40, 12.0), "disk"), &config, true).unwrap();

        assert_eq!(summary.chains_traced, 1);
        assert_eq!(summary.contours_fitted, 1);
        let contour = &summary.contours[0];
        assert!(contour.perimeter > 60.0 && contour.perimeter < 90.0);
        assert!((contour.net_turning.abs() - 2.0 * std::f64::consts::PI).abs() < 1e-6);

        let csv_path = dir.join("Contours").join("disk_0.csv");
        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "Sample_Index");
        assert_eq!(&headers[5], "Curvature");
        assert_eq!(reader.records().count(), 200);

        assert!(dir.join("Summary").join("disk.json").is_file());
        assert!(dir.join("debug").join("disk_mask.png").is_file());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_mask_is_rejected() {
        let dir = scratch_dir("empty");
        let config = config_for(&dir);

        let result = process_image(input(GrayImage::new(16, 16), "blank"), &config, false);
        assert!(matches!(result, Err(ContourShapeError::InvalidInput(_))));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_filtered_out_chains_still_write_summary() {
        let dir = scratch_dir("speck");
        let config = config_for(&dir);

        let mut image = GrayImage::new(8, 8);
        for (x, y) in [(3, 3), (3, 4), (4, 3), (4, 4)] {
            image.put_pixel(x, y, Luma([255u8]));
        }

        let summary = process_image(input(image, "speck"), &config, false).unwrap();
        assert_eq!(summary.chains_traced, 0);
        assert!(summary.contours.is_empty());

        let text = fs::read_to_string(dir.join("Summary").join("speck.json")).unwrap();
        let parsed: crate::output::ImageSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, summary);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_selectors_give_opposite_orientation() {
        let mask = BinaryMask::from_fn(30, 30, |r, c| {
            let dr = r as f64 - 14.5;
            let dc = c as f64 - 14.5;
            dr * dr + dc * dc <= 81.0
        });

        let mut config = Config::default();
        config.use_parallel = false;
        let (_, first) = fit_mask_contours(&mask, &config);
        config.trace_selector = crate::boundary::TraceSelector::Second;
        let (_, second) = fit_mask_contours(&mask, &config);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        let sum = first[0].fit.net_turning() + second[0].fit.net_turning();
        assert!(sum.abs() < 1e-6);
        assert!(first[0].fit.net_turning() < 0.0);
    }
}
