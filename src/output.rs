use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use csv::Writer;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::shape_fit::ShapeFit;

/// Per-contour figures written to the image summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourSummary {
    pub contour_index: usize,
    pub pixel_count: usize,
    pub perimeter: f64,
    pub net_turning: f64,
    pub mean_curvature: f64,
    pub min_curvature: f64,
    pub max_curvature: f64,
}

impl ContourSummary {
    pub fn from_fit(contour_index: usize, pixel_count: usize, fit: &ShapeFit) -> Self {
        let min_curvature = fit.curvature.iter().copied().fold(f64::INFINITY, f64::min);
        let max_curvature = fit.curvature.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            contour_index,
            pixel_count,
            perimeter: fit.perimeter(),
            net_turning: fit.net_turning(),
            mean_curvature: fit.mean_curvature(),
            min_curvature,
            max_curvature,
        }
    }
}

/// Everything recorded for one input image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub image: String,
    pub chains_traced: usize,
    pub contours_fitted: usize,
    pub contours: Vec<ContourSummary>,
}

/// Write the resampled samples of one contour to `Contours/<filename>_<index>.csv`
pub fn write_contour_csv<P: AsRef<Path>>(
    fit: &ShapeFit,
    output_dir: P,
    filename: &str,
    contour_index: usize,
) -> Result<PathBuf> {
    let output_path = output_dir
        .as_ref()
        .join("Contours")
        .join(format!("{}_{}.csv", filename, contour_index));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "Sample_Index",
        "Arclength",
        "X",
        "Y",
        "Tangent_Angle",
        "Curvature",
    ])?;

    for (i, point) in fit.position.iter().enumerate() {
        writer.write_record(&[
            i.to_string(),
            format!("{:.6}", fit.arclength[i]),
            format!("{:.6}", point.x),
            format!("{:.6}", point.y),
            format!("{:.6}", fit.tangent_angle[i]),
            format!("{:.6}", fit.curvature[i]),
        ])?;
    }

    writer.flush()?;

    Ok(output_path)
}

/// Write the image summary to `Summary/<filename>.json`
pub fn write_summary_json<P: AsRef<Path>>(summary: &ImageSummary, output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir
        .as_ref()
        .join("Summary")
        .join(format!("{}.json", summary.image));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(&output_path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;

    Ok(output_path)
}
